mod spatial_index;
mod stats;

pub use spatial_index::SpatialIndex;
pub use stats::SpatialStats;
