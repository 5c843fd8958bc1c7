/*!
# Terra Spatial

Dynamic octree spatial index for game worlds.

Tracks moving and static entities by position and category, and answers
radius, region, frustum and nearest-neighbour queries filtered by category
bitmasks. Repeated queries are served from a time-bounded result cache whose
readers never take a lock.

## Architecture

- **SpatialIndex**: entity tables, tree, cache and statistics behind one API
- **OctreeNode**: lazily subdivided point octree returning query candidates
- **QueryCache**: TTL cache published through an epoch-protected pointer
- **CategoryMask**: entity classification bits and named unions
- **WorldConfig**: validated world bounds and tree limits

## Example

```ignore
use terra_spatial::terra::{SpatialIndex, WorldConfig, EntityRef, CategoryMask};
use terra_spatial::glam::Vec3;

let mut index = SpatialIndex::new(WorldConfig::creature_world())?;
index.add_entity(EntityRef(1), Vec3::new(5.0, 0.0, 5.0), CategoryMask::CREATURES);
let nearby = index.find_creatures_in_radius(Vec3::ZERO, 10.0);
```
*/

// Internal modules
mod error;
mod entity;
pub mod log;
pub mod geometry;
pub mod category;
mod world_config;
mod octree;
mod cache;
mod index;

// Main terra namespace module
pub mod terra {
    // Error types
    pub use crate::error::{Error, Result};

    // Index and its value types
    pub use crate::entity::EntityRef;
    pub use crate::index::{SpatialIndex, SpatialStats};
    pub use crate::octree::{OctreeNode, TreeLimits, TreeStatistics};
    pub use crate::cache::{CacheConfig, CacheKey, QueryCache, QueryKey};
    pub use crate::world_config::WorldConfig;
    pub use crate::category::CategoryMask;
    pub use crate::geometry::{AABB, Frustum, FrustumTest};

    // Logging sub-module (types and logger control; macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, SeverityFilter, set_logger, reset_logger};
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Category helpers (contains, combine, display_name, ...)
    pub mod category {
        pub use crate::category::*;
    }

    // Configuration defaults
    pub mod config {
        pub use crate::world_config::{
            DEFAULT_MAX_DEPTH, DEFAULT_MIN_NODE_SIZE, DEFAULT_NODE_CAPACITY, MAX_DEPTH_RANGE,
        };
        pub use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
    }
}

// Re-export math library at crate root
pub use glam;
