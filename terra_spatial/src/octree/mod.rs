mod octree_node;

pub use octree_node::{OctreeNode, TreeLimits, TreeStatistics};
