//! World configuration: bounds and tree limits for a spatial index.
//!
//! A `WorldConfig` is validated once, when it is built, and is then used
//! read-only by `SpatialIndex::new`. A malformed world cannot be queried
//! safely, so this is the one place where the crate fails hard.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::geometry::AABB;
use crate::spatial_err;

const LOG_SOURCE: &str = "terra::WorldConfig";

/// Default maximum tree depth (root = depth 0)
pub const DEFAULT_MAX_DEPTH: u32 = 8;
/// Default smallest edge a subdivided child may have
pub const DEFAULT_MIN_NODE_SIZE: f32 = 1.0;
/// Default number of entities a leaf holds before it subdivides
pub const DEFAULT_NODE_CAPACITY: usize = 16;
/// Accepted range for `max_depth`
pub const MAX_DEPTH_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Bounds and tree limits of a game world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Minimum world corner
    pub min_bounds: Vec3,
    /// Maximum world corner
    pub max_bounds: Vec3,
    /// Deepest level the octree may reach (root = 0)
    pub max_depth: u32,
    /// A node never subdivides into children smaller than this on any axis
    pub min_node_size: f32,
    /// Leaf entity count above which a node subdivides
    pub node_capacity: usize,
    /// Display name, used in log output
    pub name: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            min_bounds: Vec3::new(-10.0, -5.0, -10.0),
            max_bounds: Vec3::new(10.0, 10.0, 10.0),
            max_depth: DEFAULT_MAX_DEPTH,
            min_node_size: DEFAULT_MIN_NODE_SIZE,
            node_capacity: DEFAULT_NODE_CAPACITY,
            name: "Default".to_string(),
        }
    }
}

impl WorldConfig {
    /// Create a validated world with default tree limits.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `min` is not strictly below `max`
    /// on every axis, or if any coordinate is not finite.
    pub fn new(min: Vec3, max: Vec3, name: impl Into<String>) -> Result<Self> {
        let config = Self {
            min_bounds: min,
            max_bounds: max,
            name: name.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Large outdoor world for creature gameplay.
    pub fn creature_world() -> Self {
        Self {
            min_bounds: Vec3::new(-100.0, -10.0, -100.0),
            max_bounds: Vec3::new(100.0, 50.0, 100.0),
            name: "Creature World".to_string(),
            ..Self::default()
        }
    }

    /// Small world used by tests and the stress harness.
    pub fn test_world() -> Self {
        Self {
            min_bounds: Vec3::new(-30.0, -5.0, -30.0),
            max_bounds: Vec3::new(30.0, 35.0, 30.0),
            name: "Test World".to_string(),
            ..Self::default()
        }
    }

    /// Replace the maximum tree depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Result<Self> {
        self.max_depth = max_depth;
        self.validate()?;
        Ok(self)
    }

    /// Replace the minimum child node size.
    pub fn with_min_node_size(mut self, min_node_size: f32) -> Result<Self> {
        self.min_node_size = min_node_size;
        self.validate()?;
        Ok(self)
    }

    /// Replace the leaf capacity.
    pub fn with_node_capacity(mut self, node_capacity: usize) -> Result<Self> {
        self.node_capacity = node_capacity;
        self.validate()?;
        Ok(self)
    }

    /// Check every field. Errors are logged before they are returned.
    pub fn validate(&self) -> Result<()> {
        if !self.min_bounds.is_finite() || !self.max_bounds.is_finite() {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidBounds(format!(
                "'{}': bounds must be finite (min {:?}, max {:?})",
                self.name, self.min_bounds, self.max_bounds
            ))));
        }

        if self.min_bounds.cmpge(self.max_bounds).any() {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidBounds(format!(
                "'{}': min {:?} must be less than max {:?} in all dimensions",
                self.name, self.min_bounds, self.max_bounds
            ))));
        }

        if !MAX_DEPTH_RANGE.contains(&self.max_depth) {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidDepth(self.max_depth)));
        }

        if !(self.min_node_size.is_finite() && self.min_node_size > 0.0) {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidNodeSize(self.min_node_size)));
        }

        if self.node_capacity == 0 {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidCapacity(self.node_capacity)));
        }

        Ok(())
    }

    /// Edge lengths of the world box.
    pub fn size(&self) -> Vec3 {
        self.max_bounds - self.min_bounds
    }

    pub fn center(&self) -> Vec3 {
        (self.min_bounds + self.max_bounds) * 0.5
    }

    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// World bounds as a box; this is the root node's box.
    pub fn bounding_box(&self) -> AABB {
        AABB::new(self.min_bounds, self.max_bounds)
    }
}

#[cfg(test)]
#[path = "world_config_tests.rs"]
mod tests;
