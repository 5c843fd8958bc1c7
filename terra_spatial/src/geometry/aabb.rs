//! Axis-aligned bounding box.
//!
//! Bounds are inclusive on both ends: a point lying exactly on a face is
//! contained, and two boxes sharing a face intersect.

use glam::Vec3;

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Create a box from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Cube of half-extent `radius` centered on `center`.
    ///
    /// Bounds a sphere; radius and region queries use it to cull tree nodes.
    pub fn from_center_radius(center: Vec3, radius: f32) -> Self {
        Self {
            min: center - Vec3::splat(radius),
            max: center + Vec3::splat(radius),
        }
    }

    /// Compute the center point of this AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Volume (zero for flat or inverted boxes).
    pub fn volume(&self) -> f32 {
        let size = self.size();
        if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
            return 0.0;
        }
        size.x * size.y * size.z
    }

    /// True when the box encloses no volume: an inverted or flat axis,
    /// or any NaN coordinate.
    pub fn is_degenerate(&self) -> bool {
        !(self.min.x < self.max.x && self.min.y < self.max.y && self.min.z < self.max.z)
    }

    /// Point test, faces included.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// True when `other` lies entirely within this box.
    pub fn contains(&self, other: &AABB) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// True when the boxes overlap or touch.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
