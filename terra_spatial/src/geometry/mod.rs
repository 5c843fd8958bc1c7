//! Geometry primitives: axis-aligned boxes and view frusta.
//!
//! Plain value types with containment and intersection tests.
//! No state, no allocation.

mod aabb;
mod frustum;

pub use aabb::AABB;
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
