//! Camera frustum used by visibility queries.
//!
//! A plane is stored as `Vec4(nx, ny, nz, d)`. The normal faces into the
//! visible volume, so a point `p` is on the visible side of a plane when
//! `n·p + d >= 0`. A point is inside the frustum when that holds for all six.
//!
//! Games normally build one frustum per frame from the camera matrices and
//! pass it to `SpatialIndex::query_frustum`.

use glam::{Mat4, Vec3, Vec4};
use super::AABB;

/// How a box relates to a frustum.
///
/// The octree uses this to prune its walk: `Outside` drops a subtree,
/// `Inside` takes a whole subtree untested, `Partial` keeps descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// No point of the box is visible
    Outside,
    /// Every point of the box is visible
    Inside,
    /// The box straddles at least one plane
    Partial,
}

// Plane slots in `Frustum::planes`
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six inward-facing planes with unit normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Indexed by the `PLANE_*` constants
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Wrap six planes, rescaling each so its normal has unit length.
    ///
    /// A plane whose normal is zero is stored unchanged.
    pub fn from_planes(planes: [Vec4; 6]) -> Self {
        Self { planes: planes.map(unit_plane) }
    }

    /// Planes of the clip volume of a view-projection matrix.
    ///
    /// Side and far planes are the last matrix row plus or minus one of the
    /// first three (Gribb/Hartmann). The near plane is the third row alone,
    /// matching the `[0, 1]` clip depth of glam's projections. Perspective
    /// and orthographic matrices both work.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let (x, y, z, w) = (vp.row(0), vp.row(1), vp.row(2), vp.row(3));

        let mut planes = [Vec4::ZERO; 6];
        planes[PLANE_LEFT] = w + x;
        planes[PLANE_RIGHT] = w - x;
        planes[PLANE_BOTTOM] = w + y;
        planes[PLANE_TOP] = w - y;
        planes[PLANE_NEAR] = z;
        planes[PLANE_FAR] = w - z;

        Self::from_planes(planes)
    }

    /// True when `point` is inside or on the surface.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|&plane| signed_distance(plane, point) >= 0.0)
    }

    /// Conservative overlap test: never misses a visible box, but may accept
    /// a box that sits just outside a frustum corner.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.classify_aabb(aabb) != FrustumTest::Outside
    }

    /// Classify `aabb` with the corner test.
    ///
    /// For each plane, the corner furthest along the normal decides whether
    /// the box can be visible at all; the opposite corner decides whether it
    /// is fully on the visible side.
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut result = FrustumTest::Inside;

        for &plane in &self.planes {
            let normal = plane.truncate();
            let toward = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            let away = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.min, aabb.max);

            if signed_distance(plane, toward) < 0.0 {
                return FrustumTest::Outside;
            }
            if signed_distance(plane, away) < 0.0 {
                result = FrustumTest::Partial;
            }
        }

        result
    }
}

fn signed_distance(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

fn unit_plane(plane: Vec4) -> Vec4 {
    let length = plane.truncate().length();
    if length > 0.0 { plane / length } else { plane }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
