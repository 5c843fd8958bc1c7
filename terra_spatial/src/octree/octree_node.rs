//! Dynamic octree over entity positions.
//!
//! Each entity is a point and lives in exactly one leaf: the leaf whose
//! octant routing (component-wise `>=` against each node center) leads to
//! it. Internal nodes hold no entities. A node is either a leaf or owns all
//! eight children; there are no partially populated child sets.
//!
//! The tree grows lazily. Subdivision is driven by the owner through
//! [`OctreeNode::split_overfull`] because redistributing a leaf needs the
//! position of every entity it holds, and only the owner has the position
//! table. The tree never collapses children back into a leaf.
//!
//! Queries return *candidates*: every entity of every leaf whose box meets
//! the query shape. Exact point tests are left to the caller.

use glam::Vec3;
use crate::entity::EntityRef;
use crate::geometry::{AABB, Frustum, FrustumTest};
use crate::world_config::WorldConfig;
use crate::spatial_trace;

const LOG_SOURCE: &str = "terra::Octree";

/// Limits that decide when a leaf splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLimits {
    /// A leaf splits once it holds more than this many entities
    pub node_capacity: usize,
    /// Nodes at this depth never split (root = 0)
    pub max_depth: u32,
    /// A node stops splitting once its children's longest edge would be
    /// shorter than this
    pub min_node_size: f32,
}

impl TreeLimits {
    pub fn from_world(world: &WorldConfig) -> Self {
        Self {
            node_capacity: world.node_capacity,
            max_depth: world.max_depth,
            min_node_size: world.min_node_size,
        }
    }
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self::from_world(&WorldConfig::default())
    }
}

/// Shape of the tree, gathered by a full walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStatistics {
    /// Total nodes, root included
    pub node_count: usize,
    /// Deepest node depth (root = 0)
    pub max_depth: u32,
    /// Entities stored across all leaves
    pub total_entities: usize,
}

/// A node of the octree.
#[derive(Debug)]
pub struct OctreeNode {
    bounds: AABB,
    depth: u32,
    /// Entities of a leaf. Always empty on internal nodes.
    entities: Vec<EntityRef>,
    /// `None` for a leaf
    children: Option<Box<[OctreeNode; 8]>>,
}

impl OctreeNode {
    /// Create an empty leaf.
    pub fn new(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            entities: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Entities stored directly in this node (empty for internal nodes).
    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    /// The eight children, or `None` for a leaf.
    pub fn children(&self) -> Option<&[OctreeNode; 8]> {
        self.children.as_deref()
    }

    // ===== OCTANTS =====

    /// Octant code of `position` relative to this node's center.
    ///
    /// Bit layout: bit0 = X, bit1 = Y, bit2 = Z (1 when the coordinate is
    /// `>=` the center).
    pub fn child_index(&self, position: Vec3) -> usize {
        let center = self.bounds.center();
        ((position.x >= center.x) as usize)
            | (((position.y >= center.y) as usize) << 1)
            | (((position.z >= center.z) as usize) << 2)
    }

    /// Box of octant `octant` (0-7), using the same bit layout as `child_index`.
    pub fn child_bounds(&self, octant: usize) -> AABB {
        let parent = &self.bounds;
        let center = parent.center();
        AABB::new(
            Vec3::new(
                if octant & 1 == 0 { parent.min.x } else { center.x },
                if octant & 2 == 0 { parent.min.y } else { center.y },
                if octant & 4 == 0 { parent.min.z } else { center.z },
            ),
            Vec3::new(
                if octant & 1 == 0 { center.x } else { parent.max.x },
                if octant & 2 == 0 { center.y } else { parent.max.y },
                if octant & 4 == 0 { center.z } else { parent.max.z },
            ),
        )
    }

    // ===== MUTATION =====

    /// Store `entity` in the leaf that owns `position`.
    ///
    /// Returns `false` (and stores nothing) when `position` is outside this
    /// node's box. Never splits; see [`split_overfull`](Self::split_overfull).
    pub fn insert(&mut self, entity: EntityRef, position: Vec3) -> bool {
        if !self.bounds.contains_point(position) {
            return false;
        }

        let octant = self.child_index(position);
        match self.children.as_deref_mut() {
            None => {
                self.entities.push(entity);
                true
            }
            Some(children) => children[octant].insert(entity, position),
        }
    }

    /// Remove `entity`, which was stored at `position`.
    ///
    /// Only the branch owning `position` is searched. Returns whether the
    /// entity was found.
    pub fn remove(&mut self, entity: EntityRef, position: Vec3) -> bool {
        if !self.bounds.contains_point(position) {
            return false;
        }

        let octant = self.child_index(position);
        match self.children.as_deref_mut() {
            None => match self.entities.iter().position(|&e| e == entity) {
                Some(index) => {
                    self.entities.swap_remove(index);
                    true
                }
                None => false,
            },
            Some(children) => children[octant].remove(entity, position),
        }
    }

    /// Move `entity` from `old_position` to `new_position`.
    ///
    /// Recurses only into the children owning either position; a move that
    /// stays inside one leaf touches nothing.
    pub fn update(&mut self, entity: EntityRef, old_position: Vec3, new_position: Vec3) {
        let old_inside = self.bounds.contains_point(old_position);
        let new_inside = self.bounds.contains_point(new_position);

        match (old_inside, new_inside) {
            (false, false) => {}
            (true, false) => {
                self.remove(entity, old_position);
            }
            (false, true) => {
                self.insert(entity, new_position);
            }
            (true, true) => {
                let old_octant = self.child_index(old_position);
                let new_octant = self.child_index(new_position);
                if let Some(children) = self.children.as_deref_mut() {
                    if old_octant == new_octant {
                        children[old_octant].update(entity, old_position, new_position);
                    } else {
                        children[old_octant].remove(entity, old_position);
                        children[new_octant].insert(entity, new_position);
                    }
                }
            }
        }
    }

    /// Drop every entity and every child.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.children = None;
    }

    // ===== SUBDIVISION =====

    /// True when this leaf holds too many entities and is still allowed to split.
    ///
    /// The size limit looks at the longest edge so that flat worlds (thin on
    /// Y) keep splitting along their wide axes.
    pub fn should_subdivide(&self, limits: &TreeLimits) -> bool {
        let child_edge = self.bounds.size().max_element() * 0.5;
        self.is_leaf()
            && self.entities.len() > limits.node_capacity
            && self.depth < limits.max_depth
            && child_edge >= limits.min_node_size
    }

    /// Turn this leaf into an internal node and redistribute its entities.
    ///
    /// Entities for which `position_of` yields nothing are dropped: the
    /// owner no longer tracks them.
    pub fn subdivide<F>(&mut self, position_of: &F)
    where
        F: Fn(EntityRef) -> Option<Vec3>,
    {
        if !self.is_leaf() {
            return;
        }

        let mut children: Box<[OctreeNode; 8]> = Box::new(std::array::from_fn(|octant| {
            OctreeNode::new(self.child_bounds(octant), self.depth + 1)
        }));

        for entity in std::mem::take(&mut self.entities) {
            if let Some(position) = position_of(entity) {
                children[self.child_index(position)].insert(entity, position);
            }
        }

        spatial_trace!(LOG_SOURCE, "Subdivided node at depth {} ({:?} .. {:?})",
            self.depth, self.bounds.min, self.bounds.max);

        self.children = Some(children);
    }

    /// Split the leaf owning `position` while it is over capacity.
    ///
    /// Children that are still over capacity after redistribution (for
    /// example when many entities share one octant) are split in turn,
    /// down to the depth and size limits.
    pub fn split_overfull<F>(&mut self, position: Vec3, limits: &TreeLimits, position_of: &F)
    where
        F: Fn(EntityRef) -> Option<Vec3>,
    {
        if !self.bounds.contains_point(position) {
            return;
        }

        if self.is_leaf() {
            self.split_recursive(limits, position_of);
            return;
        }

        let octant = self.child_index(position);
        if let Some(children) = self.children.as_deref_mut() {
            children[octant].split_overfull(position, limits, position_of);
        }
    }

    fn split_recursive<F>(&mut self, limits: &TreeLimits, position_of: &F)
    where
        F: Fn(EntityRef) -> Option<Vec3>,
    {
        if !self.should_subdivide(limits) {
            return;
        }

        self.subdivide(position_of);

        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.split_recursive(limits, position_of);
            }
        }
    }

    // ===== QUERIES =====

    /// Collect the entities of every leaf whose box intersects `region`.
    pub fn query_region(&self, region: &AABB, results: &mut Vec<EntityRef>) {
        if !self.bounds.intersects(region) {
            return;
        }

        match self.children.as_deref() {
            None => results.extend_from_slice(&self.entities),
            Some(children) => {
                for child in children {
                    child.query_region(region, results);
                }
            }
        }
    }

    /// Collect the entities of every leaf whose box comes within `radius`
    /// of `center`.
    pub fn query_radius(&self, center: Vec3, radius: f32, results: &mut Vec<EntityRef>) {
        let closest = center.clamp(self.bounds.min, self.bounds.max);
        if closest.distance_squared(center) > radius * radius {
            return;
        }

        match self.children.as_deref() {
            None => results.extend_from_slice(&self.entities),
            Some(children) => {
                for child in children {
                    child.query_radius(center, radius, results);
                }
            }
        }
    }

    /// Collect the entities of every leaf whose box meets `frustum`.
    ///
    /// 3-way classification at each node:
    /// - `Outside` → skip entire subtree
    /// - `Inside` → collect the whole subtree without further tests
    /// - `Partial` → recurse into children
    pub fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<EntityRef>) {
        match frustum.classify_aabb(&self.bounds) {
            FrustumTest::Outside => {}
            FrustumTest::Inside => self.collect_all(results),
            FrustumTest::Partial => match self.children.as_deref() {
                None => results.extend_from_slice(&self.entities),
                Some(children) => {
                    for child in children {
                        child.query_frustum(frustum, results);
                    }
                }
            },
        }
    }

    /// Collect every entity of this subtree (no shape test).
    pub fn collect_all(&self, results: &mut Vec<EntityRef>) {
        results.extend_from_slice(&self.entities);
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.collect_all(results);
            }
        }
    }

    // ===== STATISTICS =====

    /// Entities stored in this subtree.
    pub fn entity_count(&self) -> usize {
        let own = self.entities.len();
        match self.children.as_deref() {
            None => own,
            Some(children) => own + children.iter().map(OctreeNode::entity_count).sum::<usize>(),
        }
    }

    /// Walk the subtree and gather node count, depth and entity count.
    pub fn statistics(&self) -> TreeStatistics {
        let mut stats = TreeStatistics::default();
        self.gather_statistics(&mut stats);
        stats
    }

    fn gather_statistics(&self, stats: &mut TreeStatistics) {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(self.depth);
        stats.total_entities += self.entities.len();

        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.gather_statistics(stats);
            }
        }
    }
}

#[cfg(test)]
#[path = "octree_node_tests.rs"]
mod tests;
