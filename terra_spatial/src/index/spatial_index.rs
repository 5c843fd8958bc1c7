//! SpatialIndex: entity tracking and filtered spatial queries.
//!
//! The index owns the octree, the entity position and category tables, the
//! query cache and the performance counters. The position table is the
//! single source of truth for where an entity is; the tree mirrors it for
//! fast candidate lookup.
//!
//! Every query follows the same pipeline:
//! 1. probe the cache
//! 2. on a miss, walk the tree for candidates
//! 3. keep candidates whose stored position passes the exact shape test
//!    and whose category matches the mask
//! 4. cache the filtered result and record statistics
//!
//! Mutation takes `&mut self` and queries take `&self`, so a single writer
//! can hand `&SpatialIndex` to any number of reader threads between
//! mutation phases.
//!
//! Positions outside the world bounds are recorded in the position table
//! but are not stored in the tree, so no query finds them.

use std::sync::Mutex;
use std::time::Instant;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::cache::{CacheConfig, CacheKey, QueryCache};
use crate::category::{self, CategoryMask};
use crate::entity::EntityRef;
use crate::error::Result;
use crate::geometry::{AABB, Frustum};
use crate::octree::{OctreeNode, TreeLimits, TreeStatistics};
use crate::world_config::WorldConfig;
use crate::{spatial_debug, spatial_info, spatial_warn};
use super::stats::SpatialStats;

const LOG_SOURCE: &str = "terra::SpatialIndex";

/// Dynamic octree index over game entities.
#[derive(Debug)]
pub struct SpatialIndex {
    world: WorldConfig,
    limits: TreeLimits,
    root: OctreeNode,
    /// Entity → position (ground truth)
    positions: FxHashMap<EntityRef, Vec3>,
    /// Entity → category, independent of position
    categories: FxHashMap<EntityRef, CategoryMask>,
    cache: QueryCache,
    stats: Mutex<SpatialStats>,
}

impl SpatialIndex {
    /// Create an empty index over `world` with the default cache settings.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `world` if it is malformed.
    pub fn new(world: WorldConfig) -> Result<Self> {
        Self::with_cache_config(world, CacheConfig::default())
    }

    /// Create an empty index with explicit cache settings.
    pub fn with_cache_config(world: WorldConfig, cache_config: CacheConfig) -> Result<Self> {
        world.validate()?;

        spatial_info!(LOG_SOURCE, "Spatial index '{}' initialized: bounds {:?} .. {:?}, max depth {}, node capacity {}",
            world.name, world.min_bounds, world.max_bounds, world.max_depth, world.node_capacity);

        Ok(Self {
            limits: TreeLimits::from_world(&world),
            root: OctreeNode::new(world.bounding_box(), 0),
            world,
            positions: FxHashMap::default(),
            categories: FxHashMap::default(),
            cache: QueryCache::new(cache_config),
            stats: Mutex::new(SpatialStats::default()),
        })
    }

    // ===== ENTITY LIFECYCLE =====

    /// Start tracking `entity`.
    ///
    /// Re-adding a tracked entity logs a warning and updates its position
    /// and category in place. Invalidates the query cache.
    pub fn add_entity(&mut self, entity: EntityRef, position: Vec3, category: CategoryMask) {
        if self.positions.contains_key(&entity) {
            spatial_warn!(LOG_SOURCE, "{} already tracked, updating position and category", entity);
            self.update_entity(entity, position);
            self.update_entity_category(entity, category);
            return;
        }

        self.positions.insert(entity, position);
        self.categories.insert(entity, category);
        self.insert_into_tree(entity, position);
        self.cache.clear();
    }

    /// Stop tracking `entity`. Returns `false` (with a warning) if it was not tracked.
    pub fn remove_entity(&mut self, entity: EntityRef) -> bool {
        let Some(position) = self.positions.remove(&entity) else {
            spatial_warn!(LOG_SOURCE, "Attempted to remove untracked {}", entity);
            return false;
        };

        self.categories.remove(&entity);
        self.root.remove(entity, position);
        self.cache.clear();
        true
    }

    /// Move `entity` to `position`.
    ///
    /// An untracked entity is added with no category, after a warning.
    pub fn update_entity(&mut self, entity: EntityRef, position: Vec3) {
        let Some(stored) = self.positions.get_mut(&entity) else {
            spatial_warn!(LOG_SOURCE, "Attempted to update untracked {}, adding it", entity);
            self.add_entity(entity, position, category::NONE);
            return;
        };

        let old_position = std::mem::replace(stored, position);
        self.root.update(entity, old_position, position);
        self.split_around(position);
        self.cache.clear();
    }

    /// Replace the category of `entity`.
    ///
    /// Does not invalidate the cache: results cached before the change may
    /// still be served until they expire (one TTL at most). Ignored, with a
    /// warning, for untracked entities.
    pub fn update_entity_category(&mut self, entity: EntityRef, category: CategoryMask) {
        if !self.positions.contains_key(&entity) {
            spatial_warn!(LOG_SOURCE, "Attempted to update category of untracked {}", entity);
            return;
        }
        self.categories.insert(entity, category);
    }

    /// Forget every entity, empty the cache and zero all statistics.
    pub fn clear(&mut self) {
        self.root.clear();
        self.positions.clear();
        self.categories.clear();
        self.cache.clear();
        self.cache.reset_statistics();
        if let Ok(mut stats) = self.stats.lock() {
            *stats = SpatialStats::default();
        }
        spatial_debug!(LOG_SOURCE, "Spatial index '{}' cleared", self.world.name);
    }

    /// Rebuild the tree from the position table.
    ///
    /// The tree never collapses nodes on removal; after heavy churn this
    /// discards the old structure and re-inserts every tracked entity.
    pub fn rebuild(&mut self) {
        let before = self.root.statistics();

        self.root = OctreeNode::new(self.world.bounding_box(), 0);
        let positions = &self.positions;
        for (&entity, &position) in positions {
            if self.root.insert(entity, position) {
                self.root.split_overfull(position, &self.limits, &|e| positions.get(&e).copied());
            }
        }
        self.cache.clear();

        let after = self.root.statistics();
        spatial_info!(LOG_SOURCE, "Rebuilt spatial index '{}': {} -> {} nodes, {} entities",
            self.world.name, before.node_count, after.node_count, after.total_entities);
    }

    fn insert_into_tree(&mut self, entity: EntityRef, position: Vec3) {
        if self.root.insert(entity, position) {
            self.split_around(position);
        }
    }

    /// Split the leaf owning `position` if it went over capacity.
    fn split_around(&mut self, position: Vec3) {
        let positions = &self.positions;
        self.root.split_overfull(position, &self.limits, &|e| positions.get(&e).copied());
    }

    // ===== QUERIES =====

    /// Entities within `radius` of `center` whose category matches `mask`.
    ///
    /// Order is unspecified. A negative or NaN radius yields nothing; a
    /// radius of zero yields only entities stored exactly at `center`.
    pub fn query_radius(&self, center: Vec3, radius: f32, mask: CategoryMask) -> Vec<EntityRef> {
        if radius.is_nan() || radius < 0.0 || !center.is_finite() {
            return Vec::new();
        }

        let key = CacheKey::radius(center, radius, mask);
        self.cached_query(key, |candidates| {
            self.root.query_radius(center, radius, candidates);
            self.filter_candidates(candidates, mask, |position| position.distance(center) <= radius)
        })
    }

    /// Entities inside `region` (bounds inclusive) whose category matches `mask`.
    ///
    /// A degenerate region (inverted, flat or NaN) yields nothing.
    pub fn query_region(&self, region: &AABB, mask: CategoryMask) -> Vec<EntityRef> {
        if region.is_degenerate() {
            return Vec::new();
        }

        let key = CacheKey::region(region, mask);
        self.cached_query(key, |candidates| {
            self.root.query_region(region, candidates);
            self.filter_candidates(candidates, mask, |position| region.contains_point(position))
        })
    }

    /// Entities inside `frustum` whose category matches `mask`.
    pub fn query_frustum(&self, frustum: &Frustum, mask: CategoryMask) -> Vec<EntityRef> {
        let key = CacheKey::frustum(frustum, mask);
        self.cached_query(key, |candidates| {
            self.root.query_frustum(frustum, candidates);
            self.filter_candidates(candidates, mask, |position| frustum.contains_point(position))
        })
    }

    /// Up to `count` entities nearest to `position`, closest first.
    ///
    /// Only entities within `max_distance` are considered. Entities at equal
    /// distance keep the order in which the region query returned them.
    pub fn find_nearest_entities(
        &self,
        position: Vec3,
        count: usize,
        max_distance: f32,
        mask: CategoryMask,
    ) -> Vec<EntityRef> {
        if count == 0 {
            return Vec::new();
        }

        let search = AABB::from_center_radius(position, max_distance);
        let mut by_distance: Vec<(f32, EntityRef)> = self
            .query_region(&search, mask)
            .into_iter()
            .filter_map(|entity| {
                let distance = self.positions.get(&entity)?.distance(position);
                (distance <= max_distance).then_some((distance, entity))
            })
            .collect();

        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
        by_distance.truncate(count);
        by_distance.into_iter().map(|(_, entity)| entity).collect()
    }

    /// The nearest entity within `max_distance`, if any.
    pub fn find_nearest_entity(
        &self,
        position: Vec3,
        max_distance: f32,
        mask: CategoryMask,
    ) -> Option<EntityRef> {
        self.find_nearest_entities(position, 1, max_distance, mask)
            .into_iter()
            .next()
    }

    /// Creatures within `radius` of `center`.
    pub fn find_creatures_in_radius(&self, center: Vec3, radius: f32) -> Vec<EntityRef> {
        self.query_radius(center, radius, CategoryMask::CREATURES)
    }

    /// Creatures inside the camera frustum.
    pub fn find_visible_creatures(&self, frustum: &Frustum) -> Vec<EntityRef> {
        self.query_frustum(frustum, CategoryMask::CREATURES)
    }

    /// Cache probe, tree walk on a miss, then cache fill and statistics.
    fn cached_query<F>(&self, key: CacheKey, compute: F) -> Vec<EntityRef>
    where
        F: FnOnce(&mut Vec<EntityRef>) -> Vec<EntityRef>,
    {
        if let Some(cached) = self.cache.try_get(&key) {
            self.record_query(0.0, cached.len(), true);
            return cached;
        }

        let start = Instant::now();
        let mut candidates = Vec::new();
        let results = compute(&mut candidates);
        let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;

        self.cache.put(key, &results);
        self.record_query(elapsed_ms, results.len(), false);
        results
    }

    /// Keep candidates whose stored position passes `shape_test` and whose
    /// category matches `mask`.
    fn filter_candidates<T>(&self, candidates: &[EntityRef], mask: CategoryMask, shape_test: T) -> Vec<EntityRef>
    where
        T: Fn(Vec3) -> bool,
    {
        candidates
            .iter()
            .copied()
            .filter(|entity| {
                self.positions
                    .get(entity)
                    .is_some_and(|&position| shape_test(position))
                    && self.passes_category_filter(*entity, mask)
            })
            .collect()
    }

    /// `ALL` matches every entity, even one that never received a category.
    /// Any other mask needs an overlapping recorded category.
    fn passes_category_filter(&self, entity: EntityRef, mask: CategoryMask) -> bool {
        if category::is_all(mask) {
            return true;
        }
        self.categories
            .get(&entity)
            .is_some_and(|&recorded| category::contains(mask, recorded))
    }

    fn record_query(&self, query_time_ms: f32, entities_returned: usize, cache_hit: bool) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record(query_time_ms, entities_returned, cache_hit);
        }
    }

    // ===== CACHE =====

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
        spatial_debug!(LOG_SOURCE, "Query cache cleared");
    }

    /// Evict expired and excess cache entries.
    pub fn cleanup_cache(&self) {
        self.cache.cleanup();
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ===== STATISTICS =====

    /// Snapshot of the query counters. Safe to call from any thread.
    pub fn statistics(&self) -> SpatialStats {
        let mut snapshot = self
            .stats
            .lock()
            .map(|stats| *stats)
            .unwrap_or_default();
        snapshot.cache_hit_rate = self.cache.hit_rate();
        snapshot.cache_size = self.cache.len();
        snapshot
    }

    /// Walk the tree and report its shape.
    pub fn tree_statistics(&self) -> TreeStatistics {
        self.root.statistics()
    }

    // ===== INTROSPECTION =====

    /// Number of tracked entities, including those outside the world bounds.
    pub fn entity_count(&self) -> usize {
        self.positions.len()
    }

    pub fn contains(&self, entity: EntityRef) -> bool {
        self.positions.contains_key(&entity)
    }

    /// Stored position of `entity`.
    pub fn position(&self, entity: EntityRef) -> Option<Vec3> {
        self.positions.get(&entity).copied()
    }

    /// Recorded category of `entity`.
    pub fn category(&self, entity: EntityRef) -> Option<CategoryMask> {
        self.categories.get(&entity).copied()
    }

    pub fn world_bounds(&self) -> AABB {
        self.world.bounding_box()
    }

    pub fn world_config(&self) -> &WorldConfig {
        &self.world
    }

    /// Root of the octree, for debug inspection.
    pub fn root(&self) -> &OctreeNode {
        &self.root
    }
}

#[cfg(test)]
#[path = "spatial_index_tests.rs"]
mod tests;
