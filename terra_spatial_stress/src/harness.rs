//! Frame loop driving a `SpatialIndex` the way creature AI and the camera do.
//!
//! Each frame:
//! - moves creatures (when enabled) with a fixed speed in a random XZ direction
//! - runs radius queries from 10% of the creatures (detection checks)
//! - runs three region queries around random points
//! - runs one frustum query from an orbiting camera
//!
//! Every query is timed from the caller's side.

use std::thread;
use std::time::Instant;

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use terra_spatial::terra::{AABB, CategoryMask, EntityRef, Frustum, Result, SpatialIndex, WorldConfig};

use crate::report::Metrics;
use crate::scenario::ScenarioConfig;

/// Wander speed in units per second
const MOVE_SPEED: f32 = 2.0;
/// Region queries per frame
const REGION_QUERIES: usize = 3;
/// Camera orbit radius around the world center
const CAMERA_ORBIT: f32 = 80.0;

pub struct StressTest {
    config: ScenarioConfig,
    index: SpatialIndex,
    creatures: Vec<EntityRef>,
    next_id: u64,
    rng: StdRng,
    /// Half extent of the spawn area on X and Z
    spawn_extent: f32,
    metrics: Metrics,
    frame: u64,
}

impl StressTest {
    pub fn new(config: ScenarioConfig, seed: u64) -> Result<Self> {
        let world = WorldConfig::creature_world();
        let spawn_extent = world.max_bounds.x.min(world.max_bounds.z);

        Ok(Self {
            config,
            index: SpatialIndex::new(world)?,
            creatures: Vec::with_capacity(config.entity_count),
            next_id: 1,
            rng: StdRng::seed_from_u64(seed),
            spawn_extent,
            metrics: Metrics::default(),
            frame: 0,
        })
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Spawn the initial population.
    pub fn spawn_creatures(&mut self) {
        for _ in 0..self.config.entity_count {
            self.spawn_one();
        }
    }

    fn spawn_one(&mut self) {
        let entity = EntityRef(self.next_id);
        self.next_id += 1;
        let position = self.random_ground_position(1.0);
        self.index.add_entity(entity, position, CategoryMask::CREATURES);
        self.creatures.push(entity);
    }

    fn random_ground_position(&mut self, spread: f32) -> Vec3 {
        let extent = self.spawn_extent * spread;
        Vec3::new(
            self.rng.gen_range(-extent..extent),
            0.0,
            self.rng.gen_range(-extent..extent),
        )
    }

    /// Run one simulated frame of `delta_time` seconds.
    pub fn run_frame(&mut self, delta_time: f32) {
        let start = Instant::now();

        if self.config.churn {
            self.churn();
        }
        if self.config.movement {
            self.move_creatures(delta_time);
        }

        if self.config.reader_threads > 0 {
            self.concurrent_queries();
        } else {
            self.radius_queries();
            self.region_queries();
            self.frustum_query();
        }

        self.metrics.record_frame(start.elapsed().as_secs_f32() * 1000.0);
        self.frame += 1;
    }

    fn move_creatures(&mut self, delta_time: f32) {
        let limit = self.spawn_extent;
        for i in 0..self.creatures.len() {
            let entity = self.creatures[i];
            let Some(position) = self.index.position(entity) else {
                continue;
            };

            let direction = Vec3::new(self.rng.gen_range(-1.0..1.0), 0.0, self.rng.gen_range(-1.0..1.0))
                .normalize_or_zero();
            let mut moved = position + direction * MOVE_SPEED * delta_time;
            moved.x = moved.x.clamp(-limit, limit);
            moved.z = moved.z.clamp(-limit, limit);

            self.index.update_entity(entity, moved);
        }
    }

    /// Despawn and respawn a slice of the population, oscillating the
    /// creature count between half and one and a half times its start value.
    fn churn(&mut self) {
        let batch = (self.config.entity_count / 20).max(1);
        let growing = (self.frame / 30) % 2 == 0;
        let max = self.config.entity_count * 3 / 2;
        let min = self.config.entity_count / 2;

        if growing && self.creatures.len() + batch <= max {
            for _ in 0..batch {
                self.spawn_one();
            }
        } else if !growing && self.creatures.len() >= min + batch {
            for _ in 0..batch {
                let slot = self.rng.gen_range(0..self.creatures.len());
                let entity = self.creatures.swap_remove(slot);
                self.index.remove_entity(entity);
            }
        }
    }

    fn radius_queries(&mut self) {
        if self.creatures.is_empty() {
            return;
        }

        let count = (self.creatures.len() / 10).max(1);
        for _ in 0..count {
            let entity = self.creatures[self.rng.gen_range(0..self.creatures.len())];
            let Some(center) = self.index.position(entity) else {
                continue;
            };

            let start = Instant::now();
            let found = self.index.query_radius(center, self.config.query_radius, CategoryMask::CREATURES);
            self.metrics.record_query(start.elapsed().as_secs_f32() * 1000.0, found.len());
        }
    }

    fn region_queries(&mut self) {
        for _ in 0..REGION_QUERIES {
            let center = self.random_ground_position(0.8);
            let half = self.rng.gen_range(5.0..20.0);
            let region = AABB::from_center_radius(center, half);

            let start = Instant::now();
            let found = self.index.query_region(&region, CategoryMask::CREATURES);
            self.metrics.record_query(start.elapsed().as_secs_f32() * 1000.0, found.len());
        }
    }

    fn frustum_query(&mut self) {
        let frustum = camera_frustum(self.frame);

        let start = Instant::now();
        let found = self.index.find_visible_creatures(&frustum);
        self.metrics.record_query(start.elapsed().as_secs_f32() * 1000.0, found.len());
    }

    /// Readers share `&SpatialIndex`; no writer runs while they are active.
    fn concurrent_queries(&mut self) {
        let readers = self.config.reader_threads;
        let radius = self.config.query_radius;
        let frame = self.frame;
        let index = &self.index;

        let seeds: Vec<u64> = (0..readers).map(|_| self.rng.gen()).collect();
        let samples: Vec<Vec<(f32, usize)>> = thread::scope(|scope| {
            let handles: Vec<_> = seeds
                .into_iter()
                .enumerate()
                .map(|(reader, seed)| {
                    scope.spawn(move || reader_pass(index, reader as u64 + frame, seed, radius))
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .collect()
        });

        for (time_ms, found) in samples.into_iter().flatten() {
            self.metrics.record_query(time_ms, found);
        }
    }
}

/// One reader thread's share of a frame: a frustum query plus a few radius
/// queries around random points.
fn reader_pass(index: &SpatialIndex, camera_step: u64, seed: u64, radius: f32) -> Vec<(f32, usize)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bounds = index.world_bounds();
    let mut samples = Vec::with_capacity(5);

    let frustum = camera_frustum(camera_step);
    let start = Instant::now();
    let found = index.find_visible_creatures(&frustum);
    samples.push((start.elapsed().as_secs_f32() * 1000.0, found.len()));

    for _ in 0..4 {
        let center = Vec3::new(
            rng.gen_range(bounds.min.x..bounds.max.x),
            0.0,
            rng.gen_range(bounds.min.z..bounds.max.z),
        );
        let start = Instant::now();
        let found = index.find_creatures_in_radius(center, radius);
        samples.push((start.elapsed().as_secs_f32() * 1000.0, found.len()));
    }

    samples
}

/// Camera orbiting the world center, one degree per step, looking at the origin.
fn camera_frustum(step: u64) -> Frustum {
    let angle = (step % 360) as f32 * std::f32::consts::PI / 180.0;
    let eye = Vec3::new(angle.cos() * CAMERA_ORBIT, 20.0, angle.sin() * CAMERA_ORBIT);
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 250.0);
    Frustum::from_view_projection(&(projection * view))
}
