//! Time-bounded query result cache with lock-free reads.
//!
//! Two buffers back the cache:
//! - the *published* buffer, an immutable snapshot behind an epoch-protected
//!   atomic pointer. Readers pin the epoch, load it and look up their key.
//!   They never take a lock.
//! - the *staging* buffer, owned by writers behind a mutex that readers never
//!   touch. A write mutates staging (insert, TTL sweep, size cap) and then
//!   publishes a copy of it with one atomic swap.
//!
//! A reader therefore sees either the complete old snapshot or the complete
//! new one. Retired snapshots are reclaimed once no pinned reader can still
//! observe them.
//!
//! Entries are looked up by a hash of the query, but a hash match alone never
//! returns data: the stored query parameters must also match within
//! `MATCH_EPSILON`.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam::epoch::{self, Atomic, Owned};
use glam::{Vec3, Vec4};
use rustc_hash::{FxHashMap, FxHasher};

use crate::category::CategoryMask;
use crate::entity::EntityRef;
use crate::error::{Error, Result};
use crate::geometry::{AABB, Frustum};
use crate::{spatial_debug, spatial_err};

const LOG_SOURCE: &str = "terra::QueryCache";

/// Default lifetime of a cached result
pub const DEFAULT_TTL: Duration = Duration::from_millis(100);
/// Default entry budget
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
/// Tolerance when re-checking stored query parameters on a hash hit
const MATCH_EPSILON: f32 = 0.01;

// ===== CONFIG =====

/// Cache lifetime and size budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries older than this are never returned
    pub ttl: Duration,
    /// Entry count above which the oldest entries are evicted
    pub max_entries: usize,
}

impl CacheConfig {
    /// # Errors
    ///
    /// `Error::InvalidCacheConfig` for a zero TTL or a zero entry budget.
    pub fn new(ttl: Duration, max_entries: usize) -> Result<Self> {
        if ttl.is_zero() {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidCacheConfig(
                "ttl must be greater than zero".to_string()
            )));
        }
        if max_entries == 0 {
            return Err(spatial_err!(LOG_SOURCE, Error::InvalidCacheConfig(
                "max_entries must be at least 1".to_string()
            )));
        }
        Ok(Self { ttl, max_entries })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

// ===== KEYS =====

/// Parameters of a cached query, one variant per query shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryKey {
    Radius { center: Vec3, radius: f32 },
    Region { min: Vec3, max: Vec3 },
    Frustum { planes: [Vec4; 6] },
}

/// A query plus the category mask it was filtered with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub query: QueryKey,
    pub mask: CategoryMask,
}

impl CacheKey {
    pub fn radius(center: Vec3, radius: f32, mask: CategoryMask) -> Self {
        Self { query: QueryKey::Radius { center, radius }, mask }
    }

    pub fn region(region: &AABB, mask: CategoryMask) -> Self {
        Self { query: QueryKey::Region { min: region.min, max: region.max }, mask }
    }

    pub fn frustum(frustum: &Frustum, mask: CategoryMask) -> Self {
        Self { query: QueryKey::Frustum { planes: frustum.planes }, mask }
    }

    /// Hash of the exact float bits and the mask.
    fn hash_value(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.mask.bits().hash(&mut hasher);
        match &self.query {
            QueryKey::Radius { center, radius } => {
                0u8.hash(&mut hasher);
                hash_floats(&center.to_array(), &mut hasher);
                radius.to_bits().hash(&mut hasher);
            }
            QueryKey::Region { min, max } => {
                1u8.hash(&mut hasher);
                hash_floats(&min.to_array(), &mut hasher);
                hash_floats(&max.to_array(), &mut hasher);
            }
            QueryKey::Frustum { planes } => {
                2u8.hash(&mut hasher);
                for plane in planes {
                    hash_floats(&plane.to_array(), &mut hasher);
                }
            }
        }
        hasher.finish()
    }

    /// Parameter re-check performed on every hash hit.
    fn matches(&self, other: &CacheKey) -> bool {
        if self.mask != other.mask {
            return false;
        }
        match (&self.query, &other.query) {
            (
                QueryKey::Radius { center: a, radius: ra },
                QueryKey::Radius { center: b, radius: rb },
            ) => a.distance(*b) < MATCH_EPSILON && (ra - rb).abs() < MATCH_EPSILON,
            (
                QueryKey::Region { min: amin, max: amax },
                QueryKey::Region { min: bmin, max: bmax },
            ) => amin.distance(*bmin) < MATCH_EPSILON && amax.distance(*bmax) < MATCH_EPSILON,
            (QueryKey::Frustum { planes: a }, QueryKey::Frustum { planes: b }) => a
                .iter()
                .zip(b.iter())
                .all(|(pa, pb)| pa.distance(*pb) < MATCH_EPSILON),
            _ => false,
        }
    }
}

fn hash_floats<H: Hasher>(values: &[f32], hasher: &mut H) {
    for value in values {
        value.to_bits().hash(hasher);
    }
}

// ===== BUFFERS =====

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    /// Time of insertion, relative to the cache's creation instant
    timestamp: Duration,
    results: Vec<EntityRef>,
}

type CacheBuffer = FxHashMap<u64, Arc<CacheEntry>>;

// ===== CACHE =====

/// Query result cache shared by all readers of a `SpatialIndex`.
pub struct QueryCache {
    config: CacheConfig,
    /// Creation time; entry timestamps are offsets from it
    epoch: Instant,
    /// Snapshot served to readers
    published: Atomic<CacheBuffer>,
    /// Writer-side buffer
    staging: Mutex<CacheBuffer>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            epoch: Instant::now(),
            published: Atomic::new(CacheBuffer::default()),
            staging: Mutex::new(CacheBuffer::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Duration) -> bool {
        now.saturating_sub(entry.timestamp) < self.config.ttl
    }

    /// Look up a cached result. Never blocks.
    ///
    /// Counts a hit or a miss.
    pub fn try_get(&self, key: &CacheKey) -> Option<Vec<EntityRef>> {
        let hash = key.hash_value();
        let now = self.now();

        let guard = epoch::pin();
        let snapshot = self.published.load(Ordering::Acquire, &guard);
        // SAFETY: `published` is never null (set in `new`, only ever replaced
        // by `swap` with a fresh allocation), and the snapshot it points to is
        // only destroyed through `defer_destroy`, which waits for this guard.
        let buffer = unsafe { snapshot.as_ref() };

        let found = buffer
            .and_then(|buffer| buffer.get(&hash))
            .filter(|entry| self.is_fresh(entry, now) && entry.key.matches(key))
            .map(|entry| entry.results.clone());

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a result and publish the updated snapshot.
    ///
    /// Expired entries are swept first. If the cache is still over budget,
    /// the oldest entries (by insertion time) are evicted.
    pub fn put(&self, key: CacheKey, results: &[EntityRef]) {
        let now = self.now();
        let entry = Arc::new(CacheEntry {
            key,
            timestamp: now,
            results: results.to_vec(),
        });

        if let Ok(mut staging) = self.staging.lock() {
            staging.insert(key.hash_value(), entry);
            self.evict(&mut staging, now);
            self.publish(staging.clone());
        }
    }

    /// Drop every entry. Hit/miss counters are kept.
    pub fn clear(&self) {
        if let Ok(mut staging) = self.staging.lock() {
            if staging.is_empty() {
                return;
            }
            staging.clear();
            self.publish(CacheBuffer::default());
        }
    }

    /// Evict expired and excess entries without inserting anything.
    pub fn cleanup(&self) {
        if let Ok(mut staging) = self.staging.lock() {
            let before = staging.len();
            self.evict(&mut staging, self.now());
            let removed = before - staging.len();
            if removed > 0 {
                self.publish(staging.clone());
                spatial_debug!(LOG_SOURCE, "Cleanup evicted {} entries ({} left)", removed, staging.len());
            }
        }
    }

    /// Number of entries, fresh or not, in the current buffer.
    pub fn len(&self) -> usize {
        self.staging.lock().map(|staging| staging.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that hit, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f32 {
        let hits = self.hit_count();
        let total = hits + self.miss_count();
        if total == 0 {
            return 0.0;
        }
        hits as f32 / total as f32
    }

    pub fn reset_statistics(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn evict(&self, buffer: &mut CacheBuffer, now: Duration) {
        buffer.retain(|_, entry| self.is_fresh(entry, now));

        if buffer.len() > self.config.max_entries {
            let mut by_age: Vec<(u64, Duration)> = buffer
                .iter()
                .map(|(hash, entry)| (*hash, entry.timestamp))
                .collect();
            by_age.sort_by_key(|&(_, timestamp)| timestamp);

            let excess = buffer.len() - self.config.max_entries;
            for (hash, _) in by_age.into_iter().take(excess) {
                buffer.remove(&hash);
            }
        }
    }

    /// Swap in a new snapshot and retire the old one.
    fn publish(&self, buffer: CacheBuffer) {
        let guard = epoch::pin();
        let old = self.published.swap(Owned::new(buffer), Ordering::AcqRel, &guard);
        if !old.is_null() {
            // SAFETY: `old` was just unlinked from `published`, so no new
            // reader can load it; readers already holding it are pinned and
            // destruction is deferred until they unpin.
            unsafe { guard.defer_destroy(old) };
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl Drop for QueryCache {
    fn drop(&mut self) {
        // SAFETY: `&mut self` guarantees no reader holds a reference into
        // the published snapshot.
        unsafe {
            let guard = epoch::unprotected();
            let snapshot = self.published.load(Ordering::Acquire, guard);
            if !snapshot.is_null() {
                drop(snapshot.into_owned());
            }
        }
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("hits", &self.hit_count())
            .field("misses", &self.miss_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "query_cache_tests.rs"]
mod tests;
