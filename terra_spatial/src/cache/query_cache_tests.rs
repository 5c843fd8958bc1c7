use std::thread;
use glam::{Mat4, Vec3};
use super::*;

fn entities(ids: &[u64]) -> Vec<EntityRef> {
    ids.iter().copied().map(EntityRef).collect()
}

fn radius_key(x: f32, radius: f32) -> CacheKey {
    CacheKey::radius(Vec3::new(x, 0.0, 0.0), radius, CategoryMask::ALL)
}

fn short_lived(ttl_ms: u64, max_entries: usize) -> QueryCache {
    QueryCache::new(CacheConfig::new(Duration::from_millis(ttl_ms), max_entries).unwrap())
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.ttl, Duration::from_millis(100));
    assert_eq!(config.max_entries, 1000);
}

#[test]
fn test_config_rejects_zero_values() {
    assert!(matches!(
        CacheConfig::new(Duration::ZERO, 10),
        Err(Error::InvalidCacheConfig(_))
    ));
    assert!(matches!(
        CacheConfig::new(Duration::from_millis(10), 0),
        Err(Error::InvalidCacheConfig(_))
    ));
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn test_key_hash_distinguishes_shapes() {
    let radius = CacheKey::radius(Vec3::ZERO, 1.0, CategoryMask::ALL);
    let region = CacheKey::region(&AABB::new(Vec3::ZERO, Vec3::ONE), CategoryMask::ALL);
    assert_ne!(radius.hash_value(), region.hash_value());
    assert!(!radius.matches(&region));
}

#[test]
fn test_key_hash_includes_mask() {
    let a = CacheKey::radius(Vec3::ZERO, 1.0, CategoryMask::CREATURES);
    let b = CacheKey::radius(Vec3::ZERO, 1.0, CategoryMask::TERRAIN);
    assert_ne!(a.hash_value(), b.hash_value());
    assert!(!a.matches(&b));
}

#[test]
fn test_key_matches_within_epsilon() {
    let a = radius_key(1.0, 5.0);
    let near = radius_key(1.005, 5.005);
    let far = radius_key(1.5, 5.0);
    assert!(a.matches(&near));
    assert!(!a.matches(&far));
}

#[test]
fn test_frustum_key() {
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let f1 = Frustum::from_view_projection(&proj);
    let f2 = Frustum::from_view_projection(&(proj * Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0))));

    let k1 = CacheKey::frustum(&f1, CategoryMask::ALL);
    assert_eq!(k1.hash_value(), CacheKey::frustum(&f1, CategoryMask::ALL).hash_value());
    assert!(k1.matches(&CacheKey::frustum(&f1, CategoryMask::ALL)));
    assert!(!k1.matches(&CacheKey::frustum(&f2, CategoryMask::ALL)));
}

// ============================================================================
// Get / put
// ============================================================================

#[test]
fn test_miss_then_hit() {
    let cache = QueryCache::default();
    let key = radius_key(0.0, 10.0);

    assert!(cache.try_get(&key).is_none());
    cache.put(key, &entities(&[1, 2, 3]));
    assert_eq!(cache.try_get(&key), Some(entities(&[1, 2, 3])));

    assert_eq!(cache.hit_count(), 1);
    assert_eq!(cache.miss_count(), 1);
    assert_eq!(cache.hit_rate(), 0.5);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_empty_result_is_cached() {
    let cache = QueryCache::default();
    let key = radius_key(0.0, 1.0);
    cache.put(key, &[]);
    assert_eq!(cache.try_get(&key), Some(Vec::new()));
}

#[test]
fn test_put_replaces_same_key() {
    let cache = QueryCache::default();
    let key = radius_key(0.0, 10.0);
    cache.put(key, &entities(&[1]));
    cache.put(key, &entities(&[2]));
    assert_eq!(cache.try_get(&key), Some(entities(&[2])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_different_parameters_miss() {
    let cache = QueryCache::default();
    cache.put(radius_key(0.0, 10.0), &entities(&[1]));
    assert!(cache.try_get(&radius_key(0.0, 11.0)).is_none());
    assert!(cache.try_get(&radius_key(3.0, 10.0)).is_none());
}

#[test]
fn test_hit_rate_before_lookups() {
    let cache = QueryCache::default();
    assert_eq!(cache.hit_rate(), 0.0);
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn test_ttl_expiry() {
    let cache = short_lived(20, 100);
    let key = radius_key(0.0, 10.0);
    cache.put(key, &entities(&[7]));
    assert!(cache.try_get(&key).is_some());

    thread::sleep(Duration::from_millis(40));
    assert!(cache.try_get(&key).is_none());
}

#[test]
fn test_expired_entries_swept_on_put() {
    let cache = short_lived(20, 100);
    cache.put(radius_key(0.0, 1.0), &entities(&[1]));
    cache.put(radius_key(1.0, 1.0), &entities(&[2]));
    assert_eq!(cache.len(), 2);

    thread::sleep(Duration::from_millis(40));
    cache.put(radius_key(2.0, 1.0), &entities(&[3]));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cleanup_evicts_expired() {
    let cache = short_lived(20, 100);
    cache.put(radius_key(0.0, 1.0), &entities(&[1]));
    thread::sleep(Duration::from_millis(40));

    cache.cleanup();
    assert!(cache.is_empty());
}

#[test]
fn test_max_entries_evicts_oldest() {
    let cache = short_lived(60_000, 3);
    for i in 0..5 {
        cache.put(radius_key(i as f32 * 10.0, 1.0), &entities(&[i]));
        // Distinct timestamps
        thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(cache.len(), 3);
    assert!(cache.try_get(&radius_key(0.0, 1.0)).is_none());
    assert!(cache.try_get(&radius_key(10.0, 1.0)).is_none());
    assert!(cache.try_get(&radius_key(20.0, 1.0)).is_some());
    assert!(cache.try_get(&radius_key(40.0, 1.0)).is_some());
}

// ============================================================================
// Clear / statistics
// ============================================================================

#[test]
fn test_clear_keeps_counters() {
    let cache = QueryCache::default();
    let key = radius_key(0.0, 10.0);
    cache.put(key, &entities(&[1]));
    cache.try_get(&key);

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.try_get(&key).is_none());
    assert_eq!(cache.hit_count(), 1);
    assert_eq!(cache.miss_count(), 1);
}

#[test]
fn test_reset_statistics() {
    let cache = QueryCache::default();
    cache.try_get(&radius_key(0.0, 1.0));
    cache.reset_statistics();
    assert_eq!(cache.hit_count(), 0);
    assert_eq!(cache.miss_count(), 0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_readers_and_writer() {
    let cache = QueryCache::new(CacheConfig::new(Duration::from_secs(60), 64).unwrap());
    let stable = radius_key(-1.0, 1.0);
    cache.put(stable, &entities(&[42]));

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..500 {
                    // The stable entry is never evicted: the writer stays under budget
                    assert_eq!(cache.try_get(&stable), Some(entities(&[42])));
                }
            });
        }
        scope.spawn(|| {
            for i in 0..50 {
                cache.put(radius_key(i as f32, 2.0), &entities(&[i]));
            }
        });
    });

    assert_eq!(cache.hit_count(), 2000);
    assert_eq!(cache.len(), 51);
}
