//! Integration tests for spatial index logging
//!
//! Installs a capturing logger and checks the warnings and errors the index
//! emits for misuse and invalid configuration.
//!
//! Run with: cargo test --test logging_integration_tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serial_test::serial;
use terra_spatial::glam::Vec3;
use terra_spatial::terra::log::{self, LogEntry, LogSeverity, Logger};
use terra_spatial::terra::{CacheConfig, CategoryMask, EntityRef, Error, SpatialIndex, WorldConfig};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures entries from terra sources only
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        log::set_logger(Self { entries: entries.clone() });
        entries
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source.starts_with("terra::") {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn has_entry(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity, source: &str, fragment: &str) -> bool {
    entries
        .lock()
        .unwrap()
        .iter()
        .any(|e| e.severity == severity && e.source == source && e.message.contains(fragment))
}

fn index() -> SpatialIndex {
    SpatialIndex::new(WorldConfig::test_world()).unwrap()
}

// ============================================================================
// MISUSE WARNINGS
// ============================================================================

#[test]
#[serial]
fn test_integration_construction_logged() {
    let entries = TestLogger::install();

    let _index = index();

    assert!(has_entry(&entries, LogSeverity::Info, "terra::SpatialIndex", "Test World"));
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_re_add_warns() {
    let entries = TestLogger::install();

    let mut index = index();
    index.add_entity(EntityRef(7), Vec3::ZERO, CategoryMask::CREATURES);
    index.add_entity(EntityRef(7), Vec3::ONE, CategoryMask::CREATURES);

    assert!(has_entry(&entries, LogSeverity::Warn, "terra::SpatialIndex", "Entity(7) already tracked"));
    assert_eq!(index.entity_count(), 1);
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_untracked_operations_warn() {
    let entries = TestLogger::install();

    let mut index = index();
    index.remove_entity(EntityRef(1));
    index.update_entity_category(EntityRef(2), CategoryMask::PLAYER);
    index.update_entity(EntityRef(3), Vec3::ZERO);

    assert!(has_entry(&entries, LogSeverity::Warn, "terra::SpatialIndex", "remove untracked Entity(1)"));
    assert!(has_entry(&entries, LogSeverity::Warn, "terra::SpatialIndex", "category of untracked Entity(2)"));
    assert!(has_entry(&entries, LogSeverity::Warn, "terra::SpatialIndex", "update untracked Entity(3)"));

    // The update fallback added the entity; the category update did not
    assert!(index.contains(EntityRef(3)));
    assert!(!index.contains(EntityRef(2)));
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_out_of_bounds_is_silent() {
    let entries = TestLogger::install();

    let mut index = index();
    index.add_entity(EntityRef(1), Vec3::splat(1000.0), CategoryMask::ITEMS);

    let warnings = entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.severity >= LogSeverity::Warn && e.message.contains("Entity(1)"))
        .count();
    assert_eq!(warnings, 0);
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_rebuild_logged() {
    let entries = TestLogger::install();

    let mut index = index();
    for i in 0..40 {
        index.add_entity(EntityRef(i), Vec3::new(i as f32 - 20.0, 0.0, 0.0), CategoryMask::CREATURES);
    }
    index.rebuild();

    assert!(has_entry(&entries, LogSeverity::Info, "terra::SpatialIndex", "Rebuilt spatial index 'Test World'"));
    log::reset_logger();
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[test]
#[serial]
fn test_integration_invalid_world_logged_as_error() {
    let entries = TestLogger::install();

    let result = WorldConfig::new(Vec3::splat(5.0), Vec3::splat(-5.0), "Broken");
    assert!(matches!(result, Err(Error::InvalidBounds(_))));

    let captured = entries.lock().unwrap();
    let error = captured
        .iter()
        .find(|e| e.severity == LogSeverity::Error && e.source == "terra::WorldConfig")
        .expect("configuration error should be logged");
    assert!(error.message.contains("Broken"));
    assert!(error.file.is_some());
    assert!(error.line.is_some());
    drop(captured);
    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_invalid_cache_config_logged() {
    let entries = TestLogger::install();

    assert!(CacheConfig::new(Duration::ZERO, 10).is_err());
    assert!(has_entry(&entries, LogSeverity::Error, "terra::QueryCache", "ttl"));
    log::reset_logger();
}
