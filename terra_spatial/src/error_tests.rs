//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_invalid_bounds_display() {
    let err = Error::InvalidBounds("min.x >= max.x".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid world bounds"));
    assert!(display.contains("min.x >= max.x"));
}

#[test]
fn test_invalid_depth_display() {
    let err = Error::InvalidDepth(21);
    let display = format!("{}", err);
    assert!(display.contains("21"));
    assert!(display.contains("between 1 and 20"));
}

#[test]
fn test_invalid_node_size_display() {
    let err = Error::InvalidNodeSize(-1.0);
    let display = format!("{}", err);
    assert!(display.contains("min node size"));
    assert!(display.contains("-1"));
}

#[test]
fn test_invalid_capacity_display() {
    let err = Error::InvalidCapacity(0);
    assert_eq!(
        format!("{}", err),
        "Invalid node capacity: 0 (must be at least 1)"
    );
}

#[test]
fn test_invalid_cache_config_display() {
    let err = Error::InvalidCacheConfig("ttl must be non-zero".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid cache config"));
    assert!(display.contains("ttl must be non-zero"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::InvalidDepth(0);
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Error::InvalidBounds("x".to_string()));
    assert!(debug.contains("InvalidBounds"));

    let debug = format!("{:?}", Error::InvalidCapacity(0));
    assert!(debug.contains("InvalidCapacity"));
}

#[test]
fn test_error_clone() {
    let err1 = Error::InvalidNodeSize(0.0);
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
}

// ============================================================================
// RESULT / PROPAGATION TESTS
// ============================================================================

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<u32> {
        Err(Error::InvalidDepth(99))
    }

    fn outer() -> Result<u32> {
        let depth = inner()?;
        Ok(depth + 1)
    }

    match outer() {
        Err(Error::InvalidDepth(99)) => {}
        other => panic!("expected InvalidDepth(99), got {:?}", other),
    }
}

#[test]
fn test_spatial_err_macro_returns_error() {
    let err = crate::spatial_err!("terra::test", Error::InvalidCapacity(0));
    assert!(matches!(err, Error::InvalidCapacity(0)));
}
