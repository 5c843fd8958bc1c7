use super::*;

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_default_values() {
    let config = WorldConfig::default();
    assert_eq!(config.min_bounds, Vec3::new(-10.0, -5.0, -10.0));
    assert_eq!(config.max_bounds, Vec3::new(10.0, 10.0, 10.0));
    assert_eq!(config.max_depth, 8);
    assert_eq!(config.min_node_size, 1.0);
    assert_eq!(config.node_capacity, 16);
    assert_eq!(config.name, "Default");
    assert!(config.validate().is_ok());
}

#[test]
fn test_new_valid() {
    let config = WorldConfig::new(Vec3::splat(-50.0), Vec3::splat(50.0), "Arena").unwrap();
    assert_eq!(config.name, "Arena");
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.node_capacity, DEFAULT_NODE_CAPACITY);
}

#[test]
fn test_presets_are_valid() {
    let creature = WorldConfig::creature_world();
    assert!(creature.validate().is_ok());
    assert_eq!(creature.min_bounds, Vec3::new(-100.0, -10.0, -100.0));
    assert_eq!(creature.max_bounds, Vec3::new(100.0, 50.0, 100.0));

    let test = WorldConfig::test_world();
    assert!(test.validate().is_ok());
    assert_eq!(test.min_bounds, Vec3::new(-30.0, -5.0, -30.0));
    assert_eq!(test.max_bounds, Vec3::new(30.0, 35.0, 30.0));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_inverted_bounds_rejected() {
    let result = WorldConfig::new(Vec3::splat(10.0), Vec3::splat(-10.0), "Bad");
    assert!(matches!(result, Err(Error::InvalidBounds(_))));
}

#[test]
fn test_flat_axis_rejected() {
    let result = WorldConfig::new(
        Vec3::new(-10.0, 0.0, -10.0),
        Vec3::new(10.0, 0.0, 10.0),
        "Flat",
    );
    assert!(matches!(result, Err(Error::InvalidBounds(_))));
}

#[test]
fn test_single_inverted_axis_rejected() {
    let result = WorldConfig::new(
        Vec3::new(-10.0, -10.0, 5.0),
        Vec3::new(10.0, 10.0, -5.0),
        "Z inverted",
    );
    assert!(matches!(result, Err(Error::InvalidBounds(_))));
}

#[test]
fn test_non_finite_bounds_rejected() {
    let result = WorldConfig::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::splat(10.0), "NaN");
    assert!(matches!(result, Err(Error::InvalidBounds(_))));

    let result = WorldConfig::new(Vec3::splat(-10.0), Vec3::splat(f32::INFINITY), "Inf");
    assert!(matches!(result, Err(Error::InvalidBounds(_))));
}

#[test]
fn test_depth_range() {
    let base = WorldConfig::default();
    assert!(matches!(base.clone().with_max_depth(0), Err(Error::InvalidDepth(0))));
    assert!(matches!(base.clone().with_max_depth(21), Err(Error::InvalidDepth(21))));
    assert_eq!(base.clone().with_max_depth(1).unwrap().max_depth, 1);
    assert_eq!(base.with_max_depth(20).unwrap().max_depth, 20);
}

#[test]
fn test_min_node_size() {
    let base = WorldConfig::default();
    assert!(matches!(base.clone().with_min_node_size(0.0), Err(Error::InvalidNodeSize(_))));
    assert!(matches!(base.clone().with_min_node_size(-1.0), Err(Error::InvalidNodeSize(_))));
    assert!(matches!(base.clone().with_min_node_size(f32::NAN), Err(Error::InvalidNodeSize(_))));
    assert_eq!(base.with_min_node_size(0.25).unwrap().min_node_size, 0.25);
}

#[test]
fn test_node_capacity() {
    let base = WorldConfig::default();
    assert!(matches!(base.clone().with_node_capacity(0), Err(Error::InvalidCapacity(0))));
    assert_eq!(base.with_node_capacity(1).unwrap().node_capacity, 1);
}

#[test]
fn test_builder_chain() {
    let config = WorldConfig::new(Vec3::splat(-64.0), Vec3::splat(64.0), "Chained")
        .and_then(|c| c.with_max_depth(4))
        .and_then(|c| c.with_min_node_size(2.0))
        .and_then(|c| c.with_node_capacity(8))
        .unwrap();

    assert_eq!(config.max_depth, 4);
    assert_eq!(config.min_node_size, 2.0);
    assert_eq!(config.node_capacity, 8);
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn test_size_center_volume() {
    let config = WorldConfig::new(
        Vec3::new(-10.0, 0.0, -20.0),
        Vec3::new(10.0, 10.0, 20.0),
        "Box",
    )
    .unwrap();

    assert_eq!(config.size(), Vec3::new(20.0, 10.0, 40.0));
    assert_eq!(config.center(), Vec3::new(0.0, 5.0, 0.0));
    assert_eq!(config.volume(), 8000.0);
}

#[test]
fn test_bounding_box() {
    let config = WorldConfig::test_world();
    let bounds = config.bounding_box();
    assert_eq!(bounds.min, config.min_bounds);
    assert_eq!(bounds.max, config.max_bounds);
}
