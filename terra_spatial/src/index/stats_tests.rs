use super::*;

// ============================================================================
// Recording
// ============================================================================

#[test]
fn test_record_counts() {
    let mut stats = SpatialStats::default();
    stats.record(2.0, 5, false);
    stats.record(0.0, 3, true);

    assert_eq!(stats.total_queries, 2);
    assert_eq!(stats.total_entities_returned, 8);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.last_query_time_ms, 0.0);
    assert_eq!(stats.average_entities_per_query(), 4.0);
}

// ============================================================================
// Derived values
// ============================================================================

#[test]
fn test_moving_average() {
    let mut stats = SpatialStats::default();
    stats.record(10.0, 0, false);
    assert!((stats.average_query_time_ms - 1.0).abs() < 1e-6);

    stats.record(10.0, 0, false);
    assert!((stats.average_query_time_ms - 1.9).abs() < 1e-5);
}

#[test]
fn test_average_entities_before_queries() {
    assert_eq!(SpatialStats::default().average_entities_per_query(), 0.0);
}
