/// Smoothing factor of the query-time moving average
const AVERAGE_ALPHA: f32 = 0.1;

/// Snapshot of query performance counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpatialStats {
    /// Queries answered (cache hits included)
    pub total_queries: u64,
    /// Sum of result lengths over all queries
    pub total_entities_returned: u64,
    /// Queries answered from the cache
    pub cache_hits: u64,
    /// Duration of the most recent query (0 for a cache hit)
    pub last_query_time_ms: f32,
    /// Exponential moving average of query duration
    pub average_query_time_ms: f32,
    /// Hit rate reported by the query cache
    pub cache_hit_rate: f32,
    /// Entries currently held by the query cache
    pub cache_size: usize,
}

impl SpatialStats {
    /// Account for one answered query.
    pub(crate) fn record(&mut self, query_time_ms: f32, entities_returned: usize, cache_hit: bool) {
        self.total_queries += 1;
        self.total_entities_returned += entities_returned as u64;
        if cache_hit {
            self.cache_hits += 1;
        }
        self.last_query_time_ms = query_time_ms;
        self.average_query_time_ms =
            self.average_query_time_ms * (1.0 - AVERAGE_ALPHA) + query_time_ms * AVERAGE_ALPHA;
    }

    /// Mean result length, 0 before the first query.
    pub fn average_entities_per_query(&self) -> f32 {
        if self.total_queries == 0 {
            return 0.0;
        }
        self.total_entities_returned as f32 / self.total_queries as f32
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
