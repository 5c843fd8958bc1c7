//! Latency bookkeeping and pass/fail evaluation for stress runs.

use terra_spatial::terra::{SpatialStats, TreeStatistics};
use terra_spatial::{spatial_info, spatial_warn};

use crate::scenario::{Scenario, Thresholds};

const LOG_SOURCE: &str = "terra::Stress";

/// Raw samples gathered during a run.
#[derive(Debug, Default)]
pub struct Metrics {
    query_times_ms: Vec<f32>,
    frame_times_ms: Vec<f32>,
    entities_returned: usize,
}

impl Metrics {
    pub fn record_query(&mut self, time_ms: f32, found: usize) {
        self.query_times_ms.push(time_ms);
        self.entities_returned += found;
    }

    pub fn record_frame(&mut self, time_ms: f32) {
        self.frame_times_ms.push(time_ms);
    }

    pub fn query_count(&self) -> usize {
        self.query_times_ms.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_times_ms.len()
    }
}

/// Summary of one finished scenario.
#[derive(Debug, Clone)]
pub struct Report {
    pub scenario: Scenario,
    pub frames: usize,
    pub total_queries: usize,
    pub min_query_ms: f32,
    pub avg_query_ms: f32,
    pub max_query_ms: f32,
    pub p50_query_ms: f32,
    pub p95_query_ms: f32,
    pub p99_query_ms: f32,
    pub avg_frame_ms: f32,
    pub max_frame_ms: f32,
    pub avg_entities_per_query: f32,
    pub cache_hit_rate: f32,
    pub tree: TreeStatistics,
    pub thresholds: Thresholds,
}

impl Report {
    pub fn new(scenario: Scenario, metrics: &Metrics, index_stats: &SpatialStats, tree: TreeStatistics) -> Self {
        let mut sorted = metrics.query_times_ms.clone();
        sorted.sort_by(f32::total_cmp);

        let total_queries = sorted.len();
        let avg_entities_per_query = if total_queries == 0 {
            0.0
        } else {
            metrics.entities_returned as f32 / total_queries as f32
        };

        Self {
            scenario,
            frames: metrics.frame_count(),
            total_queries,
            min_query_ms: sorted.first().copied().unwrap_or(0.0),
            avg_query_ms: mean(&sorted),
            max_query_ms: sorted.last().copied().unwrap_or(0.0),
            p50_query_ms: percentile(&sorted, 0.50),
            p95_query_ms: percentile(&sorted, 0.95),
            p99_query_ms: percentile(&sorted, 0.99),
            avg_frame_ms: mean(&metrics.frame_times_ms),
            max_frame_ms: metrics.frame_times_ms.iter().copied().fold(0.0, f32::max),
            avg_entities_per_query,
            cache_hit_rate: index_stats.cache_hit_rate,
            tree,
            thresholds: scenario.thresholds(),
        }
    }

    pub fn query_time_ok(&self) -> bool {
        self.avg_query_ms <= self.thresholds.avg_query_ms
    }

    pub fn frame_time_ok(&self) -> bool {
        self.avg_frame_ms <= self.thresholds.frame_ms
    }

    pub fn passed(&self) -> bool {
        self.query_time_ok() && self.frame_time_ok()
    }

    /// Write the report through the index logger.
    pub fn log(&self) {
        let name = self.scenario.name();

        spatial_info!(LOG_SOURCE, "{}: {} frames, {} queries ({:.1} entities/query)",
            name, self.frames, self.total_queries, self.avg_entities_per_query);
        spatial_info!(LOG_SOURCE, "{}: query ms min {:.4} avg {:.4} max {:.4} | p50 {:.4} p95 {:.4} p99 {:.4}",
            name, self.min_query_ms, self.avg_query_ms, self.max_query_ms,
            self.p50_query_ms, self.p95_query_ms, self.p99_query_ms);
        spatial_info!(LOG_SOURCE, "{}: frame ms avg {:.3} max {:.3} | cache hit rate {:.1}%",
            name, self.avg_frame_ms, self.max_frame_ms, self.cache_hit_rate * 100.0);
        spatial_info!(LOG_SOURCE, "{}: tree {} nodes, depth {}, {} entities",
            name, self.tree.node_count, self.tree.max_depth, self.tree.total_entities);

        if !self.query_time_ok() {
            spatial_warn!(LOG_SOURCE, "{}: average query {:.4} ms exceeds {:.4} ms",
                name, self.avg_query_ms, self.thresholds.avg_query_ms);
        }
        if !self.frame_time_ok() {
            spatial_warn!(LOG_SOURCE, "{}: average frame {:.3} ms exceeds {:.2} ms",
                name, self.avg_frame_ms, self.thresholds.frame_ms);
        }
    }
}

fn mean(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}

/// Nearest-rank percentile of an ascending slice.
fn percentile(sorted: &[f32], fraction: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (fraction * sorted.len() as f32).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
