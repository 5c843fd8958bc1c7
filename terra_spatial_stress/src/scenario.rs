//! Stress scenarios and their pass thresholds.

use clap::ValueEnum;

/// Load profile of one stress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// 50 static creatures, baseline latency
    Baseline50,
    /// 200 moving creatures, the target load
    Standard200,
    /// 500 moving creatures
    Heavy500,
    /// 1000 moving creatures, breaking-point test
    Extreme1000,
    /// 200 static creatures queried from several reader threads
    ConcurrentQueries,
    /// Creatures spawned and despawned while moving
    MixedLoad,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Baseline50,
        Scenario::Standard200,
        Scenario::Heavy500,
        Scenario::Extreme1000,
        Scenario::ConcurrentQueries,
        Scenario::MixedLoad,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Baseline50 => "Baseline50",
            Scenario::Standard200 => "Standard200",
            Scenario::Heavy500 => "Heavy500",
            Scenario::Extreme1000 => "Extreme1000",
            Scenario::ConcurrentQueries => "ConcurrentQueries",
            Scenario::MixedLoad => "MixedLoad",
        }
    }

    pub fn config(self) -> ScenarioConfig {
        let base = ScenarioConfig {
            entity_count: 200,
            query_radius: 10.0,
            movement: true,
            reader_threads: 0,
            churn: false,
        };

        match self {
            Scenario::Baseline50 => ScenarioConfig { entity_count: 50, movement: false, ..base },
            Scenario::Standard200 => base,
            Scenario::Heavy500 => ScenarioConfig { entity_count: 500, query_radius: 15.0, ..base },
            Scenario::Extreme1000 => ScenarioConfig { entity_count: 1000, query_radius: 20.0, ..base },
            Scenario::ConcurrentQueries => ScenarioConfig { movement: false, reader_threads: 4, ..base },
            Scenario::MixedLoad => ScenarioConfig { churn: true, ..base },
        }
    }

    pub fn thresholds(self) -> Thresholds {
        match self {
            Scenario::Baseline50 => Thresholds { avg_query_ms: 0.05, frame_ms: 10.0 },
            Scenario::Standard200 => Thresholds { avg_query_ms: 0.1, frame_ms: 16.67 },
            Scenario::Heavy500 => Thresholds { avg_query_ms: 0.2, frame_ms: 20.0 },
            Scenario::Extreme1000 => Thresholds { avg_query_ms: 0.5, frame_ms: 30.0 },
            Scenario::ConcurrentQueries | Scenario::MixedLoad => Thresholds::default(),
        }
    }
}

/// Workload parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioConfig {
    /// Creatures spawned before the first frame
    pub entity_count: usize,
    /// Detection radius used by the radius queries
    pub query_radius: f32,
    /// Creatures wander every frame
    pub movement: bool,
    /// Reader threads issuing queries in parallel (0 = main thread only)
    pub reader_threads: usize,
    /// Creatures are despawned and respawned during the run
    pub churn: bool,
}

/// Limits a scenario must stay under to pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Mean latency of a single query
    pub avg_query_ms: f32,
    /// Mean spatial work per frame
    pub frame_ms: f32,
}

impl Default for Thresholds {
    /// One 60 FPS frame, 0.1 ms per query
    fn default() -> Self {
        Self { avg_query_ms: 0.1, frame_ms: 16.67 }
    }
}
