//! Stress runner for the terra spatial index.
//!
//! Simulates creature AI and camera culling against `SpatialIndex` and
//! checks query and frame latency against per-scenario limits.
//!
//! ```text
//! terra_spatial_stress                        # every scenario
//! terra_spatial_stress --scenario heavy500 --frames 600 --seed 7
//! ```

mod harness;
mod report;
mod scenario;

use std::process::ExitCode;

use clap::Parser;
use terra_spatial::terra::log::{self, DefaultLogger, LogSeverity, SeverityFilter};
use terra_spatial::{spatial_error, spatial_info};

use crate::harness::StressTest;
use crate::report::Report;
use crate::scenario::Scenario;

const LOG_SOURCE: &str = "terra::Stress";
/// Simulated frame step (60 FPS)
const FRAME_DELTA: f32 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "terra_spatial_stress")]
#[command(about = "Stress scenarios for the terra spatial index", long_about = None)]
struct Args {
    /// Scenario to run (all scenarios when omitted)
    #[arg(short, long, value_enum)]
    scenario: Option<Scenario>,

    /// Frames simulated per scenario
    #[arg(short, long, default_value_t = 300)]
    frames: u32,

    /// RNG seed for spawn positions and movement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Also print TRACE/DEBUG output from the index
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let min_severity = if args.verbose { LogSeverity::Trace } else { LogSeverity::Info };
    log::set_logger(SeverityFilter::new(min_severity, DefaultLogger));

    let scenarios: Vec<Scenario> = match args.scenario {
        Some(scenario) => vec![scenario],
        None => Scenario::ALL.to_vec(),
    };

    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        match run_scenario(scenario, args.frames, args.seed) {
            Ok(report) => {
                report.log();
                reports.push(report);
            }
            Err(e) => {
                spatial_error!(LOG_SOURCE, "{} could not start: {}", scenario.name(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    print_summary(&reports);

    if reports.iter().all(Report::passed) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_scenario(scenario: Scenario, frames: u32, seed: u64) -> terra_spatial::terra::Result<Report> {
    let config = scenario.config();
    spatial_info!(LOG_SOURCE, "Running {}: {} creatures, radius {}, {} frames",
        scenario.name(), config.entity_count, config.query_radius, frames);

    let mut test = StressTest::new(config, seed)?;
    test.spawn_creatures();

    for _ in 0..frames {
        test.run_frame(FRAME_DELTA);
    }

    let index = test.index();
    Ok(Report::new(scenario, test.metrics(), &index.statistics(), index.tree_statistics()))
}

fn print_summary(reports: &[Report]) {
    println!();
    println!("{:<18} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "scenario", "avg q ms", "p99 q ms", "frame ms", "queries", "result");
    for report in reports {
        println!("{:<18} {:>10.4} {:>10.4} {:>10.3} {:>10} {:>8}",
            report.scenario.name(),
            report.avg_query_ms,
            report.p99_query_ms,
            report.avg_frame_ms,
            report.total_queries,
            if report.passed() { "PASS" } else { "FAIL" });
    }
}
