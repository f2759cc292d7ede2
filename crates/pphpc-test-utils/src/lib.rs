//! Test utilities for PPHPC development.
//!
//! Small parameter sets that finish in milliseconds, run helpers that
//! return per-iteration counts, and observer fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use pphpc_core::{ModelParams, SimError};
use pphpc_engine::{
    ConfigError, Determinism, GlobalStats, RunReport, SimConfig, Simulation, WorkStrategy,
};

pub use fixtures::{CountingObserver, EventLog, PanicAfter};

/// The end-to-end reference scenario: 10x10 grid, 50 sheep, 10 wolves,
/// 100 iterations.
pub fn small_params() -> ModelParams {
    ModelParams {
        init_sheep: 50,
        init_wolves: 10,
        grid_x: 10,
        grid_y: 10,
        iters: 100,
        ..ModelParams::default()
    }
}

/// A tiny grid for quick pipeline checks.
pub fn tiny_params(iters: u32) -> ModelParams {
    ModelParams {
        init_sheep: 12,
        init_wolves: 4,
        grid_x: 6,
        grid_y: 6,
        iters,
        ..ModelParams::default()
    }
}

/// A repeatable config with an explicit worker count and seed.
pub fn config(
    params: ModelParams,
    strategy: WorkStrategy,
    workers: usize,
    seed: u128,
) -> SimConfig {
    SimConfig {
        params,
        workers: Some(workers),
        strategy,
        seed,
        determinism: Determinism::Repeatable,
        ..SimConfig::default()
    }
}

/// `(sheep, wolves, grass)` for every iteration.
pub fn count_rows(stats: &GlobalStats) -> Vec<(u64, u64, u64)> {
    stats
        .snapshot()
        .iter()
        .map(|s| (s.sheep, s.wolves, s.grass))
        .collect()
}

/// Everything a test usually inspects after a run.
#[derive(Debug)]
pub struct RunOutcome {
    pub result: Result<RunReport, SimError>,
    pub counts: Vec<(u64, u64, u64)>,
}

/// Build, start, and wait for a simulation.
pub fn run(config: SimConfig) -> Result<RunOutcome, ConfigError> {
    let mut sim = Simulation::new(config)?;
    sim.start()?;
    let result = sim.wait();
    Ok(RunOutcome {
        result,
        counts: count_rows(sim.stats()),
    })
}

/// Run to completion and return the per-iteration counts.
///
/// # Panics
///
/// If the configuration is rejected or the run fails.
pub fn run_counts(config: SimConfig) -> Vec<(u64, u64, u64)> {
    let outcome = run(config).expect("config rejected");
    if let Err(e) = &outcome.result {
        panic!("run failed: {e}");
    }
    outcome.counts
}
