//! Benchmark profiles for the PPHPC simulation engine.
//!
//! Provides pre-built [`SimConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 100x100 grid (10K cells), 400 sheep, 200 wolves
//! - [`stress_profile`]: 400x400 grid (160K cells), agent density scaled to match
//! - [`strategy_matrix`]: every strategy paired with the worker counts it accepts

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use pphpc_core::ModelParams;
use pphpc_engine::{Determinism, SimConfig, WorkStrategy};

/// Build a reference benchmark profile: the default 100x100 parameters,
/// truncated to `iters` iterations.
pub fn reference_profile(
    strategy: WorkStrategy,
    workers: usize,
    iters: u32,
    seed: u128,
) -> SimConfig {
    SimConfig {
        params: ModelParams {
            iters,
            ..ModelParams::default()
        },
        workers: Some(workers),
        strategy,
        seed,
        determinism: Determinism::Repeatable,
        ..SimConfig::default()
    }
}

/// Build a stress benchmark profile: 400x400 grid (160K cells).
///
/// Same rules and densities as [`reference_profile`] at 16x the cell count.
pub fn stress_profile(
    strategy: WorkStrategy,
    workers: usize,
    iters: u32,
    seed: u128,
) -> SimConfig {
    let base = ModelParams::default();
    SimConfig {
        params: ModelParams {
            init_sheep: base.init_sheep * 16,
            init_wolves: base.init_wolves * 16,
            grid_x: 400,
            grid_y: 400,
            iters,
            ..base
        },
        workers: Some(workers),
        strategy,
        seed,
        determinism: Determinism::Repeatable,
        ..SimConfig::default()
    }
}

/// Every strategy with each worker count in `counts` that it accepts on
/// the reference 100x100 grid.
///
/// Row-synchronized strategies need at least three rows per worker, so
/// they are capped at 33 workers; `SingleThread` appears once.
pub fn strategy_matrix(counts: &[usize]) -> Vec<(WorkStrategy, usize)> {
    let mut out = vec![(WorkStrategy::SingleThread, 1)];
    for &w in counts {
        out.push((WorkStrategy::Equal, w));
        out.push((
            WorkStrategy::OnDemand {
                block_size: WorkStrategy::DEFAULT_BLOCK_SIZE,
            },
            w,
        ));
        if w <= 33 {
            out.push((WorkStrategy::EqualRowSync, w));
            out.push((WorkStrategy::Interval, w));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_validates() {
        let config = reference_profile(WorkStrategy::Equal, 4, 10, 42);
        config.validate().unwrap();
        assert_eq!(config.params.cell_count(), 10_000);
    }

    #[test]
    fn stress_profile_validates() {
        let config = stress_profile(WorkStrategy::OnDemand { block_size: 256 }, 8, 10, 42);
        config.validate().unwrap();
        assert_eq!(config.params.cell_count(), 160_000);
        assert_eq!(config.params.init_sheep, 6400);
    }

    #[test]
    fn strategy_matrix_skips_oversubscribed_row_sync() {
        let matrix = strategy_matrix(&[2, 64]);
        assert!(matrix.contains(&(WorkStrategy::EqualRowSync, 2)));
        assert!(!matrix.contains(&(WorkStrategy::EqualRowSync, 64)));
        assert!(matrix.contains(&(WorkStrategy::Equal, 64)));
        assert_eq!(
            matrix
                .iter()
                .filter(|(s, _)| *s == WorkStrategy::SingleThread)
                .count(),
            1
        );
    }
}
