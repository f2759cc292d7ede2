//! Command-line arguments.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use pphpc_core::ModelParams;
use pphpc_engine::{Determinism, RngKind, SimConfig, WorkStrategy};

#[derive(Parser, Debug)]
#[command(name = "pphpc")]
#[command(version)]
#[command(about = "Parallel predator-prey simulation on a toroidal grid")]
pub struct Cli {
    /// File containing simulation parameters
    #[arg(short, long, default_value = "config.txt", global = true)]
    pub params: PathBuf,

    /// Statistics output file
    #[arg(short, long, default_value = "stats.txt", global = true)]
    pub stats: PathBuf,

    /// Seed for the random streams (defaults to wall-clock nanoseconds)
    #[arg(short = 'r', long, global = true)]
    pub seed: Option<u128>,

    /// Random stream algorithm (chacha8, chacha12 or chacha20)
    #[arg(short = 'g', long, default_value = "chacha8", value_parser = parse_rng, global = true)]
    pub rng: RngKind,

    /// Interval of iterations at which to print the current iteration
    #[arg(short = 'i', long, default_value_t = 0, global = true)]
    pub print_interval: u32,

    /// Debug mode: verbose logging and full error detail
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Number of worker threads (defaults to the available parallelism)
    #[arg(short = 'n', long, global = true)]
    pub threads: Option<usize>,

    /// Process agents in arrival order; results then depend on scheduling
    #[arg(long, global = true)]
    pub relaxed: bool,

    #[command(subcommand)]
    pub strategy: Strategy,
}

/// Work partitioning strategy.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Contiguous equal ranges per worker
    Equal,
    /// Row-aligned equal ranges with a barrier after every row
    #[command(name = "eq_rowsync")]
    EqRowSync,
    /// Blocks claimed from a shared counter
    #[command(name = "on_demand")]
    OnDemand {
        /// Indices claimed per request
        #[arg(short, long, default_value_t = WorkStrategy::DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
        block_size: usize,
    },
    /// Row-aligned ranges sized by the sync interval
    Interval,
    /// A single worker
    St,
}

impl From<Strategy> for WorkStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Equal => WorkStrategy::Equal,
            Strategy::EqRowSync => WorkStrategy::EqualRowSync,
            Strategy::OnDemand { block_size } => WorkStrategy::OnDemand { block_size },
            Strategy::Interval => WorkStrategy::Interval,
            Strategy::St => WorkStrategy::SingleThread,
        }
    }
}

impl Cli {
    /// The seed to use: the explicit one, or the current wall-clock time
    /// in nanoseconds.
    pub fn resolved_seed(&self) -> u128 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos())
        })
    }

    /// Build the engine configuration for `params`.
    pub fn sim_config(&self, params: ModelParams, seed: u128) -> SimConfig {
        SimConfig {
            params,
            workers: self.threads,
            strategy: self.strategy.into(),
            rng: self.rng,
            seed,
            determinism: if self.relaxed {
                Determinism::Relaxed
            } else {
                Determinism::Repeatable
            },
        }
    }
}

fn parse_rng(s: &str) -> Result<RngKind, String> {
    RngKind::ALL
        .into_iter()
        .find(|k| k.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| {
            let names: Vec<_> = RngKind::ALL.iter().map(|k| k.name()).collect();
            format!("unknown generator '{s}', expected one of: {}", names.join(", "))
        })
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("block size must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
