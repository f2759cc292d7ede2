//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input for building a [`Simulation`](crate::Simulation).
//! [`validate()`](SimConfig::validate) checks everything that can be
//! checked without building work providers; provider construction (for
//! example the row-sync worker limit) is checked when the controller is
//! built, still before any worker thread starts.

use std::error::Error;
use std::fmt;

use pphpc_core::{ModelParams, ParamsError};
use pphpc_space::SpaceError;

use crate::rng::RngKind;

// ── WorkStrategy ───────────────────────────────────────────────────

/// How work domains are partitioned among workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkStrategy {
    /// Contiguous `ceil(N/W)`-sized ranges.
    #[default]
    Equal,
    /// Row-aligned ranges with a row barrier after every row.
    EqualRowSync,
    /// Blocks of `block_size` indices claimed from a shared counter.
    OnDemand {
        /// Indices claimed per request. Default: 100.
        block_size: usize,
    },
    /// Row-aligned ranges sized by the sync interval, with row barriers.
    Interval,
    /// One worker processing everything.
    SingleThread,
}

impl WorkStrategy {
    /// Default on-demand block size.
    pub const DEFAULT_BLOCK_SIZE: usize = 100;

    /// Name of the CLI subcommand selecting this strategy.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::EqualRowSync => "eq_rowsync",
            Self::OnDemand { .. } => "on_demand",
            Self::Interval => "interval",
            Self::SingleThread => "st",
        }
    }
}

// ── Determinism ────────────────────────────────────────────────────

/// Reproducibility policy for agent ordering and random streams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Determinism {
    /// Cell agent lists are kept sorted by [`Agent::sort_key`](pphpc_core::Agent::sort_key)
    /// and random streams are derived per (phase, iteration, token).
    /// Results do not depend on worker count, strategy, or scheduling.
    #[default]
    Repeatable,
    /// Agents are kept in arrival order and each worker draws from one
    /// private stream seeded by the seed generator. Reproducible only
    /// for a fixed worker count and strategy, and only when scheduling
    /// does not reorder cross-partition moves.
    Relaxed,
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for one simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Model and grid parameters.
    pub params: ModelParams,
    /// Number of worker threads. `None` = `available_parallelism`.
    /// Ignored by [`WorkStrategy::SingleThread`].
    pub workers: Option<usize>,
    /// Work partitioning strategy. Default: [`WorkStrategy::Equal`].
    pub strategy: WorkStrategy,
    /// Random stream algorithm. Default: [`RngKind::ChaCha8`].
    pub rng: RngKind,
    /// Base seed for the seed generator.
    pub seed: u128,
    /// Reproducibility policy. Default: [`Determinism::Repeatable`].
    pub determinism: Determinism,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            params: ModelParams::default(),
            workers: None,
            strategy: WorkStrategy::default(),
            rng: RngKind::default(),
            seed: 0,
            determinism: Determinism::default(),
        }
    }
}

impl SimConfig {
    /// Upper clamp for explicit worker counts.
    pub const MAX_WORKERS: usize = 1024;

    /// Resolve the actual worker count.
    ///
    /// Single-thread runs always use one worker. Explicit values are
    /// clamped to `[1, MAX_WORKERS]`; `None` uses the available
    /// parallelism.
    pub fn resolved_worker_count(&self) -> usize {
        if self.strategy == WorkStrategy::SingleThread {
            return 1;
        }
        match self.workers {
            Some(n) => n.clamp(1, Self::MAX_WORKERS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(Self::MAX_WORKERS),
        }
    }

    /// Validate everything that does not need a built provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Model parameters.
        self.params.validate()?;
        // 2. An explicit zero is a caller bug, not a request for auto-detect.
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        // 3. On-demand blocks must make progress.
        if let WorkStrategy::OnDemand { block_size } = self.strategy {
            if block_size == 0 {
                return Err(ConfigError::InvalidBlockSize);
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before any worker starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Model parameters are invalid.
    Params(ParamsError),
    /// The grid could not be built.
    Space(SpaceError),
    /// `workers` was explicitly set to zero.
    ZeroWorkers,
    /// The grid cannot be partitioned among this many workers without
    /// violating the row-separation constraint.
    TooManyWorkers {
        /// The strategy that rejected the count.
        strategy: &'static str,
        /// The requested worker count.
        requested: usize,
        /// The largest count the grid supports.
        max: usize,
    },
    /// On-demand block size is zero.
    InvalidBlockSize,
    /// `start()` was called on a simulation that already started.
    AlreadyStarted,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Params(e) => write!(f, "params: {e}"),
            Self::Space(e) => write!(f, "space: {e}"),
            Self::ZeroWorkers => write!(f, "worker count must be at least 1"),
            Self::TooManyWorkers {
                strategy,
                requested,
                max,
            } => write!(
                f,
                "too many workers for {strategy}: requested {requested}, max is {max}"
            ),
            Self::InvalidBlockSize => write!(f, "on-demand block size must be at least 1"),
            Self::AlreadyStarted => write!(f, "simulation already started"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Params(e) => Some(e),
            Self::Space(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParamsError> for ConfigError {
    fn from(e: ParamsError) -> Self {
        Self::Params(e)
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}
