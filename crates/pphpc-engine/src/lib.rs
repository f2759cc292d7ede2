//! Parallel execution engine for the PPHPC predator-prey model.
//!
//! A [`Simulation`] runs a fixed pool of worker threads over a toroidal
//! grid of [`Cell`]s. Every worker follows the same phase pipeline; the
//! [`Controller`] places a [`SyncPoint`] at each phase boundary and owns
//! one [`WorkProvider`] per work domain.
//!
//! # Work strategies
//!
//! - [`EqualWorkProvider`]: `ceil(N/W)` contiguous ranges
//! - [`RowSyncWorkProvider`]: row-aligned ranges with row barriers
//!   (`eq_rowsync` and `interval`)
//! - [`OnDemandWorkProvider`]: blocks claimed from a shared counter
//! - [`SingleThreadWorkProvider`]: one worker, the whole domain
//!
//! # Reproducibility
//!
//! Under [`Determinism::Repeatable`] agent lists are kept sorted and
//! random streams are keyed per (phase, iteration, token), so the
//! statistics of a run depend only on the parameters and the seed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod config;
pub mod controller;
pub mod equal;
pub(crate) mod hash;
pub mod model;
pub mod on_demand;
pub mod provider;
pub mod rng;
pub mod row_sync;
pub mod seed;
pub mod simulation;
pub mod stats;
pub mod sync;
pub mod worker;

pub use cell::{AgentList, Cell};
pub use config::{ConfigError, Determinism, SimConfig, WorkStrategy};
pub use controller::{sync_layout, Controller};
pub use equal::{EqualWorkProvider, SingleThreadWorkProvider};
pub use model::Model;
pub use on_demand::OnDemandWorkProvider;
pub use provider::{WorkProvider, WorkToken};
pub use rng::{RandomStream, RngFactory, RngKind, StreamPhase};
pub use row_sync::RowSyncWorkProvider;
pub use seed::SeedGenerator;
pub use simulation::{RunReport, SimEvent, Simulation};
pub use stats::{write_stats, GlobalStats};
pub use sync::{Barrier, Observer, SyncMode, SyncPoint};
pub use worker::{run_worker, Worker};
