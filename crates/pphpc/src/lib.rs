//! PPHPC: a parallel predator-prey simulation engine.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the PPHPC sub-crates. For most users, adding `pphpc` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use pphpc::prelude::*;
//!
//! let config = SimConfig {
//!     params: ModelParams {
//!         init_sheep: 40,
//!         init_wolves: 8,
//!         grid_x: 12,
//!         grid_y: 12,
//!         iters: 20,
//!         ..ModelParams::default()
//!     },
//!     workers: Some(2),
//!     strategy: WorkStrategy::Equal,
//!     seed: 42,
//!     ..SimConfig::default()
//! };
//! let mut sim = Simulation::new(config).unwrap();
//! sim.start().unwrap();
//! let report = sim.wait().unwrap();
//! assert_eq!(report.iterations, 20);
//! assert_eq!(sim.stats().read(0).unwrap().sheep, 40);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `pphpc-core` | IDs, agents, parameters, events, errors |
//! | [`space`] | `pphpc-space` | The `Space` trait and the toroidal grid |
//! | [`engine`] | `pphpc-engine` | Work providers, sync points, workers, driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`pphpc-core`).
///
/// Contains [`types::ModelParams`], [`types::Agent`],
/// [`types::ControlEvent`], [`types::IterationStats`], and the error types.
pub use pphpc_core as types;

/// Grid topology (`pphpc-space`).
///
/// Provides the [`space::Space`] trait and the [`space::Torus2D`] backend.
pub use pphpc_space as space;

/// The parallel engine (`pphpc-engine`).
///
/// [`engine::Simulation`] drives a run; [`engine::Controller`] owns the
/// sync points and work providers the workers share.
pub use pphpc_engine as engine;

/// Common imports for typical PPHPC usage.
///
/// ```rust
/// use pphpc::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use pphpc_core::{Agent, AgentKind, ControlEvent, IterationStats, ModelParams, WorkerId};

    // Errors
    pub use pphpc_core::{ParamsError, SimError, SyncError};

    // Space
    pub use pphpc_space::{Space, Torus2D};

    // Engine
    pub use pphpc_engine::{
        ConfigError, Determinism, GlobalStats, RngKind, RunReport, SimConfig, SimEvent,
        Simulation, WorkStrategy,
    };
}
