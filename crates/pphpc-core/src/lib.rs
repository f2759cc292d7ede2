//! Core types for the PPHPC predator-prey simulation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the space, engine, and CLI crates: worker
//! and domain identifiers, control events, agents, per-iteration
//! statistics, model parameters, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod error;
pub mod event;
pub mod id;
pub mod params;
pub mod stats;

pub use agent::{Agent, AgentKind};
pub use error::{ParamsError, SimError, SyncError};
pub use event::ControlEvent;
pub use id::{WorkDomain, WorkerId};
pub use params::ModelParams;
pub use stats::IterationStats;
