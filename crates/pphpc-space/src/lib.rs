//! Spatial topology for PPHPC simulations.
//!
//! This crate defines the [`Space`] trait, which maps a linear cell index
//! to its neighbourhood and exposes the row structure used for
//! row-aligned work partitioning, along with the [`Torus2D`] backend.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod space;
pub mod torus;

#[cfg(test)]
pub(crate) mod compliance;

pub use error::SpaceError;
pub use space::{Neighbourhood, Space, NEIGHBOURHOOD_SIZE};
pub use torus::Torus2D;
