//! Strongly-typed identifiers.

use std::fmt;

/// Identifies one simulation worker thread.
///
/// Workers are numbered `0..W` at simulation start. The id selects the
/// worker's partition in every work domain and, in relaxed mode, its
/// private random stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// The id as a `usize`, for partition arithmetic.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A work domain dispensed by a work provider.
///
/// Each domain gets its own provider, built once before workers start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkDomain {
    /// Every cell of the grid, `0..GRID_X*GRID_Y`.
    Cells,
    /// Initial sheep creation slots, `0..INIT_SHEEP`.
    Sheep,
    /// Initial wolf creation slots, `0..INIT_WOLVES`.
    Wolves,
}

impl fmt::Display for WorkDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cells => write!(f, "cells"),
            Self::Sheep => write!(f, "sheep"),
            Self::Wolves => write!(f, "wolves"),
        }
    }
}
