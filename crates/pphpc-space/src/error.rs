//! Error types for space construction.

use std::fmt;

/// Errors arising from space construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Attempted to construct a space with zero cells.
    EmptySpace,
    /// A dimension exceeds the largest supported extent.
    DimensionTooLarge {
        /// Which dimension.
        name: &'static str,
        /// The requested extent.
        value: u32,
        /// The largest accepted extent.
        max: u32,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
