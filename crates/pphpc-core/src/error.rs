//! Error types shared across the PPHPC workspace.
//!
//! Organized by subsystem: synchronization (barriers and sync points),
//! simulation (worker faults), and model parameters (loading and
//! validation).

use std::error::Error;
use std::fmt;

use crate::event::ControlEvent;
use crate::id::WorkerId;

/// Errors raised by a synchronization primitive.
///
/// Returned from `sync_notify()` on a sync point and from the internal
/// row barriers of the row-synchronized work providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// The primitive was stopped via `stop_now()`. Every blocked and
    /// every future arrival observes this error.
    Interrupted {
        /// The control event the interrupted sync point belongs to, or
        /// `None` for an internal row barrier.
        event: Option<ControlEvent>,
    },
    /// A thread panicked while holding the barrier's internal lock.
    Poisoned,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted { event: Some(e) } => write!(f, "sync point '{e}' interrupted"),
            Self::Interrupted { event: None } => write!(f, "row barrier interrupted"),
            Self::Poisoned => write!(f, "barrier state poisoned by a panicking thread"),
        }
    }
}

impl Error for SyncError {}

/// Errors from a simulation worker.
///
/// Everything except [`SimError::Interrupted`] is a worker fault: it is
/// recorded in the run's last-error slot and stops every sibling worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// The worker unwound because another party called `stop_now()`.
    /// Not an application failure.
    Interrupted,
    /// A worker thread panicked inside its phase logic.
    WorkerPanicked {
        /// The worker that panicked.
        worker: WorkerId,
        /// The panic payload, if it was a string.
        message: String,
    },
    /// A cell was processed before its neighbourhood was installed.
    NeighbourhoodUnset {
        /// Linear index of the offending cell.
        cell: usize,
    },
    /// A statistics update targeted an iteration past the end of the run.
    IterationOutOfRange {
        /// The requested iteration.
        iteration: u32,
        /// The last valid iteration.
        max: u32,
    },
    /// A synchronization primitive failed for a reason other than
    /// cooperative interruption.
    Sync(SyncError),
}

impl SimError {
    /// Whether this error is the cooperative shutdown signal rather
    /// than a fault.
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => write!(f, "simulation interrupted"),
            Self::WorkerPanicked { worker, message } => {
                write!(f, "worker {worker} panicked: {message}")
            }
            Self::NeighbourhoodUnset { cell } => {
                write!(f, "cell {cell} has no neighbourhood")
            }
            Self::IterationOutOfRange { iteration, max } => {
                write!(f, "iteration {iteration} exceeds last iteration {max}")
            }
            Self::Sync(e) => write!(f, "sync: {e}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sync(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyncError> for SimError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Interrupted { .. } => Self::Interrupted,
            other => Self::Sync(other),
        }
    }
}

/// Errors from loading or validating [`ModelParams`](crate::ModelParams).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamsError {
    /// A required key is absent from the parameter source.
    Missing {
        /// The missing key.
        key: &'static str,
    },
    /// A value could not be parsed as an integer.
    Invalid {
        /// The key whose value failed to parse.
        key: &'static str,
        /// The raw value.
        value: String,
    },
    /// A non-comment line has no `=` or `:` separator.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
    /// A value parsed but violates a model constraint.
    OutOfRange {
        /// The offending key.
        key: &'static str,
        /// Description of the violated constraint.
        reason: String,
    },
    /// The parameter file could not be read.
    Io {
        /// Description of the I/O failure.
        reason: String,
    },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "missing parameter {key}"),
            Self::Invalid { key, value } => {
                write!(f, "parameter {key} has non-integer value '{value}'")
            }
            Self::Malformed { line, content } => {
                write!(f, "line {line}: expected KEY=value, got '{content}'")
            }
            Self::OutOfRange { key, reason } => write!(f, "parameter {key}: {reason}"),
            Self::Io { reason } => write!(f, "cannot read parameters: {reason}"),
        }
    }
}

impl Error for ParamsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_sync_error_maps_to_interruption() {
        let e: SimError = SyncError::Interrupted {
            event: Some(ControlEvent::AfterHalfIteration),
        }
        .into();
        assert!(e.is_interruption());
    }

    #[test]
    fn poisoned_sync_error_is_a_fault() {
        let e: SimError = SyncError::Poisoned.into();
        assert!(!e.is_interruption());
        assert!(e.source().is_some());
    }

    #[test]
    fn display_names_the_event() {
        let e = SyncError::Interrupted {
            event: Some(ControlEvent::AfterInitAgents),
        };
        assert_eq!(e.to_string(), "sync point 'after-init-agents' interrupted");
    }
}
