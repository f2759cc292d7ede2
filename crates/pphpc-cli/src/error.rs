//! Program errors and their exit codes.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use pphpc_core::{ParamsError, SimError};
use pphpc_engine::ConfigError;

/// A failure at one stage of a command-line run.
#[derive(Debug)]
pub enum CliError {
    /// The command line could not be parsed.
    Args(clap::Error),
    /// The parameter file could not be read or is invalid.
    Params(ParamsError),
    /// The simulation could not be configured or started.
    Setup(ConfigError),
    /// The simulation failed while running.
    Sim(SimError),
    /// The statistics file could not be written.
    Export {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Args(_) => -1,
            Self::Params(_) => -2,
            Self::Setup(_) | Self::Sim(_) => -3,
            Self::Export { .. } => -4,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Args(e) => write!(f, "{e}"),
            Self::Params(e) => write!(f, "invalid parameters: {e}"),
            Self::Setup(e) => write!(f, "cannot start simulation: {e}"),
            Self::Sim(e) => write!(f, "simulation failed: {e}"),
            Self::Export { path, source } => {
                write!(f, "cannot write statistics to {}: {source}", path.display())
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Args(e) => Some(e),
            Self::Params(e) => Some(e),
            Self::Setup(e) => Some(e),
            Self::Sim(e) => Some(e),
            Self::Export { source, .. } => Some(source),
        }
    }
}

impl From<ParamsError> for CliError {
    fn from(e: ParamsError) -> Self {
        Self::Params(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Setup(e)
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        Self::Sim(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_stage() {
        let params = CliError::Params(ParamsError::Missing { key: "ITERS" });
        let setup = CliError::Setup(ConfigError::ZeroWorkers);
        let sim = CliError::Sim(SimError::Interrupted);
        let export = CliError::Export {
            path: "out.txt".into(),
            source: io::Error::other("disk full"),
        };
        assert_eq!(params.exit_code(), -2);
        assert_eq!(setup.exit_code(), -3);
        assert_eq!(sim.exit_code(), -3);
        assert_eq!(export.exit_code(), -4);
        assert!(export.to_string().contains("out.txt"));
    }
}
