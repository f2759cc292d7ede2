//! PPHPC command-line runner.
//!
//! ```text
//! pphpc [-p config.txt] [-s stats.txt] [-r seed] [-g rng] [-i n] [-n threads]
//!       [--relaxed] [-d] <equal | eq_rowsync | on_demand [-b size] | interval | st>
//! ```
//!
//! Exit codes: 0 success, -1 bad arguments, -2 bad parameters,
//! -3 simulation failure, -4 export failure.

mod args;
mod error;
mod run;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;
use crate::error::CliError;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => exit_code(&CliError::Args(e)),
            };
        }
    };
    init_tracing(cli.debug);

    match run::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.debug {
                tracing::error!(error = ?e, "run failed");
            }
            eprintln!("error: {e}");
            exit_code(&e)
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Negative codes surface as their low byte, e.g. -1 as 255.
fn exit_code(e: &CliError) -> ExitCode {
    ExitCode::from(e.exit_code() as u8)
}
