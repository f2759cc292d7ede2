//! One command-line run: load, simulate, export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use pphpc_core::{ControlEvent, ModelParams};
use pphpc_engine::{write_stats, Simulation};

use crate::args::Cli;
use crate::error::CliError;

/// Run the simulation described by `cli` and export its statistics.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let params = ModelParams::from_file(&cli.params)?;
    let seed = cli.resolved_seed();
    tracing::debug!(params = %cli.params.display(), seed = %seed, "parameters loaded");

    let mut sim = Simulation::new(cli.sim_config(params, seed))?;

    if cli.print_interval > 0 {
        let interval = cli.print_interval;
        let done = AtomicU32::new(0);
        sim.register_observer(ControlEvent::AfterEndIteration, move |_| {
            let iter = done.fetch_add(1, Ordering::Relaxed) + 1;
            if iter % interval == 0 {
                println!("Iter {iter}");
            }
        });
    }

    let timer = Instant::now();
    sim.start()?;
    println!("Started simulation with {} threads...", sim.workers());
    let report = sim.wait()?;
    println!(
        "Total simulation time: {:.3} s\n",
        timer.elapsed().as_secs_f64()
    );
    tracing::debug!(
        iterations = report.iterations,
        fingerprint = format_args!("{:016x}", report.fingerprint),
        "run complete"
    );

    export(&sim, cli)
}

fn export(sim: &Simulation, cli: &Cli) -> Result<(), CliError> {
    let failed = |source| CliError::Export {
        path: cli.stats.clone(),
        source,
    };
    let file = File::create(&cli.stats).map_err(failed)?;
    let mut out = BufWriter::new(file);
    write_stats(sim.stats(), &mut out).map_err(failed)?;
    out.flush().map_err(failed)?;
    tracing::info!(path = %cli.stats.display(), "statistics exported");
    Ok(())
}
