//! User-facing `Simulation` driver.
//!
//! ```text
//! Simulation::new(config)     validate, build model + controller + providers
//!        |
//!   register_observer(..)     optional, before start()
//!        |
//!     start()                 spawn W named worker threads
//!        |                        |
//!   current_iteration()       run_worker(i) x W  --faults--> events: Failed
//!   stop_now()                    |
//!        |                    after-end-simulation ------> events: Finished
//!     wait()                  join, RunReport or the recorded SimError
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use pphpc_core::{ControlEvent, ModelParams, SimError, WorkerId};

use crate::config::{ConfigError, SimConfig};
use crate::controller::Controller;
use crate::model::Model;
use crate::stats::GlobalStats;
use crate::worker::run_worker;

// ── SimEvent ─────────────────────────────────────────────────────

/// Terminal notification delivered on [`Simulation::events`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    /// Every worker passed after-end-simulation; statistics are complete.
    Finished,
    /// A worker faulted and the run was stopped.
    Failed(SimError),
}

// ── RunReport ────────────────────────────────────────────────────

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Wall time from `start()` to the last join.
    pub elapsed_ms: u64,
    /// Number of worker threads joined.
    pub workers_joined: usize,
    /// Iterations completed after initialisation.
    pub iterations: u32,
    /// [`GlobalStats::fingerprint`] of the final statistics.
    pub fingerprint: u64,
}

// ── Simulation ───────────────────────────────────────────────────

/// A predator-prey run on a fixed pool of worker threads.
pub struct Simulation {
    workers: usize,
    model: Arc<Model>,
    controller: Arc<Controller>,
    handles: Vec<JoinHandle<Result<(), SimError>>>,
    started: Option<Instant>,
    iteration: Arc<AtomicU32>,
    events_tx: Sender<SimEvent>,
    events_rx: Receiver<SimEvent>,
}

impl Simulation {
    /// Validate `config` and build everything a run needs.
    ///
    /// Partitioning failures (for example too many workers for the
    /// row-synchronized strategy) are reported here, before any thread
    /// exists.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let workers = config.resolved_worker_count();
        let model = Arc::new(Model::new(&config)?);
        let controller = Arc::new(Controller::new(
            config.strategy,
            workers,
            model.space(),
            model.params(),
        )?);

        let iteration = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&iteration);
        controller.register_observer(
            ControlEvent::AfterFirstStats,
            Box::new(move |_| counter.store(0, Ordering::Release)),
        );
        let counter = Arc::clone(&iteration);
        controller.register_observer(
            ControlEvent::AfterEndIteration,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::AcqRel);
            }),
        );

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let finished = events_tx.clone();
        controller.register_observer(
            ControlEvent::AfterEndSimulation,
            Box::new(move |_| {
                let _ = finished.send(SimEvent::Finished);
            }),
        );

        tracing::info!(
            strategy = config.strategy.command_name(),
            workers,
            grid_x = config.params.grid_x,
            grid_y = config.params.grid_y,
            iters = config.params.iters,
            determinism = ?config.determinism,
            rng = config.rng.name(),
            "simulation configured"
        );

        Ok(Self {
            workers,
            model,
            controller,
            handles: Vec::new(),
            started: None,
            iteration,
            events_tx,
            events_rx,
        })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Model parameters of this run.
    pub fn params(&self) -> &ModelParams {
        self.model.params()
    }

    /// Register `observer` on `event`. Must be called before
    /// [`start`](Self::start) to see every generation.
    pub fn register_observer(
        &self,
        event: ControlEvent,
        observer: impl Fn(ControlEvent) + Send + Sync + 'static,
    ) {
        self.controller.register_observer(event, Box::new(observer));
    }

    /// Spawn the worker threads.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.started.is_some() {
            return Err(ConfigError::AlreadyStarted);
        }
        self.started = Some(Instant::now());
        tracing::info!(workers = self.workers, "simulation starting");

        for i in 0..self.workers {
            let id = WorkerId(i as u32);
            let model = Arc::clone(&self.model);
            let controller = Arc::clone(&self.controller);
            let events = self.events_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("pphpc-worker-{i}"))
                .spawn(move || {
                    let result = run_worker(id, &model, &controller);
                    report_fault(&model, &events, &result);
                    result
                });
            match spawned {
                Ok(handle) => self.handles.push(handle),
                Err(e) => {
                    // Release the workers already parked at a barrier.
                    self.controller.stop_now();
                    return Err(ConfigError::ThreadSpawnFailed {
                        reason: format!("worker {i}: {e}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Ask every worker to unwind at its next sync point.
    pub fn stop_now(&self) {
        tracing::info!("stop requested");
        self.controller.stop_now();
    }

    /// Whether the run has been stopped, by request or by a fault.
    pub fn is_stopped(&self) -> bool {
        self.controller.is_stopped()
    }

    /// Join every worker.
    ///
    /// Returns the recorded fault if one occurred, or
    /// [`SimError::Interrupted`] if the run was stopped without a fault.
    /// On a simulation that was never started, returns an empty report.
    pub fn wait(&mut self) -> Result<RunReport, SimError> {
        let mut workers_joined = 0;
        let mut interrupted = false;
        for (i, handle) in self.handles.drain(..).enumerate() {
            match handle.join() {
                Ok(Ok(())) => workers_joined += 1,
                Ok(Err(e)) => {
                    workers_joined += 1;
                    interrupted |= e.is_interruption();
                }
                Err(_) => {
                    self.model.record_error(SimError::WorkerPanicked {
                        worker: WorkerId(i as u32),
                        message: "worker thread could not be joined".into(),
                    });
                }
            }
        }
        let elapsed_ms = self
            .started
            .map_or(0, |t| t.elapsed().as_millis() as u64);

        if let Some(e) = self.model.last_error() {
            tracing::warn!(error = %e, "simulation failed");
            return Err(e);
        }
        if interrupted {
            return Err(SimError::Interrupted);
        }
        let report = RunReport {
            elapsed_ms,
            workers_joined,
            iterations: self.current_iteration(),
            fingerprint: self.model.stats().fingerprint(),
        };
        tracing::info!(
            elapsed_ms,
            iterations = report.iterations,
            fingerprint = format_args!("{:016x}", report.fingerprint),
            "simulation finished"
        );
        Ok(report)
    }

    /// Terminal events. Each call returns a handle to the same queue.
    pub fn events(&self) -> Receiver<SimEvent> {
        self.events_rx.clone()
    }

    /// Iterations completed so far.
    pub fn current_iteration(&self) -> u32 {
        self.iteration.load(Ordering::Acquire)
    }

    /// The run context: parameters, grid, and cells.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Per-iteration statistics. Complete up to
    /// [`current_iteration`](Self::current_iteration).
    pub fn stats(&self) -> &GlobalStats {
        self.model.stats()
    }
}

/// Send [`SimEvent::Failed`] for a faulted worker, once per run however
/// many workers fault.
fn report_fault(model: &Model, events: &Sender<SimEvent>, result: &Result<(), SimError>) {
    if matches!(result, Err(e) if !e.is_interruption()) {
        if let Some(fault) = model.take_fault_report() {
            let _ = events.send(SimEvent::Failed(fault));
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.controller.stop_now();
            for handle in self.handles.drain(..) {
                let _ = handle.join();
            }
        }
    }
}
