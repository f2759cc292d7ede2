//! The per-thread simulation pipeline.
//!
//! Every worker runs the same state machine, parameterised only by the
//! tokens its providers hand out:
//!
//! ```text
//! Init -> InitCells -> SetNeighbours -> InitAgents -> FirstStats
//!      -> { Move+Grow -> HalfSync -> Act+Stats -> EndSync } x iters
//!      -> Finished
//! ```
//!
//! Each arrow into a phase boundary is a controller sync. A fault (any
//! error other than interruption, or a panic) is recorded in the model
//! and stops the controller so that no sibling waits forever.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rand::Rng;

use pphpc_core::{Agent, AgentKind, IterationStats, SimError, WorkDomain, WorkerId};

use crate::config::Determinism;
use crate::controller::Controller;
use crate::model::Model;
use crate::provider::WorkToken;
use crate::rng::{RandomStream, StreamPhase};

/// One simulation worker.
pub struct Worker<'a> {
    id: WorkerId,
    model: &'a Model,
    controller: &'a Controller,
    rng: RandomStream,
    acc: IterationStats,
}

impl<'a> Worker<'a> {
    /// A worker with its private random stream.
    pub fn new(id: WorkerId, model: &'a Model, controller: &'a Controller) -> Self {
        Self {
            id,
            rng: model.rngs().create_rng(id),
            model,
            controller,
            acc: IterationStats::default(),
        }
    }

    /// Run every phase to completion.
    ///
    /// Returns [`SimError::Interrupted`] if the controller was stopped.
    pub fn run(&mut self) -> Result<(), SimError> {
        let controller = self.controller;
        let provider = controller.provider(WorkDomain::Cells);
        let mut cells = provider.new_work(self.id);
        let mut sheep = controller.provider(WorkDomain::Sheep).new_work(self.id);
        let mut wolves = controller.provider(WorkDomain::Wolves).new_work(self.id);

        controller.sync_before_init_cells()?;
        self.init_cells(&mut cells)?;
        controller.sync_after_init_cells()?;

        self.set_neighbours(&mut cells)?;
        controller.sync_after_set_neighbours()?;

        self.init_agents(&mut sheep, WorkDomain::Sheep, AgentKind::Sheep)?;
        self.init_agents(&mut wolves, WorkDomain::Wolves, AgentKind::Wolf)?;
        controller.sync_after_init_agents()?;

        self.collect_stats(&mut cells, 0)?;
        controller.sync_after_first_stats()?;

        for iteration in 1..=self.model.params().iters {
            if controller.is_stopped() {
                return Err(SimError::Interrupted);
            }
            self.move_and_grow(&mut cells, iteration)?;
            controller.sync_after_half_iteration()?;
            self.act_and_collect(&mut cells, iteration)?;
            controller.sync_after_end_iteration()?;
            tracing::trace!(worker = %self.id, iteration, "iteration done");
        }

        controller.sync_after_end_simulation()?;
        Ok(())
    }

    /// Rekey the stream for one token when results must not depend on
    /// the partition.
    fn reseed(&mut self, phase: StreamPhase, iteration: u32, token: usize) {
        if self.model.determinism() == Determinism::Repeatable {
            self.rng = self.model.rngs().token_rng(phase, iteration, token);
        }
    }

    /// Rewind `token` and call `f` for each index it yields.
    fn sweep(
        &mut self,
        token: &mut WorkToken,
        domain: WorkDomain,
        mut f: impl FnMut(&mut Self, usize) -> Result<(), SimError>,
    ) -> Result<(), SimError> {
        let controller = self.controller;
        let provider = controller.provider(domain);
        provider.reset(token);
        while let Some(index) = provider.next_token(token)? {
            f(self, index)?;
        }
        Ok(())
    }

    // ── Phases ─────────────────────────────────────────────────────

    fn init_cells(&mut self, token: &mut WorkToken) -> Result<(), SimError> {
        let restart = self.model.params().grass_restart;
        self.sweep(token, WorkDomain::Cells, |w, i| {
            w.reseed(StreamPhase::InitCells, 0, i);
            let timer = if w.rng.random_bool(0.5) {
                0
            } else {
                1 + w.rng.random_range(0..restart)
            };
            w.model.cells()[i].init_grass(timer);
            Ok(())
        })
    }

    fn set_neighbours(&mut self, token: &mut WorkToken) -> Result<(), SimError> {
        self.sweep(token, WorkDomain::Cells, |w, i| {
            let space = w.model.space();
            w.model.cells()[i].set_neighbourhood(space.neighbourhood(i));
            Ok(())
        })
    }

    fn init_agents(
        &mut self,
        token: &mut WorkToken,
        domain: WorkDomain,
        kind: AgentKind,
    ) -> Result<(), SimError> {
        let phase = match kind {
            AgentKind::Sheep => StreamPhase::InitSheep,
            AgentKind::Wolf => StreamPhase::InitWolves,
        };
        let gain = self.model.params().gain_from_food(kind);
        let cell_count = self.model.cells().len();
        self.sweep(token, domain, |w, slot| {
            w.reseed(phase, 0, slot);
            let pos = w.rng.random_range(0..cell_count);
            let energy = 1 + w.rng.random_range(0..2 * gain);
            w.model.cells()[pos].put_init_agent(Agent { energy, kind });
            Ok(())
        })
    }

    fn collect_stats(&mut self, token: &mut WorkToken, iteration: u32) -> Result<(), SimError> {
        self.acc.reset();
        self.sweep(token, WorkDomain::Cells, |w, i| {
            w.model.cells()[i].collect_stats(&mut w.acc);
            Ok(())
        })?;
        self.model.stats().update(iteration, &self.acc)
    }

    fn move_and_grow(&mut self, token: &mut WorkToken, iteration: u32) -> Result<(), SimError> {
        self.sweep(token, WorkDomain::Cells, |w, i| {
            w.reseed(StreamPhase::Move, iteration, i);
            let cells = w.model.cells();
            cells[i].regenerate_grass();
            cells[i].move_agents(cells, &mut w.rng)
        })
    }

    fn act_and_collect(&mut self, token: &mut WorkToken, iteration: u32) -> Result<(), SimError> {
        self.acc.reset();
        self.sweep(token, WorkDomain::Cells, |w, i| {
            w.reseed(StreamPhase::Act, iteration, i);
            let cell = &w.model.cells()[i];
            cell.future_is_now();
            cell.act(w.model.params(), &mut w.rng);
            cell.sweep_removed();
            cell.collect_stats(&mut w.acc);
            Ok(())
        })?;
        self.model.stats().update(iteration, &self.acc)
    }
}

/// Run worker `id` to completion, converting panics into
/// [`SimError::WorkerPanicked`] and stopping the controller on any fault.
pub fn run_worker(id: WorkerId, model: &Model, controller: &Controller) -> Result<(), SimError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| Worker::new(id, model, controller).run()))
        .unwrap_or_else(|payload| {
            Err(SimError::WorkerPanicked {
                worker: id,
                message: panic_message(payload.as_ref()),
            })
        });
    match &result {
        Ok(()) => tracing::debug!(worker = %id, "worker finished"),
        Err(e) if e.is_interruption() => tracing::debug!(worker = %id, "worker interrupted"),
        Err(e) => {
            tracing::error!(worker = %id, error = %e, "worker fault, stopping siblings");
            model.record_error(e.clone());
            controller.stop_now();
        }
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
