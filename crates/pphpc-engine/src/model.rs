//! The run context shared by every worker.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pphpc_core::{ModelParams, SimError};
use pphpc_space::{Space, Torus2D};

use crate::cell::Cell;
use crate::config::{ConfigError, Determinism, SimConfig};
use crate::rng::RngFactory;
use crate::stats::GlobalStats;

/// Everything a worker reads or writes besides its own token state.
///
/// Built once per run, before workers start, and shared by reference.
pub struct Model {
    params: ModelParams,
    space: Box<dyn Space>,
    cells: Vec<Cell>,
    stats: GlobalStats,
    rngs: RngFactory,
    determinism: Determinism,
    fault: Mutex<FaultSlot>,
}

#[derive(Default)]
struct FaultSlot {
    error: Option<SimError>,
    reported: bool,
}

// Compile-time assertion: Model must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Model>();
};

impl Model {
    /// Build the grid, cells, statistics rows, and stream factory.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let params = config.params.clone();
        let space = Torus2D::new(params.grid_x, params.grid_y)?;
        let sorted = config.determinism == Determinism::Repeatable;
        let cells = (0..space.cell_count())
            .map(|i| Cell::new(i, sorted))
            .collect();
        Ok(Self {
            stats: GlobalStats::new(params.iters),
            rngs: RngFactory::new(config.rng, config.seed),
            determinism: config.determinism,
            space: Box::new(space),
            cells,
            params,
            fault: Mutex::new(FaultSlot::default()),
        })
    }

    /// Model parameters.
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// The grid topology.
    pub fn space(&self) -> &dyn Space {
        &*self.space
    }

    /// Every cell, by linear index.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Per-iteration totals.
    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }

    /// Random stream factory.
    pub fn rngs(&self) -> &RngFactory {
        &self.rngs
    }

    /// Reproducibility policy.
    pub fn determinism(&self) -> Determinism {
        self.determinism
    }

    fn fault(&self) -> MutexGuard<'_, FaultSlot> {
        self.fault.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a worker fault. The first fault of a run is kept; returns
    /// whether `error` was the one kept.
    pub fn record_error(&self, error: SimError) -> bool {
        let mut slot = self.fault();
        if slot.error.is_some() {
            return false;
        }
        slot.error = Some(error);
        true
    }

    /// The recorded fault, if any.
    pub fn last_error(&self) -> Option<SimError> {
        self.fault().error.clone()
    }

    /// The recorded fault, handed out once per run. Later calls, and
    /// calls before any fault, return `None`.
    pub fn take_fault_report(&self) -> Option<SimError> {
        let mut slot = self.fault();
        if slot.reported {
            return None;
        }
        let error = slot.error.clone()?;
        slot.reported = true;
        Some(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pphpc_core::WorkerId;

    #[test]
    fn builds_one_cell_per_grid_position() {
        let mut cfg = SimConfig::default();
        cfg.params.grid_x = 7;
        cfg.params.grid_y = 3;
        cfg.params.iters = 5;
        let m = Model::new(&cfg).unwrap();
        assert_eq!(m.cells().len(), 21);
        assert_eq!(m.space().row_size(), 7);
        assert_eq!(m.stats().iters(), 5);
        assert!(m.cells().iter().enumerate().all(|(i, c)| c.index() == i));
    }

    #[test]
    fn first_fault_wins() {
        let m = Model::new(&SimConfig::default()).unwrap();
        assert_eq!(m.last_error(), None);
        m.record_error(SimError::NeighbourhoodUnset { cell: 3 });
        m.record_error(SimError::WorkerPanicked {
            worker: WorkerId(1),
            message: "boom".into(),
        });
        assert_eq!(m.last_error(), Some(SimError::NeighbourhoodUnset { cell: 3 }));
    }

    #[test]
    fn equal_faults_are_reported_once() {
        let m = Model::new(&SimConfig::default()).unwrap();
        assert_eq!(m.take_fault_report(), None);
        let fault = SimError::NeighbourhoodUnset { cell: 0 };
        assert!(m.record_error(fault.clone()));
        assert!(!m.record_error(fault.clone()));
        assert_eq!(m.take_fault_report(), Some(fault.clone()));
        assert_eq!(m.take_fault_report(), None);
        assert_eq!(m.last_error(), Some(fault));
    }
}
