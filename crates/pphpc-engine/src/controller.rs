//! Phase coordination: one sync point per control event, plus the work
//! providers for every domain.
//!
//! The controller is built once, before any worker starts, and shared by
//! reference among the workers. Its per-strategy sync layout decides
//! which phase boundaries are full rendezvous and which only count
//! arrivals. A boundary is blocking whenever the next phase may touch
//! state the previous phase writes in a sibling's partition:
//!
//! | Event                 | equal | eq_rowsync | on_demand | interval | st |
//! |-----------------------|-------|------------|-----------|----------|----|
//! | before-init-cells     | NB    | NB         | NB        | NB       | NB |
//! | after-init-cells      | B     | B          | B         | B        | NB |
//! | after-set-neighbours  | NB    | B          | NB        | NB       | NB |
//! | after-init-agents     | B     | B          | B         | B        | NB |
//! | after-first-stats     | NB    | B          | B         | NB       | NB |
//! | after-half-iteration  | B     | B          | B         | B        | NB |
//! | after-end-iteration   | B     | B          | B         | B        | NB |
//! | after-end-simulation  | NB    | NB         | NB        | NB       | NB |

use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use pphpc_core::{ControlEvent, ModelParams, SyncError, WorkDomain};
use pphpc_space::Space;

use crate::config::{ConfigError, WorkStrategy};
use crate::equal::{EqualWorkProvider, SingleThreadWorkProvider};
use crate::on_demand::OnDemandWorkProvider;
use crate::provider::WorkProvider;
use crate::row_sync::RowSyncWorkProvider;
use crate::sync::{Observer, SyncMode, SyncPoint};

/// Blocking / non-blocking choice for each control event of `strategy`,
/// indexed by [`ControlEvent::index`].
pub fn sync_layout(strategy: WorkStrategy) -> [SyncMode; ControlEvent::COUNT] {
    use SyncMode::{Blocking as B, NonBlocking as NB};
    match strategy {
        WorkStrategy::Equal => [NB, B, NB, B, NB, B, B, NB],
        WorkStrategy::EqualRowSync => [NB, B, B, B, B, B, B, NB],
        WorkStrategy::OnDemand { .. } => [NB, B, NB, B, B, B, B, NB],
        WorkStrategy::Interval => [NB, B, NB, B, NB, B, B, NB],
        WorkStrategy::SingleThread => [NB; ControlEvent::COUNT],
    }
}

/// Sync points and work providers for one run.
pub struct Controller {
    strategy: WorkStrategy,
    workers: usize,
    points: Vec<SyncPoint>,
    providers: IndexMap<WorkDomain, Box<dyn WorkProvider>>,
    stopped: AtomicBool,
}

// Compile-time assertion: Controller must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Controller>();
};

impl Controller {
    /// Build the sync points and eagerly construct a provider for every
    /// work domain.
    ///
    /// Fails before any worker exists if the space cannot be partitioned
    /// among `workers` under `strategy`.
    pub fn new(
        strategy: WorkStrategy,
        workers: usize,
        space: &dyn Space,
        params: &ModelParams,
    ) -> Result<Self, ConfigError> {
        let workers = workers.max(1);
        let cells = space.cell_count();
        let sheep = params.init_sheep as usize;
        let wolves = params.init_wolves as usize;
        let row_size = space.row_size();
        let radius = space.neighbourhood_radius();

        let mut providers: IndexMap<WorkDomain, Box<dyn WorkProvider>> = IndexMap::new();
        match strategy {
            WorkStrategy::Equal => {
                providers.insert(WorkDomain::Cells, Box::new(EqualWorkProvider::new(cells, workers)));
            }
            WorkStrategy::EqualRowSync => {
                providers.insert(
                    WorkDomain::Cells,
                    Box::new(RowSyncWorkProvider::equal_row_sync(cells, row_size, radius, workers)?),
                );
            }
            WorkStrategy::Interval => {
                providers.insert(
                    WorkDomain::Cells,
                    Box::new(RowSyncWorkProvider::interval(cells, row_size, radius, workers)?),
                );
            }
            WorkStrategy::OnDemand { block_size } => {
                for (domain, size) in [
                    (WorkDomain::Cells, cells),
                    (WorkDomain::Sheep, sheep),
                    (WorkDomain::Wolves, wolves),
                ] {
                    providers.insert(domain, Box::new(OnDemandWorkProvider::new(size, block_size)));
                }
            }
            WorkStrategy::SingleThread => {
                for (domain, size) in [
                    (WorkDomain::Cells, cells),
                    (WorkDomain::Sheep, sheep),
                    (WorkDomain::Wolves, wolves),
                ] {
                    providers.insert(domain, Box::new(SingleThreadWorkProvider::new(size)));
                }
            }
        }
        // Agent creation has no spatial constraint: equal ranges unless
        // the strategy already supplied its own.
        providers
            .entry(WorkDomain::Sheep)
            .or_insert_with(|| Box::new(EqualWorkProvider::new(sheep, workers)));
        providers
            .entry(WorkDomain::Wolves)
            .or_insert_with(|| Box::new(EqualWorkProvider::new(wolves, workers)));

        for (domain, p) in &providers {
            tracing::debug!(
                %domain,
                provider = p.name(),
                size = p.domain_size(),
                workers,
                "work provider ready"
            );
        }

        let layout = sync_layout(strategy);
        let points = ControlEvent::ALL
            .iter()
            .map(|&event| SyncPoint::new(layout[event.index()], event, workers))
            .collect();

        Ok(Self {
            strategy,
            workers,
            points,
            providers,
            stopped: AtomicBool::new(false),
        })
    }

    /// The partitioning strategy.
    pub fn strategy(&self) -> WorkStrategy {
        self.strategy
    }

    /// Number of workers every sync point waits for.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The provider for `domain`. Every domain is registered at
    /// construction.
    pub fn provider(&self, domain: WorkDomain) -> &dyn WorkProvider {
        &*self.providers[&domain]
    }

    /// The sync point for `event`.
    pub fn sync_point(&self, event: ControlEvent) -> &SyncPoint {
        &self.points[event.index()]
    }

    /// Declare arrival at `event`.
    pub fn sync(&self, event: ControlEvent) -> Result<(), SyncError> {
        self.sync_point(event).sync_notify()
    }

    /// Arrival at [`ControlEvent::BeforeInitCells`].
    pub fn sync_before_init_cells(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::BeforeInitCells)
    }

    /// Arrival at [`ControlEvent::AfterInitCells`].
    pub fn sync_after_init_cells(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterInitCells)
    }

    /// Arrival at [`ControlEvent::AfterSetNeighbours`].
    pub fn sync_after_set_neighbours(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterSetNeighbours)
    }

    /// Arrival at [`ControlEvent::AfterInitAgents`].
    pub fn sync_after_init_agents(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterInitAgents)
    }

    /// Arrival at [`ControlEvent::AfterFirstStats`].
    pub fn sync_after_first_stats(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterFirstStats)
    }

    /// Arrival at [`ControlEvent::AfterHalfIteration`].
    pub fn sync_after_half_iteration(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterHalfIteration)
    }

    /// Arrival at [`ControlEvent::AfterEndIteration`].
    pub fn sync_after_end_iteration(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterEndIteration)
    }

    /// Arrival at [`ControlEvent::AfterEndSimulation`].
    pub fn sync_after_end_simulation(&self) -> Result<(), SyncError> {
        self.sync(ControlEvent::AfterEndSimulation)
    }

    /// Register `observer` on the sync point of `event`.
    pub fn register_observer(&self, event: ControlEvent, observer: Observer) {
        self.sync_point(event).register_observer(observer);
    }

    /// Interrupt every sync point and every provider's internal barrier.
    ///
    /// Idempotent. Blocked workers wake with [`SyncError::Interrupted`].
    pub fn stop_now(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!("controller stopping");
        for point in &self.points {
            point.stop_now();
        }
        for provider in self.providers.values() {
            provider.interrupt();
        }
    }

    /// Whether [`stop_now`](Self::stop_now) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pphpc_space::Torus2D;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn params() -> ModelParams {
        ModelParams {
            init_sheep: 50,
            init_wolves: 10,
            grid_x: 10,
            grid_y: 10,
            ..ModelParams::default()
        }
    }

    fn torus() -> Torus2D {
        Torus2D::new(10, 10).unwrap()
    }

    #[test]
    fn every_strategy_registers_every_domain() {
        for strategy in [
            WorkStrategy::Equal,
            WorkStrategy::EqualRowSync,
            WorkStrategy::OnDemand { block_size: 7 },
            WorkStrategy::Interval,
            WorkStrategy::SingleThread,
        ] {
            let c = Controller::new(strategy, 2, &torus(), &params()).unwrap();
            assert_eq!(c.provider(WorkDomain::Cells).domain_size(), 100);
            assert_eq!(c.provider(WorkDomain::Sheep).domain_size(), 50);
            assert_eq!(c.provider(WorkDomain::Wolves).domain_size(), 10);
        }
    }

    #[test]
    fn row_sync_rejects_too_many_workers_at_construction() {
        match Controller::new(WorkStrategy::EqualRowSync, 4, &torus(), &params()) {
            Err(ConfigError::TooManyWorkers { max: 3, .. }) => {}
            other => panic!("expected TooManyWorkers, got {:?}", other.err()),
        }
    }

    #[test]
    fn layout_matches_strategy() {
        let c = Controller::new(WorkStrategy::Equal, 2, &torus(), &params()).unwrap();
        assert_eq!(
            c.sync_point(ControlEvent::AfterHalfIteration).mode(),
            SyncMode::Blocking
        );
        assert_eq!(
            c.sync_point(ControlEvent::AfterFirstStats).mode(),
            SyncMode::NonBlocking
        );
        assert!(sync_layout(WorkStrategy::SingleThread)
            .iter()
            .all(|&m| m == SyncMode::NonBlocking));
    }

    #[test]
    fn observer_registered_by_event() {
        let c = Controller::new(WorkStrategy::SingleThread, 1, &torus(), &params()).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        c.register_observer(
            ControlEvent::AfterEndIteration,
            Box::new(move |e| {
                assert_eq!(e, ControlEvent::AfterEndIteration);
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        c.sync_after_half_iteration().unwrap();
        c.sync_after_end_iteration().unwrap();
        c.sync_after_end_iteration().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stop_now_unblocks_every_waiter() {
        let c = Arc::new(Controller::new(WorkStrategy::Equal, 4, &torus(), &params()).unwrap());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let c = Arc::clone(&c);
                thread::spawn(move || c.sync_after_half_iteration())
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        c.stop_now();
        c.stop_now();
        assert!(c.is_stopped());
        for w in waiters {
            match w.join().unwrap() {
                Err(SyncError::Interrupted { .. }) => {}
                other => panic!("expected Interrupted, got {other:?}"),
            }
        }
        assert!(c.sync_before_init_cells().is_err());
    }
}
