//! Reusable observer fixtures.
//!
//! - [`CountingObserver`]: counts notifications per control event.
//! - [`EventLog`]: records the order in which events fired.
//! - [`PanicAfter`]: panics deterministically on the N-th notification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pphpc_core::ControlEvent;
use pphpc_engine::Simulation;

/// Counts notifications for each control event.
#[derive(Clone, Default)]
pub struct CountingObserver {
    counts: Arc<[AtomicUsize; ControlEvent::COUNT]>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register on every event of `sim`.
    pub fn attach(&self, sim: &Simulation) {
        for event in ControlEvent::ALL {
            let counts = Arc::clone(&self.counts);
            sim.register_observer(event, move |e| {
                counts[e.index()].fetch_add(1, Ordering::SeqCst);
            });
        }
    }

    /// Notifications seen for `event`.
    pub fn count(&self, event: ControlEvent) -> usize {
        self.counts[event.index()].load(Ordering::SeqCst)
    }
}

/// Records every notification in firing order.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ControlEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register on every event of `sim`.
    pub fn attach(&self, sim: &Simulation) {
        for event in ControlEvent::ALL {
            let events = Arc::clone(&self.events);
            sim.register_observer(event, move |e| {
                events.lock().unwrap().push(e);
            });
        }
    }

    /// The recorded events.
    pub fn events(&self) -> Vec<ControlEvent> {
        self.events.lock().unwrap().clone()
    }
}

/// Panics on the `n`-th notification of the event it is registered on.
///
/// Used to inject a worker fault at a known point of the pipeline.
pub struct PanicAfter {
    n: usize,
    calls: AtomicUsize,
}

impl PanicAfter {
    pub fn new(n: usize) -> Arc<Self> {
        Arc::new(Self {
            n,
            calls: AtomicUsize::new(0),
        })
    }

    /// Register on `event` of `sim`.
    pub fn attach(self: &Arc<Self>, sim: &Simulation, event: ControlEvent) {
        let this = Arc::clone(self);
        sim.register_observer(event, move |e| {
            let call = this.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == this.n {
                panic!("injected fault at {e} #{call}");
            }
        });
    }

    /// Notifications seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
