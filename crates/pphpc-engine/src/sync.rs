//! Barrier and sync-point primitives.
//!
//! [`Barrier`] is a cyclic, interruptible counting barrier: the last of
//! `parties` arrivals runs a release hook, then every waiter proceeds.
//! [`SyncPoint`] attaches a [`ControlEvent`] and an observer list to one
//! of two behaviors:
//!
//! - **Blocking**: a [`Barrier`] whose release hook notifies observers.
//! - **Non-blocking**: an atomic countdown; the arrival that reaches
//!   zero notifies observers and re-arms the counter, and nobody waits.
//!
//! ```text
//! Armed(count = W) --arrivals--> Fired(observers once) --> Armed(count = W)
//!        \                                                    /
//!         `------------- stop_now() --> Interrupted <--------'
//! ```
//!
//! Once interrupted, every blocked and every future arrival fails with
//! [`SyncError::Interrupted`].

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

use pphpc_core::{ControlEvent, SyncError};

/// A callback run once per sync-point generation.
///
/// Observers run on the thread whose arrival completed the generation,
/// serially, in registration order. They must not register further
/// observers on the same sync point.
pub type Observer = Box<dyn Fn(ControlEvent) + Send + Sync>;

// ── Barrier ────────────────────────────────────────────────────────

struct BarrierState {
    arrived: usize,
    generation: u64,
    interrupted: bool,
}

/// Cyclic counting barrier that can be interrupted.
pub struct Barrier {
    parties: usize,
    event: Option<ControlEvent>,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

// Compile-time assertion: Barrier must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Barrier>();
};

impl Barrier {
    /// A barrier for `parties` arrivals (at least one).
    pub fn new(parties: usize) -> Self {
        Self::with_event(parties, None)
    }

    fn with_event(parties: usize, event: Option<ControlEvent>) -> Self {
        Self {
            parties: parties.max(1),
            event,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                interrupted: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Number of arrivals per generation.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Arrive and wait for the generation to complete.
    ///
    /// Returns `Ok(true)` on the arrival that completed the generation.
    pub fn wait(&self) -> Result<bool, SyncError> {
        self.wait_then(|| {})
    }

    /// Arrive and wait; the completing arrival runs `on_release` before
    /// anyone is released.
    ///
    /// The hook runs outside the internal lock, so it may call
    /// [`interrupt`](Self::interrupt) on this barrier.
    pub fn wait_then(&self, on_release: impl FnOnce()) -> Result<bool, SyncError> {
        let mut st = self.state.lock().map_err(|_| SyncError::Poisoned)?;
        if st.interrupted {
            return Err(self.interrupted());
        }
        st.arrived += 1;
        let generation = st.generation;

        if st.arrived == self.parties {
            drop(st);
            on_release();
            let mut st = self.state.lock().map_err(|_| SyncError::Poisoned)?;
            st.arrived = 0;
            st.generation = generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(true);
        }

        while st.generation == generation && !st.interrupted {
            st = self.cvar.wait(st).map_err(|_| SyncError::Poisoned)?;
        }
        if st.generation != generation {
            Ok(false)
        } else {
            Err(self.interrupted())
        }
    }

    /// Fail every current and future arrival with [`SyncError::Interrupted`].
    pub fn interrupt(&self) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.interrupted = true;
        self.cvar.notify_all();
    }

    /// Whether [`interrupt`](Self::interrupt) has been called.
    pub fn is_interrupted(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .interrupted
    }

    /// Number of completed generations.
    pub fn generation(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    fn interrupted(&self) -> SyncError {
        SyncError::Interrupted { event: self.event }
    }
}

// ── Observers ──────────────────────────────────────────────────────

#[derive(Default)]
struct ObserverList {
    observers: Mutex<Vec<Observer>>,
}

impl ObserverList {
    fn register(&self, observer: Observer) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    fn notify(&self, event: ControlEvent) {
        let observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer(event);
        }
    }
}

// ── BlockingSyncPoint ──────────────────────────────────────────────

/// Sync point where every worker waits for all `W` arrivals.
pub struct BlockingSyncPoint {
    event: ControlEvent,
    barrier: Barrier,
    observers: ObserverList,
}

impl BlockingSyncPoint {
    /// A blocking sync point for `parties` workers.
    pub fn new(event: ControlEvent, parties: usize) -> Self {
        Self {
            event,
            barrier: Barrier::with_event(parties, Some(event)),
            observers: ObserverList::default(),
        }
    }

    fn sync_notify(&self) -> Result<(), SyncError> {
        self.barrier
            .wait_then(|| self.observers.notify(self.event))
            .map(|_| ())
    }
}

// ── NonBlockingSyncPoint ───────────────────────────────────────────

/// Sync point where arrivals count down without waiting.
pub struct NonBlockingSyncPoint {
    event: ControlEvent,
    parties: usize,
    remaining: AtomicUsize,
    generation: AtomicU64,
    interrupted: AtomicBool,
    observers: ObserverList,
}

impl NonBlockingSyncPoint {
    /// A non-blocking sync point for `parties` workers.
    pub fn new(event: ControlEvent, parties: usize) -> Self {
        let parties = parties.max(1);
        Self {
            event,
            parties,
            remaining: AtomicUsize::new(parties),
            generation: AtomicU64::new(0),
            interrupted: AtomicBool::new(false),
            observers: ObserverList::default(),
        }
    }

    fn sync_notify(&self) -> Result<(), SyncError> {
        if self.interrupted.load(Ordering::Acquire) {
            return Err(SyncError::Interrupted {
                event: Some(self.event),
            });
        }
        // Decrement and re-arm in one atomic step so a fast worker's next
        // arrival can never observe the exhausted counter.
        let parties = self.parties;
        let prev = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                Some(if c <= 1 { parties } else { c - 1 })
            })
            .unwrap_or_else(|c| c);
        if prev <= 1 {
            self.generation.fetch_add(1, Ordering::Release);
            self.observers.notify(self.event);
        }
        Ok(())
    }
}

// ── SyncPoint ──────────────────────────────────────────────────────

/// Whether a sync point makes arrivals wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Rendezvous of all workers.
    Blocking,
    /// Countdown without waiting.
    NonBlocking,
}

/// A sync point bound to one control event.
pub enum SyncPoint {
    /// See [`BlockingSyncPoint`].
    Blocking(BlockingSyncPoint),
    /// See [`NonBlockingSyncPoint`].
    NonBlocking(NonBlockingSyncPoint),
}

// Compile-time assertion: SyncPoint must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SyncPoint>();
};

impl SyncPoint {
    /// A sync point of `mode` for `parties` workers.
    pub fn new(mode: SyncMode, event: ControlEvent, parties: usize) -> Self {
        match mode {
            SyncMode::Blocking => Self::Blocking(BlockingSyncPoint::new(event, parties)),
            SyncMode::NonBlocking => Self::NonBlocking(NonBlockingSyncPoint::new(event, parties)),
        }
    }

    /// The event this sync point belongs to.
    pub fn event(&self) -> ControlEvent {
        match self {
            Self::Blocking(s) => s.event,
            Self::NonBlocking(s) => s.event,
        }
    }

    /// Blocking or non-blocking.
    pub fn mode(&self) -> SyncMode {
        match self {
            Self::Blocking(_) => SyncMode::Blocking,
            Self::NonBlocking(_) => SyncMode::NonBlocking,
        }
    }

    /// Declare this worker's arrival.
    pub fn sync_notify(&self) -> Result<(), SyncError> {
        match self {
            Self::Blocking(s) => s.sync_notify(),
            Self::NonBlocking(s) => s.sync_notify(),
        }
    }

    /// Add an observer fired once per generation.
    pub fn register_observer(&self, observer: Observer) {
        match self {
            Self::Blocking(s) => s.observers.register(observer),
            Self::NonBlocking(s) => s.observers.register(observer),
        }
    }

    /// Interrupt this sync point; see the module docs.
    pub fn stop_now(&self) {
        match self {
            Self::Blocking(s) => s.barrier.interrupt(),
            Self::NonBlocking(s) => s.interrupted.store(true, Ordering::Release),
        }
    }

    /// Whether [`stop_now`](Self::stop_now) has been called.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Blocking(s) => s.barrier.is_interrupted(),
            Self::NonBlocking(s) => s.interrupted.load(Ordering::Acquire),
        }
    }

    /// Number of completed generations.
    pub fn generation(&self) -> u64 {
        match self {
            Self::Blocking(s) => s.barrier.generation(),
            Self::NonBlocking(s) => s.generation.load(Ordering::Acquire),
        }
    }
}
