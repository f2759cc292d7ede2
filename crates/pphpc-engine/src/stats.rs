//! Shared per-iteration statistics.
//!
//! [`GlobalStats`] holds one row of atomic counters per iteration
//! `0..=iters`. Workers push partial [`IterationStats`] with
//! [`update`](GlobalStats::update); addition commutes, so totals do not
//! depend on update order. A row is complete once the sync point that
//! follows its updates has released.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use pphpc_core::{IterationStats, SimError};

use crate::hash::{fnv1a_u64, FNV_OFFSET};

#[derive(Default)]
struct StatsRow {
    sheep: AtomicU64,
    wolves: AtomicU64,
    grass: AtomicU64,
    sheep_energy: AtomicU64,
    wolves_energy: AtomicU64,
    grass_countdown: AtomicU64,
}

/// Totals for every iteration of one run.
pub struct GlobalStats {
    rows: Vec<StatsRow>,
}

// Compile-time assertion: GlobalStats must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<GlobalStats>();
};

impl GlobalStats {
    /// Zeroed rows for iterations `0..=iters`.
    pub fn new(iters: u32) -> Self {
        Self {
            rows: (0..=iters as usize).map(|_| StatsRow::default()).collect(),
        }
    }

    /// The last iteration with a row.
    pub fn iters(&self) -> u32 {
        (self.rows.len() - 1) as u32
    }

    fn row(&self, iteration: u32) -> Result<&StatsRow, SimError> {
        self.rows
            .get(iteration as usize)
            .ok_or(SimError::IterationOutOfRange {
                iteration,
                max: self.iters(),
            })
    }

    /// Add a worker's partial counts into `iteration`'s totals.
    pub fn update(&self, iteration: u32, partial: &IterationStats) -> Result<(), SimError> {
        let row = self.row(iteration)?;
        row.sheep.fetch_add(partial.sheep, Ordering::Relaxed);
        row.wolves.fetch_add(partial.wolves, Ordering::Relaxed);
        row.grass.fetch_add(partial.grass, Ordering::Relaxed);
        row.sheep_energy
            .fetch_add(partial.sheep_energy, Ordering::Relaxed);
        row.wolves_energy
            .fetch_add(partial.wolves_energy, Ordering::Relaxed);
        row.grass_countdown
            .fetch_add(partial.grass_countdown, Ordering::Relaxed);
        Ok(())
    }

    /// The totals of `iteration`.
    pub fn read(&self, iteration: u32) -> Result<IterationStats, SimError> {
        let row = self.row(iteration)?;
        Ok(IterationStats {
            sheep: row.sheep.load(Ordering::Relaxed),
            wolves: row.wolves.load(Ordering::Relaxed),
            grass: row.grass.load(Ordering::Relaxed),
            sheep_energy: row.sheep_energy.load(Ordering::Relaxed),
            wolves_energy: row.wolves_energy.load(Ordering::Relaxed),
            grass_countdown: row.grass_countdown.load(Ordering::Relaxed),
        })
    }

    /// `(sheep, wolves, grass)` of `iteration`.
    pub fn counts(&self, iteration: u32) -> Result<(u64, u64, u64), SimError> {
        let s = self.read(iteration)?;
        Ok((s.sheep, s.wolves, s.grass))
    }

    /// Every row, in iteration order.
    pub fn snapshot(&self) -> Vec<IterationStats> {
        (0..=self.iters())
            .filter_map(|i| self.read(i).ok())
            .collect()
    }

    /// FNV-1a hash over every counter of every row.
    ///
    /// Two runs with the same fingerprint produced the same statistics.
    pub fn fingerprint(&self) -> u64 {
        self.snapshot().iter().fold(FNV_OFFSET, |h, s| {
            [
                s.sheep,
                s.wolves,
                s.grass,
                s.sheep_energy,
                s.wolves_energy,
                s.grass_countdown,
            ]
            .iter()
            .fold(h, |h, &v| fnv1a_u64(h, v))
        })
    }
}

/// Write `sheep\twolves\tgrass` lines for iterations `0..=iters`.
pub fn write_stats<W: Write>(stats: &GlobalStats, mut out: W) -> io::Result<()> {
    for s in stats.snapshot() {
        writeln!(out, "{}\t{}\t{}", s.sheep, s.wolves, s.grass)?;
    }
    out.flush()
}
