//! Row-aligned partitioning with row barriers.
//!
//! Both constructors split the grid into whole rows, give each worker
//! `rows_per_worker` rows (the last worker takes the remainder), and
//! place a barrier checkpoint at the start of every row after the first
//! in each partition. All workers pass the same number of checkpoints
//! per sweep: a worker that runs out of tokens early drains its
//! remaining checkpoints before reporting exhaustion, so unequal
//! partitions never strand a sibling at a row barrier.
//!
//! The two constructors differ only in how they round the row share:
//!
//! | Constructor                                           | Extra row per worker when                        |
//! |-------------------------------------------------------|--------------------------------------------------|
//! | [`equal_row_sync`](RowSyncWorkProvider::equal_row_sync) | `(rpw + 1) * W < rows - min_dist`              |
//! | [`interval`](RowSyncWorkProvider::interval)             | `rows - rpw * W >= min_dist - 1`               |

use pphpc_core::{SyncError, WorkerId};

use crate::config::ConfigError;
use crate::provider::{WorkProvider, WorkToken};
use crate::sync::Barrier;

/// Row-aligned provider for the cell domain.
pub struct RowSyncWorkProvider {
    name: &'static str,
    size: usize,
    row_size: usize,
    workers: usize,
    rows_per_worker: usize,
    cells_per_worker: usize,
    barrier: Barrier,
}

// Compile-time assertion: RowSyncWorkProvider must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<RowSyncWorkProvider>();
};

impl RowSyncWorkProvider {
    /// Row-synchronized equal partitioning.
    ///
    /// Fails with [`ConfigError::TooManyWorkers`] when
    /// `workers > rows / (2 * radius + 1)`.
    pub fn equal_row_sync(
        size: usize,
        row_size: usize,
        radius: usize,
        workers: usize,
    ) -> Result<Self, ConfigError> {
        let name = "eq_rowsync";
        let (row_size, workers, rows, min_dist) = Self::check(name, size, row_size, radius, workers)?;
        let mut rows_per_worker = rows / workers;
        if rows % workers > 0 && (rows_per_worker + 1) * workers < rows.saturating_sub(min_dist) {
            rows_per_worker += 1;
        }
        Ok(Self::build(name, size, row_size, workers, rows_per_worker))
    }

    /// Interval partitioning: the sync interval is one row.
    ///
    /// Fails with [`ConfigError::TooManyWorkers`] when
    /// `workers > size / (row_size * (2 * radius + 1))`.
    pub fn interval(
        size: usize,
        row_size: usize,
        radius: usize,
        workers: usize,
    ) -> Result<Self, ConfigError> {
        let name = "interval";
        let (row_size, workers, rows, exclusion) =
            Self::check(name, size, row_size, radius, workers)?;
        let mut rows_per_worker = rows / workers;
        if rows % workers > 0 && rows - rows_per_worker * workers >= exclusion - 1 {
            rows_per_worker += 1;
        }
        Ok(Self::build(name, size, row_size, workers, rows_per_worker))
    }

    fn check(
        name: &'static str,
        size: usize,
        row_size: usize,
        radius: usize,
        workers: usize,
    ) -> Result<(usize, usize, usize, usize), ConfigError> {
        let row_size = row_size.max(1);
        let workers = workers.max(1);
        let min_dist = 2 * radius + 1;
        let rows = size / row_size;
        let max = rows / min_dist;
        if workers > max {
            return Err(ConfigError::TooManyWorkers {
                strategy: name,
                requested: workers,
                max,
            });
        }
        Ok((row_size, workers, rows, min_dist))
    }

    fn build(
        name: &'static str,
        size: usize,
        row_size: usize,
        workers: usize,
        rows_per_worker: usize,
    ) -> Self {
        Self {
            name,
            size,
            row_size,
            workers,
            rows_per_worker,
            cells_per_worker: row_size * rows_per_worker,
            barrier: Barrier::new(workers),
        }
    }

    /// Rows in every partition but (possibly) the last.
    pub fn rows_per_worker(&self) -> usize {
        self.rows_per_worker
    }

    /// Number of workers sharing the row barrier.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The half-open range owned by `worker`.
    pub fn partition(&self, worker: WorkerId) -> (usize, usize) {
        let w = worker.index();
        let start = w.saturating_mul(self.cells_per_worker).min(self.size);
        let end = if w + 1 >= self.workers {
            self.size
        } else {
            start.saturating_add(self.cells_per_worker).min(self.size)
        };
        (start, end)
    }
}

impl WorkProvider for RowSyncWorkProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn domain_size(&self) -> usize {
        self.size
    }

    fn new_work(&self, worker: WorkerId) -> WorkToken {
        let (start, end) = self.partition(worker);
        let mut token = WorkToken::range(worker, start, end);
        token.checkpoints = (1..self.rows_per_worker)
            .map(|i| start + i * self.row_size)
            .collect();
        token
    }

    fn next_token(&self, token: &mut WorkToken) -> Result<Option<usize>, SyncError> {
        if token.cursor < token.end {
            let next = token.cursor;
            if token.checkpoints.get(token.next_checkpoint) == Some(&next) {
                token.next_checkpoint += 1;
                self.barrier.wait()?;
            }
            token.cursor += 1;
            return Ok(Some(next));
        }
        while token.next_checkpoint < token.checkpoints.len() {
            token.next_checkpoint += 1;
            self.barrier.wait()?;
        }
        Ok(None)
    }

    fn reset(&self, token: &mut WorkToken) {
        token.rewind();
    }

    fn interrupt(&self) {
        self.barrier.interrupt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn sweep_concurrently(p: Arc<RowSyncWorkProvider>, sweeps: usize) -> Vec<u32> {
        let workers = p.workers();
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    let mut t = p.new_work(WorkerId(w as u32));
                    let mut seen = Vec::new();
                    for _ in 0..sweeps {
                        while let Some(i) = p.next_token(&mut t).unwrap() {
                            seen.push(i);
                        }
                        p.reset(&mut t);
                    }
                    seen
                })
            })
            .collect();
        let mut counts = vec![0u32; p.domain_size()];
        for h in handles {
            for i in h.join().unwrap() {
                counts[i] += 1;
            }
        }
        counts
    }

    #[test]
    fn too_many_workers_fails_fast() {
        // 10 rows, min distance 3 -> at most 3 workers.
        match RowSyncWorkProvider::equal_row_sync(100, 10, 1, 4) {
            Err(ConfigError::TooManyWorkers {
                strategy: "eq_rowsync",
                requested: 4,
                max: 3,
            }) => {}
            other => panic!("expected TooManyWorkers, got {:?}", other.err()),
        }
        match RowSyncWorkProvider::interval(100, 10, 1, 4) {
            Err(ConfigError::TooManyWorkers { max: 3, .. }) => {}
            other => panic!("expected TooManyWorkers, got {:?}", other.err()),
        }
    }

    #[test]
    fn partitions_are_row_aligned() {
        let p = RowSyncWorkProvider::equal_row_sync(100, 10, 1, 3).unwrap();
        assert_eq!(p.rows_per_worker(), 3);
        assert_eq!(p.partition(WorkerId(0)), (0, 30));
        assert_eq!(p.partition(WorkerId(1)), (30, 60));
        assert_eq!(p.partition(WorkerId(2)), (60, 100));
        let t = p.new_work(WorkerId(1));
        assert_eq!(t.checkpoints(), &[40, 50]);
    }

    #[test]
    fn interval_rounds_rows_up() {
        // 11 rows over 3 workers: remainder 2 >= 2 -> 4 rows each.
        let p = RowSyncWorkProvider::interval(110, 10, 1, 3).unwrap();
        assert_eq!(p.rows_per_worker(), 4);
        assert_eq!(p.partition(WorkerId(2)), (80, 110));
    }

    #[test]
    fn clamped_partition_can_be_empty() {
        // 20 rows over 6 workers rounds up to 4 rows, leaving the last empty.
        let p = RowSyncWorkProvider::interval(200, 10, 1, 6).unwrap();
        assert_eq!(p.partition(WorkerId(5)), (200, 200));
    }

    #[test]
    fn single_worker_has_no_checkpoint_contention() {
        let p = RowSyncWorkProvider::equal_row_sync(30, 10, 1, 1).unwrap();
        let mut t = p.new_work(WorkerId(0));
        let mut n = 0;
        while p.next_token(&mut t).unwrap().is_some() {
            n += 1;
        }
        assert_eq!(n, 30);
        assert_eq!(p.next_token(&mut t), Ok(None));
    }

    #[test]
    fn concurrent_sweeps_cover_each_cell_once_per_sweep() {
        let p = Arc::new(RowSyncWorkProvider::equal_row_sync(130, 10, 1, 4).unwrap());
        let counts = sweep_concurrently(p, 3);
        assert!(counts.iter().all(|&c| c == 3));
    }

    #[test]
    fn uneven_interval_partitions_do_not_deadlock() {
        let p = Arc::new(RowSyncWorkProvider::interval(200, 10, 1, 6).unwrap());
        let counts = sweep_concurrently(p, 2);
        assert!(counts.iter().all(|&c| c == 2));
    }

    #[test]
    fn interrupt_releases_row_barrier() {
        let p = Arc::new(RowSyncWorkProvider::equal_row_sync(100, 10, 1, 2).unwrap());
        let p2 = Arc::clone(&p);
        let waiter = thread::spawn(move || {
            let mut t = p2.new_work(WorkerId(0));
            loop {
                match p2.next_token(&mut t) {
                    Ok(Some(_)) => {}
                    other => return other,
                }
            }
        });
        thread::sleep(Duration::from_millis(20));
        p.interrupt();
        match waiter.join().unwrap() {
            Err(SyncError::Interrupted { .. }) => {}
            other => panic!("expected Interrupted, got {other:?}"),
        }
    }
}
