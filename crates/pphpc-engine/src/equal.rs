//! Static contiguous partitioning.

use pphpc_core::{SyncError, WorkerId};

use crate::provider::{WorkProvider, WorkToken};

/// Splits `[0, N)` into `ceil(N/W)`-sized contiguous ranges.
///
/// Worker `w` owns `[w * tpw, (w + 1) * tpw)` clamped to `N`, so the last
/// range may be short and trailing workers may own nothing.
#[derive(Clone, Debug)]
pub struct EqualWorkProvider {
    size: usize,
    workers: usize,
    per_worker: usize,
}

impl EqualWorkProvider {
    /// Partition `size` tokens among `workers` workers (at least one).
    pub fn new(size: usize, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            size,
            workers,
            per_worker: size.div_ceil(workers),
        }
    }

    /// Number of workers sharing the domain.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The half-open range owned by `worker`.
    pub fn partition(&self, worker: WorkerId) -> (usize, usize) {
        let w = worker.index();
        let start = w.saturating_mul(self.per_worker).min(self.size);
        let end = (w + 1).saturating_mul(self.per_worker).min(self.size);
        (start, end)
    }
}

impl WorkProvider for EqualWorkProvider {
    fn name(&self) -> &'static str {
        "equal"
    }

    fn domain_size(&self) -> usize {
        self.size
    }

    fn new_work(&self, worker: WorkerId) -> WorkToken {
        let (start, end) = self.partition(worker);
        WorkToken::range(worker, start, end)
    }

    fn next_token(&self, token: &mut WorkToken) -> Result<Option<usize>, SyncError> {
        Ok(token.next_in_range())
    }

    fn reset(&self, token: &mut WorkToken) {
        token.rewind();
    }
}

/// The whole domain, handed to one worker.
#[derive(Clone, Debug)]
pub struct SingleThreadWorkProvider {
    size: usize,
}

impl SingleThreadWorkProvider {
    /// A provider for `size` tokens.
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl WorkProvider for SingleThreadWorkProvider {
    fn name(&self) -> &'static str {
        "st"
    }

    fn domain_size(&self) -> usize {
        self.size
    }

    fn new_work(&self, worker: WorkerId) -> WorkToken {
        WorkToken::range(worker, 0, self.size)
    }

    fn next_token(&self, token: &mut WorkToken) -> Result<Option<usize>, SyncError> {
        Ok(token.next_in_range())
    }

    fn reset(&self, token: &mut WorkToken) {
        token.rewind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drain(p: &dyn WorkProvider, t: &mut WorkToken) -> Vec<usize> {
        let mut out = Vec::new();
        while let Some(i) = p.next_token(t).unwrap() {
            out.push(i);
        }
        out
    }

    #[test]
    fn ten_over_four_workers() {
        let p = EqualWorkProvider::new(10, 4);
        let ranges: Vec<_> = (0..4).map(|w| p.partition(WorkerId(w))).collect();
        assert_eq!(ranges, [(0, 3), (3, 6), (6, 9), (9, 10)]);
    }

    #[test]
    fn trailing_workers_may_be_empty() {
        let p = EqualWorkProvider::new(3, 4);
        assert_eq!(p.partition(WorkerId(3)), (3, 3));
        let mut t = p.new_work(WorkerId(3));
        assert_eq!(p.next_token(&mut t), Ok(None));
    }

    #[test]
    fn reset_replays_the_same_range() {
        let p = EqualWorkProvider::new(20, 3);
        let mut t = p.new_work(WorkerId(1));
        let first = drain(&p, &mut t);
        assert_eq!(p.next_token(&mut t), Ok(None));
        p.reset(&mut t);
        assert_eq!(drain(&p, &mut t), first);
    }

    #[test]
    fn single_thread_covers_everything() {
        let p = SingleThreadWorkProvider::new(6);
        let mut t = p.new_work(WorkerId(0));
        assert_eq!(drain(&p, &mut t), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(p.next_token(&mut t), Ok(None));
    }

    proptest! {
        #[test]
        fn ranges_are_disjoint_and_cover(n in 0usize..5000, w in 1usize..64) {
            let p = EqualWorkProvider::new(n, w);
            let mut seen = vec![0u8; n];
            for worker in 0..w {
                let mut t = p.new_work(WorkerId(worker as u32));
                for i in drain(&p, &mut t) {
                    seen[i] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1));
        }
    }
}
