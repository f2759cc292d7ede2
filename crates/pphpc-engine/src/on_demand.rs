//! Block dispensing from a shared counter.
//!
//! Workers claim `block_size` consecutive indices at a time from one
//! atomic counter. The counter is tagged with a sweep epoch: a token's
//! epoch advances on every [`reset`](WorkProvider::reset), and the first
//! claim made with a newer epoch restarts the counter at zero. Sweeps
//! must therefore be separated by a blocking sync point, so no worker is
//! still claiming from sweep `k` when a sibling starts sweep `k + 1`.
//!
//! Every token starts at epoch 0, whenever its worker thread gets to
//! create it. Since each worker resets once per sweep, token epochs stay
//! equal to the sweep number across all workers.

use std::sync::atomic::{AtomicU64, Ordering};

use pphpc_core::{SyncError, WorkerId};

use crate::provider::{WorkProvider, WorkToken};

fn pack(epoch: u32, next: u32) -> u64 {
    (u64::from(epoch) << 32) | u64::from(next)
}

fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

/// Load-balancing provider; ordering is schedule dependent.
#[derive(Debug)]
pub struct OnDemandWorkProvider {
    size: u64,
    block_size: u64,
    state: AtomicU64,
}

impl OnDemandWorkProvider {
    /// A provider dispensing `size` tokens in blocks of `block_size`.
    ///
    /// `size` must fit in `u32`; grids are bounded well below that.
    pub fn new(size: usize, block_size: usize) -> Self {
        Self {
            size: (size as u64).min(u64::from(u32::MAX)),
            block_size: block_size.max(1) as u64,
            state: AtomicU64::new(0),
        }
    }

    /// Indices per claim.
    pub fn block_size(&self) -> usize {
        self.block_size as usize
    }

    /// Claim the next block for `epoch`, returning its first index.
    fn claim(&self, epoch: u32) -> Option<u64> {
        let claimed = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                let base = Self::base_for(s, epoch)?;
                if base >= self.size {
                    return None;
                }
                let next = (base + self.block_size).min(self.size);
                Some(pack(epoch, next as u32))
            })
            .ok()?;
        Self::base_for(claimed, epoch)
    }

    /// Where a claim made in `epoch` starts, or `None` if the counter
    /// already belongs to a later sweep.
    fn base_for(state: u64, epoch: u32) -> Option<u64> {
        let (e, next) = unpack(state);
        let behind = epoch.wrapping_sub(e);
        if behind == 0 {
            Some(u64::from(next))
        } else if behind < u32::MAX / 2 {
            Some(0)
        } else {
            None
        }
    }
}

impl WorkProvider for OnDemandWorkProvider {
    fn name(&self) -> &'static str {
        "on_demand"
    }

    fn domain_size(&self) -> usize {
        self.size as usize
    }

    fn new_work(&self, worker: WorkerId) -> WorkToken {
        WorkToken::range(worker, 0, 0)
    }

    fn next_token(&self, token: &mut WorkToken) -> Result<Option<usize>, SyncError> {
        if let Some(i) = token.next_in_range() {
            return Ok(Some(i));
        }
        match self.claim(token.epoch) {
            Some(start) => {
                let start = start as usize;
                token.start = start;
                token.end = (start as u64 + self.block_size).min(self.size) as usize;
                token.cursor = start + 1;
                Ok(Some(start))
            }
            None => Ok(None),
        }
    }

    fn reset(&self, token: &mut WorkToken) {
        token.epoch = token.epoch.wrapping_add(1);
        token.start = 0;
        token.end = 0;
        token.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn drain(p: &OnDemandWorkProvider, t: &mut WorkToken) -> Vec<usize> {
        let mut out = Vec::new();
        while let Some(i) = p.next_token(t).unwrap() {
            out.push(i);
        }
        out
    }

    #[test]
    fn one_worker_gets_everything_in_order() {
        let p = OnDemandWorkProvider::new(25, 10);
        let mut t = p.new_work(WorkerId(0));
        assert_eq!(drain(&p, &mut t), (0..25).collect::<Vec<_>>());
        assert_eq!(p.next_token(&mut t), Ok(None));
    }

    #[test]
    fn blocks_alternate_between_workers() {
        let p = OnDemandWorkProvider::new(30, 10);
        let mut a = p.new_work(WorkerId(0));
        let mut b = p.new_work(WorkerId(1));
        assert_eq!(p.next_token(&mut a), Ok(Some(0)));
        assert_eq!(p.next_token(&mut b), Ok(Some(10)));
        assert_eq!(a.end(), 10);
        assert_eq!(b.end(), 20);
    }

    #[test]
    fn reset_starts_a_new_sweep() {
        let p = OnDemandWorkProvider::new(12, 5);
        let mut a = p.new_work(WorkerId(0));
        let mut b = p.new_work(WorkerId(1));
        let mut first = drain(&p, &mut a);
        first.extend(drain(&p, &mut b));
        first.sort_unstable();
        assert_eq!(first, (0..12).collect::<Vec<_>>());

        p.reset(&mut a);
        p.reset(&mut b);
        let mut second = drain(&p, &mut b);
        second.extend(drain(&p, &mut a));
        second.sort_unstable();
        assert_eq!(second, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn stale_token_sees_exhaustion() {
        let p = OnDemandWorkProvider::new(12, 5);
        let mut old = p.new_work(WorkerId(0));
        let mut fresh = p.new_work(WorkerId(1));
        p.reset(&mut fresh);
        assert_eq!(p.next_token(&mut fresh), Ok(Some(0)));
        assert_eq!(p.next_token(&mut old), Ok(None));
    }

    #[test]
    fn late_token_joins_the_running_sweep() {
        let p = OnDemandWorkProvider::new(20, 1);
        let mut early = p.new_work(WorkerId(0));
        p.reset(&mut early);
        assert_eq!(p.next_token(&mut early), Ok(Some(0)));

        // Created after the sibling already claimed in sweep 1.
        let mut late = p.new_work(WorkerId(1));
        p.reset(&mut late);
        let mut seen = vec![0];
        loop {
            let a = p.next_token(&mut late).unwrap();
            let b = p.next_token(&mut early).unwrap();
            if a.is_none() && b.is_none() {
                break;
            }
            seen.extend(a);
            seen.extend(b);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn empty_domain_yields_nothing() {
        let p = OnDemandWorkProvider::new(0, 4);
        let mut t = p.new_work(WorkerId(0));
        assert_eq!(p.next_token(&mut t), Ok(None));
    }

    #[test]
    fn concurrent_claims_cover_domain_exactly_once() {
        let p = Arc::new(OnDemandWorkProvider::new(10_007, 13));
        let handles: Vec<_> = (0..6)
            .map(|w| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    let mut t = p.new_work(WorkerId(w));
                    drain(&p, &mut t)
                })
            })
            .collect();
        let mut seen = vec![0u8; 10_007];
        for h in handles {
            for i in h.join().unwrap() {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }
}
