//! The work-provider seam.
//!
//! A [`WorkProvider`] hands out the indices (tokens) of one work domain
//! to the workers. Each worker owns a [`WorkToken`] describing its
//! position; the provider itself is shared by every worker.

use pphpc_core::{SyncError, WorkerId};

/// A worker's cursor into one work domain.
///
/// Created by [`WorkProvider::new_work`]; only the provider that created
/// it interprets the fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkToken {
    pub(crate) worker: WorkerId,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) cursor: usize,
    pub(crate) checkpoints: Vec<usize>,
    pub(crate) next_checkpoint: usize,
    pub(crate) epoch: u32,
}

impl WorkToken {
    pub(crate) fn range(worker: WorkerId, start: usize, end: usize) -> Self {
        Self {
            worker,
            start,
            end,
            cursor: start,
            checkpoints: Vec::new(),
            next_checkpoint: 0,
            epoch: 0,
        }
    }

    /// The worker this token belongs to.
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// First index of the worker's static partition.
    ///
    /// For on-demand providers this is the start of the most recently
    /// claimed block.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last index of the worker's static partition.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Next index to be handed out, if the partition is not exhausted.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Row barriers this token will pass in one sweep of its partition.
    pub fn checkpoints(&self) -> &[usize] {
        &self.checkpoints
    }

    pub(crate) fn next_in_range(&mut self) -> Option<usize> {
        if self.cursor < self.end {
            let token = self.cursor;
            self.cursor += 1;
            Some(token)
        } else {
            None
        }
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = self.start;
        self.next_checkpoint = 0;
    }
}

/// Dispenses the tokens of one work domain among `W` workers.
///
/// # Contract
///
/// - Within one sweep (from [`new_work`](Self::new_work) or
///   [`reset`](Self::reset) until `next_token` returns `None`), every
///   index in `[0, domain_size)` is handed to exactly one worker, once.
/// - After exhaustion, `next_token` keeps returning `Ok(None)`.
/// - A provider may block inside `next_token` (row barriers); such
///   waits fail with [`SyncError::Interrupted`] after
///   [`interrupt`](Self::interrupt).
pub trait WorkProvider: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Number of tokens in the domain.
    fn domain_size(&self) -> usize;

    /// A fresh cursor for `worker`.
    fn new_work(&self, worker: WorkerId) -> WorkToken;

    /// The next index for this token, or `None` when exhausted.
    fn next_token(&self, token: &mut WorkToken) -> Result<Option<usize>, SyncError>;

    /// Rewind the token so the domain can be swept again in a later phase.
    fn reset(&self, token: &mut WorkToken);

    /// Release any worker blocked inside [`next_token`](Self::next_token).
    fn interrupt(&self) {}
}
