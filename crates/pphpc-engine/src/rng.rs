//! Random streams handed to workers.
//!
//! Algorithm choice is policy ([`RngKind`]); the engine only needs a
//! [`RandomStream`] per worker, created from the seed generator's byte
//! seeds. In repeatable mode the stream is instead rekeyed for every
//! (phase, iteration, token) triple so that the draws a cell sees do not
//! depend on which worker processes it.

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::{ChaCha12Rng, ChaCha20Rng, ChaCha8Rng};

use pphpc_core::WorkerId;

use crate::hash::{fnv1a_u32, fnv1a_u64, FNV_OFFSET};
use crate::seed::SeedGenerator;

/// Random stream algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RngKind {
    /// ChaCha with 8 rounds.
    #[default]
    ChaCha8,
    /// ChaCha with 12 rounds.
    ChaCha12,
    /// ChaCha with 20 rounds.
    ChaCha20,
}

impl RngKind {
    /// Every supported kind.
    pub const ALL: [RngKind; 3] = [Self::ChaCha8, Self::ChaCha12, Self::ChaCha20];

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ChaCha8 => "chacha8",
            Self::ChaCha12 => "chacha12",
            Self::ChaCha20 => "chacha20",
        }
    }
}

/// A worker's random stream.
#[derive(Clone, Debug)]
pub enum RandomStream {
    /// ChaCha8 stream.
    ChaCha8(ChaCha8Rng),
    /// ChaCha12 stream.
    ChaCha12(ChaCha12Rng),
    /// ChaCha20 stream.
    ChaCha20(ChaCha20Rng),
}

impl RandomStream {
    /// A stream of `kind` seeded with 32 seed bytes.
    pub fn from_seed(kind: RngKind, seed: [u8; 32]) -> Self {
        match kind {
            RngKind::ChaCha8 => Self::ChaCha8(ChaCha8Rng::from_seed(seed)),
            RngKind::ChaCha12 => Self::ChaCha12(ChaCha12Rng::from_seed(seed)),
            RngKind::ChaCha20 => Self::ChaCha20(ChaCha20Rng::from_seed(seed)),
        }
    }

    /// A stream of `kind` seeded from a 64-bit key.
    pub fn from_key(kind: RngKind, key: u64) -> Self {
        match kind {
            RngKind::ChaCha8 => Self::ChaCha8(ChaCha8Rng::seed_from_u64(key)),
            RngKind::ChaCha12 => Self::ChaCha12(ChaCha12Rng::seed_from_u64(key)),
            RngKind::ChaCha20 => Self::ChaCha20(ChaCha20Rng::seed_from_u64(key)),
        }
    }
}

impl RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        match self {
            Self::ChaCha8(r) => r.next_u32(),
            Self::ChaCha12(r) => r.next_u32(),
            Self::ChaCha20(r) => r.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            Self::ChaCha8(r) => r.next_u64(),
            Self::ChaCha12(r) => r.next_u64(),
            Self::ChaCha20(r) => r.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            Self::ChaCha8(r) => r.fill_bytes(dest),
            Self::ChaCha12(r) => r.fill_bytes(dest),
            Self::ChaCha20(r) => r.fill_bytes(dest),
        }
    }
}

/// The phase a keyed stream is drawn for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamPhase {
    /// Initial grass state.
    InitCells,
    /// Initial sheep placement.
    InitSheep,
    /// Initial wolf placement.
    InitWolves,
    /// Agent movement.
    Move,
    /// Agent actions.
    Act,
}

impl StreamPhase {
    fn tag(self) -> u32 {
        match self {
            Self::InitCells => 1,
            Self::InitSheep => 2,
            Self::InitWolves => 3,
            Self::Move => 4,
            Self::Act => 5,
        }
    }
}

/// Creates worker and token streams for one run.
#[derive(Clone, Debug)]
pub struct RngFactory {
    kind: RngKind,
    seeds: SeedGenerator,
    root: u64,
}

impl RngFactory {
    /// A factory for `kind` rooted at `seed`.
    pub fn new(kind: RngKind, seed: u128) -> Self {
        let seeds = SeedGenerator::new(seed);
        Self {
            kind,
            seeds,
            root: seeds.root(),
        }
    }

    /// The stream algorithm.
    pub fn kind(&self) -> RngKind {
        self.kind
    }

    /// The persistent stream for `worker`.
    pub fn create_rng(&self, worker: WorkerId) -> RandomStream {
        RandomStream::from_seed(self.kind, self.seeds.seed32(worker))
    }

    /// The stream for one token in one phase of one iteration.
    pub fn token_rng(&self, phase: StreamPhase, iteration: u32, token: usize) -> RandomStream {
        RandomStream::from_key(self.kind, self.token_key(phase, iteration, token))
    }

    fn token_key(&self, phase: StreamPhase, iteration: u32, token: usize) -> u64 {
        let mut h = fnv1a_u64(FNV_OFFSET, self.root);
        h = fnv1a_u32(h, phase.tag());
        h = fnv1a_u32(h, iteration);
        fnv1a_u64(h, token as u64)
    }
}
