//! Per-worker seed derivation.
//!
//! A single base seed fans out into independent byte seeds, one per
//! worker. The derivation is a pure function of `(base_seed, worker_id)`:
//!
//! 1. The base seed is written big-endian into the low 16 bytes of a
//!    32-byte key.
//! 2. For workers other than 0, the SHA-256 of the worker id's decimal
//!    string is XORed into the key.
//! 3. The key is expanded to the requested length in counter mode:
//!    `SHA-256(key || 0u32) || SHA-256(key || 1u32) || ...`.

use pphpc_core::WorkerId;
use sha2::{Digest, Sha256};

/// Derives reproducible per-worker seeds from one base seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedGenerator {
    base: u128,
}

impl SeedGenerator {
    /// A generator for `base`.
    pub fn new(base: u128) -> Self {
        Self { base }
    }

    /// The base seed.
    pub fn base(&self) -> u128 {
        self.base
    }

    /// `len` seed bytes for `worker`. See [`generate`].
    pub fn generate(&self, worker: WorkerId, len: usize) -> Vec<u8> {
        generate(self.base, worker, len)
    }

    /// A 32-byte seed for `worker`, the size ChaCha streams take.
    pub fn seed32(&self, worker: WorkerId) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.generate(worker, 32));
        out
    }

    /// A 64-bit root derived from worker 0's seed. Keys the per-token
    /// streams used in repeatable mode.
    pub fn root(&self) -> u64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.generate(WorkerId(0), 8));
        u64::from_be_bytes(b)
    }
}

/// Derive `len` seed bytes for `worker` from `base_seed`.
///
/// Deterministic: the same inputs always yield the same bytes. Distinct
/// worker ids yield unrelated byte strings.
pub fn generate(base_seed: u128, worker: WorkerId, len: usize) -> Vec<u8> {
    let mut key = [0u8; 32];
    key[16..].copy_from_slice(&base_seed.to_be_bytes());
    if worker.0 != 0 {
        let scramble = Sha256::digest(worker.0.to_string().as_bytes());
        for (k, s) in key.iter_mut().zip(scramble.iter()) {
            *k ^= s;
        }
    }

    let mut out = Vec::with_capacity(len.next_multiple_of(32));
    let mut block: u32 = 0;
    while out.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(block.to_be_bytes());
        out.extend_from_slice(&hasher.finalize());
        block = block.wrapping_add(1);
    }
    out.truncate(len);
    out
}
