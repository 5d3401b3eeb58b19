//! Pluggable 64-bit string hashing.
//!
//! The cache uses one hash value per key twice: masked to pick a shard,
//! and stored whole as the de-duplication key inside that shard. Both
//! roles need the same property: deterministic output for the lifetime
//! of the hasher instance.
//!
//! ## Key Components
//!
//! - [`KeyHasher`]: single-method capability injected at construction.
//! - [`Fnv64a`]: the default. Pure FNV-1a, identical output across
//!   process runs, no secret state.
//! - [`Djb33`]: djb2-style ×33 hash with a per-instance random seed, for
//!   hosts whose keys may be adversarially chosen to collide.

use rand::rngs::OsRng;
use rand::RngCore;

/// Capability for hashing a string key to 64 bits.
///
/// Implementations must be deterministic for a given instance: the cache
/// relies on the same key always reaching the same shard and the same
/// index entry.
pub trait KeyHasher: Send + Sync {
    /// Hashes `key` to a 64-bit value.
    fn sum64(&self, key: &str) -> u64;
}

// ---------------------------------------------------------------------------
// Fnv64a
// ---------------------------------------------------------------------------

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// FNV-1a 64-bit string hash.
///
/// Deterministic across processes and inputs; use when routing must be
/// reproducible (tests, sharded workloads that assume stable placement).
#[derive(Debug, Default, Clone, Copy)]
pub struct Fnv64a;

impl KeyHasher for Fnv64a {
    fn sum64(&self, key: &str) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for byte in key.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

// ---------------------------------------------------------------------------
// Djb33
// ---------------------------------------------------------------------------

/// djb2-style ×33 hash with a per-instance seed.
///
/// The seed is drawn once from the OS CSPRNG so an attacker cannot
/// precompute colliding keys; it stays fixed for the instance lifetime,
/// keeping routing deterministic within one cache.
#[derive(Debug, Clone, Copy)]
pub struct Djb33 {
    seed: u64,
}

impl Djb33 {
    /// Creates a hasher seeded from the OS CSPRNG.
    ///
    /// If the CSPRNG is unavailable this logs a warning and falls back to
    /// a clock-derived seed, which is weaker but keeps the cache usable.
    pub fn new() -> Self {
        let mut raw = [0u8; 8];
        let seed = match OsRng.try_fill_bytes(&mut raw) {
            Ok(()) => u64::from_le_bytes(raw),
            Err(err) => {
                log::warn!(
                    "OS CSPRNG unavailable ({err}); seeding Djb33 from the system clock"
                );
                clock_seed()
            }
        };
        Self { seed }
    }

    /// Creates a hasher with a caller-supplied seed.
    ///
    /// Intended for tests and hosts that need reproducible routing.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for Djb33 {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHasher for Djb33 {
    fn sum64(&self, key: &str) -> u64 {
        let bytes = key.as_bytes();
        let mut d = 5381u64
            .wrapping_add(self.seed)
            .wrapping_add(bytes.len() as u64);
        for &byte in bytes {
            d = d.wrapping_mul(33) ^ u64::from(byte);
        }
        d ^ (d >> 16)
    }
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() ^ u64::from(elapsed.subsec_nanos()))
}
