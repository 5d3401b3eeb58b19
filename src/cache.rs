//! Sharded cache and its background sweeper.
//!
//! ## Architecture
//!
//! ```text
//!   set / get / del (key)
//!         │
//!         │ hash = hasher.sum64(key)
//!         ▼
//!   shards[hash & shard_mask] ──► Mutex<Segment>
//!                                   │  one exclusive lock per shard;
//!                                   ▼  other shards stay uncontended
//!                                 Segment { slots, index, free list }
//!
//!   sweeper thread: every interval, lock shards 0..n one at a time,
//!   clean(now), release before moving on. A sweep pass never stalls
//!   more than one shard and cannot deadlock across shards.
//! ```
//!
//! ## Key Concepts
//!
//! - **Routing**: the key's 64-bit hash, masked by `shard_count - 1`,
//!   selects exactly one shard. The full hash doubles as the per-shard
//!   index key.
//! - **Locking**: every segment call (read or write) runs under that
//!   shard's exclusive lock; calls on different shards never block each
//!   other.
//! - **Teardown**: [`Cache::close`] sends the sweeper a one-shot stop
//!   signal and joins it; `Drop` does the same, so a cache handle never
//!   leaks its thread.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::hash::KeyHasher;
use crate::metrics::{CacheCounters, CacheMetricsSnapshot};
use crate::segment::{unix_now, Segment};

/// State shared between the cache handle and the sweeper thread.
struct Shared {
    hasher: Box<dyn KeyHasher>,
    shard_mask: u64,
    shards: Box<[Mutex<Segment>]>,
    default_ttl: Option<Duration>,
    counters: CacheCounters,
}

/// Sharded slab cache handle.
///
/// Built via [`CacheBuilder`](crate::builder::CacheBuilder). All
/// operations are `&self` and safe to call from many threads; the handle
/// owns the sweeper thread and stops it on [`close`](Cache::close) or
/// drop.
pub struct Cache {
    shared: Arc<Shared>,
    sweeper: Option<Sweeper>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("shards", &self.shared.shards.len())
            .field("sweeper", &self.sweeper.is_some())
            .finish()
    }
}

impl Cache {
    /// Allocates the shards and, when enabled, starts the sweeper.
    ///
    /// `shard_count` has been validated as a power of two by the builder.
    pub(crate) fn start(
        hasher: Box<dyn KeyHasher>,
        shard_count: u64,
        max_bytes: u64,
        default_ttl: Option<Duration>,
        sweep_interval: Duration,
        sweep_enabled: bool,
    ) -> Self {
        let shard_bytes = max_bytes.div_ceil(shard_count);
        let shards: Vec<Mutex<Segment>> = (0..shard_count)
            .map(|_| Mutex::new(Segment::new(shard_bytes)))
            .collect();
        let shared = Arc::new(Shared {
            hasher,
            shard_mask: shard_count - 1,
            shards: shards.into_boxed_slice(),
            default_ttl,
            counters: CacheCounters::default(),
        });
        let sweeper =
            sweep_enabled.then(|| Sweeper::start(Arc::clone(&shared), sweep_interval));
        Self { shared, sweeper }
    }

    /// Stores `value` under `key`, stamped with the configured TTL.
    ///
    /// Fails only when the addressed shard has no reclaimable slot
    /// ([`CacheError::CacheFull`]) or the key exceeds the encodable
    /// length ([`CacheError::KeyTooLarge`]).
    pub fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let (hash, shard) = self.route(key);
        let result = shard.lock().set(key, hash, value, self.shared.default_ttl);
        if result.is_ok() {
            self.shared.counters.inc_insert();
        }
        result
    }

    /// Fetches the value stored under `key`.
    ///
    /// [`EntryNotFound`](CacheError::EntryNotFound) and
    /// [`KeyMismatch`](CacheError::KeyMismatch) are ordinary misses.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let (hash, shard) = self.route(key);
        let result = shard.lock().get(key, hash);
        match &result {
            Ok(_) => self.shared.counters.inc_hit(),
            Err(_) => self.shared.counters.inc_miss(),
        }
        result
    }

    /// Removes `key`. Removing an absent key succeeds.
    pub fn del(&self, key: &str) -> Result<(), CacheError> {
        let (hash, shard) = self.route(key);
        shard.lock().del(hash);
        self.shared.counters.inc_remove();
        Ok(())
    }

    /// Total live entries, summed shard by shard.
    ///
    /// Each count is read under its own shard lock only; no global lock is
    /// taken, so the total is approximately consistent under concurrent
    /// mutation.
    pub fn len(&self) -> usize {
        self.shared
            .shards
            .iter()
            .map(|shard| shard.lock().len())
            .sum()
    }

    /// Returns `true` if no shard holds a live entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the operation counters.
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.shared.counters.snapshot()
    }

    /// Stops the background sweeper and waits for it to exit.
    ///
    /// Safe to call more than once; the sweeper is not restartable.
    pub fn close(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
    }

    fn route(&self, key: &str) -> (u64, &Mutex<Segment>) {
        let hash = self.shared.hasher.sum64(key);
        let shard = &self.shared.shards[(hash & self.shared.shard_mask) as usize];
        (hash, shard)
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Sweeper
// ---------------------------------------------------------------------------

/// Handle to the periodic expiry thread.
struct Sweeper {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl Sweeper {
    fn start(shared: Arc<Shared>, interval: Duration) -> Self {
        let (stop, signal) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("slabcache-sweeper".into())
            .spawn(move || sweep_loop(&shared, interval, &signal))
            .expect("failed to spawn sweeper thread");
        Self { stop, thread }
    }

    /// Wakes the loop out of its interval wait, then joins so no sweep
    /// outlives the cache handle.
    fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.thread.join();
    }
}

/// Periodic pass over all shards, holding one shard lock at a time.
fn sweep_loop(shared: &Shared, interval: Duration, stop: &Receiver<()>) {
    log::debug!("sweeper started, interval {interval:?}");
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let now = unix_now();
                let mut removed = 0;
                for shard in shared.shards.iter() {
                    removed += shard.lock().clean(now);
                }
                if removed > 0 {
                    shared.counters.add_expirations(removed as u64);
                    log::debug!("sweep removed {removed} expired entries");
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                log::debug!("sweeper stopped");
                return;
            }
        }
    }
}
