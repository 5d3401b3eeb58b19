//! Operation counters for the sharded cache.
//!
//! Counters are relaxed atomics so foreground calls pay one `fetch_add`;
//! [`CacheMetricsSnapshot`] copies them into a plain struct for the host
//! to export however it likes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    /// Successful lookups.
    pub hits: u64,
    /// Lookups that missed, including collision mismatches.
    pub misses: u64,
    /// Entries written via `set`.
    pub inserts: u64,
    /// Explicit removals via `del`.
    pub removes: u64,
    /// Entries reclaimed by the background sweeper.
    pub expirations: u64,
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    removes: AtomicU64,
    expirations: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let counters = CacheCounters::default();
        counters.inc_hit();
        counters.inc_hit();
        counters.inc_miss();
        counters.inc_insert();
        counters.inc_remove();
        counters.add_expirations(3);

        let snap = counters.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.inserts, 1);
        assert_eq!(snap.removes, 1);
        assert_eq!(snap.expirations, 3);
    }

    #[test]
    fn default_snapshot_is_zeroed() {
        let counters = CacheCounters::default();
        assert_eq!(counters.snapshot(), CacheMetricsSnapshot::default());
    }
}
