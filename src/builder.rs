//! Cache construction.
//!
//! [`CacheBuilder`] collects the tunables (shard count, byte budget,
//! hash function, sweep interval, default TTL), validates them once, and
//! produces a running [`Cache`]. The configuration is consumed by
//! `build()` and never mutated afterward.
//!
//! ## Example
//!
//! ```rust
//! use slabcache::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .shard_count(64)
//!     .max_bytes(64 * 1024 * 1024)
//!     .sweep_enabled(false)
//!     .build()
//!     .unwrap();
//!
//! cache.set("greeting", b"hello").unwrap();
//! assert_eq!(cache.get("greeting").unwrap(), b"hello");
//! ```

use std::time::Duration;

use crate::cache::Cache;
use crate::error::ConfigError;
use crate::hash::{Fnv64a, KeyHasher};

/// Default number of shards.
pub const DEFAULT_SHARD_COUNT: u64 = 256;
/// Default total slot budget in bytes (512 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 512 * 1024 * 1024;
/// Default interval between sweep passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);
/// Default TTL stamped on entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Builder for [`Cache`] instances.
pub struct CacheBuilder {
    hasher: Box<dyn KeyHasher>,
    shard_count: u64,
    max_bytes: u64,
    sweep_interval: Duration,
    sweep_enabled: bool,
    default_ttl: Option<Duration>,
}

impl CacheBuilder {
    /// Starts from the defaults: 256 shards, 512 MiB, [`Fnv64a`], a
    /// 10-minute sweep interval with sweeping enabled, 10-minute TTL.
    pub fn new() -> Self {
        Self {
            hasher: Box::new(Fnv64a),
            shard_count: DEFAULT_SHARD_COUNT,
            max_bytes: DEFAULT_MAX_BYTES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_enabled: true,
            default_ttl: Some(DEFAULT_TTL),
        }
    }

    /// Number of shards; must be a power of two.
    pub fn shard_count(mut self, count: u64) -> Self {
        self.shard_count = count;
        self
    }

    /// Total slot budget in bytes, divided evenly across shards.
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Hash function used for shard routing and per-shard keying.
    pub fn hasher(mut self, hasher: impl KeyHasher + 'static) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    /// Interval between background sweep passes.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Enables or disables the background sweeper.
    pub fn sweep_enabled(mut self, enabled: bool) -> Self {
        self.sweep_enabled = enabled;
        self
    }

    /// TTL stamped on every entry; `None` writes non-expiring entries.
    pub fn default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Validates the configuration and starts the cache.
    pub fn build(self) -> Result<Cache, ConfigError> {
        if !self.shard_count.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "shard count must be a power of two, got {}",
                self.shard_count
            )));
        }
        if self.sweep_enabled && self.sweep_interval.is_zero() {
            return Err(ConfigError::new(
                "sweep interval must be nonzero when sweeping is enabled",
            ));
        }
        Ok(Cache::start(
            self.hasher,
            self.shard_count,
            self.max_bytes,
            self.default_ttl,
            self.sweep_interval,
            self.sweep_enabled,
        ))
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
