//! slabcache: embedded sharded slab cache for byte-valued entries.
//!
//! Keys route to independently locked shards; each shard packs encoded
//! entries into a fixed array of byte-buffer slots and a background
//! sweeper reclaims expired slots. See `DESIGN.md` for internal
//! architecture and invariants.

pub mod builder;
pub mod cache;
pub mod entry;
pub mod error;
pub mod hash;
pub mod metrics;
pub mod segment;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{CacheError, ConfigError};
pub use hash::{Djb33, Fnv64a, KeyHasher};
pub use metrics::CacheMetricsSnapshot;
