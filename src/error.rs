//! Error types for the slabcache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are
//!   invalid (e.g. a shard count that is not a power of two). Raised
//!   synchronously by `build()`, never afterward.
//! - [`CacheError`]: Returned by `set`/`get`/`del` on the cache and its
//!   segments. Lookup misses are ordinary result values here, not
//!   exceptional conditions.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::build`](crate::builder::CacheBuilder::build)
/// before any shard is allocated. Carries a human-readable description of
/// which parameter failed validation.
///
/// # Example
///
/// ```
/// use slabcache::CacheBuilder;
///
/// let err = CacheBuilder::new().shard_count(3).build().unwrap_err();
/// assert!(err.to_string().contains("power of two"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by cache and segment operations.
///
/// [`EntryNotFound`](CacheError::EntryNotFound) and
/// [`KeyMismatch`](CacheError::KeyMismatch) are normal misses and callers
/// should treat them as such. The remaining variants report conditions a
/// host may want to act on: a shard with no reclaimable slot, a key the
/// entry header cannot record, or an index that points at an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// No entry is mapped for the key's hash in the addressed shard.
    EntryNotFound,
    /// The slot addressed by the key's hash holds a different key: two
    /// distinct keys collided on the same 64-bit hash. The cache does not
    /// chain colliding entries, so the later write shadowed the earlier
    /// one; callers treat this as a miss.
    KeyMismatch,
    /// The hash index references a slot that is unexpectedly empty.
    /// Indicates a bookkeeping bug; surfaced, never swallowed.
    InternalInconsistency,
    /// Every slot in the shard holds a live entry. Nothing can be stored
    /// until an entry is deleted, overwritten, or expires.
    CacheFull,
    /// The key is longer than the 65535 bytes the entry header can record.
    KeyTooLarge,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CacheError::EntryNotFound => "entry not found",
            CacheError::KeyMismatch => "stored key does not match requested key",
            CacheError::InternalInconsistency => "hash index references an empty slot",
            CacheError::CacheFull => "every slot in the shard is live",
            CacheError::KeyTooLarge => "key exceeds 65535 bytes",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CacheError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
