//! Per-shard slot store.
//!
//! A segment owns a fixed array of byte-buffer slots, a hash → slot
//! index, and a free-list allocator over cleared slots. Entries are
//! encoded with [`crate::entry`]; a slot holds at most one entry.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<u64, u32>        slots: Box<[Option<Box<[u8]>>]>
//!   ┌──────────┬──────┐               ┌──────────────────────┐
//!   │ hash(k1) │  0   │──────────────►│ 0: entry(k1)         │
//!   │ hash(k3) │  2   │──┐            │ 1: None  ◄── free    │
//!   └──────────┴──────┘  └───────────►│ 2: entry(k3)         │
//!                                     │ 3: None  ◄── cursor  │
//!   free_list: [1]                    └──────────────────────┘
//! ```
//!
//! The slot array never grows: capacity is fixed at construction from the
//! shard's byte budget. Clearing a slot (delete, overwrite, expiry) pushes
//! its index onto the free list; allocation pops the free list before
//! advancing the high-water cursor, so churn recycles slots instead of
//! exhausting the array. Once every slot is live, `set` reports
//! [`CacheError::CacheFull`].
//!
//! Segments carry no synchronization of their own; the owning cache wraps
//! each one in its shard mutex.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;

use crate::entry;
use crate::error::CacheError;

/// Slot granularity used to derive the slot count from a byte budget.
pub const CHUNK_SIZE: u64 = 16 * 1024;

/// Fixed-capacity slot store for one shard.
#[derive(Debug)]
pub struct Segment {
    slots: Box<[Option<Box<[u8]>>]>,
    index: FxHashMap<u64, u32>,
    free_list: Vec<u32>,
    cursor: u32,
}

impl Segment {
    /// Creates a segment with `ceil(max_bytes / CHUNK_SIZE)` slots.
    pub fn new(max_bytes: u64) -> Self {
        let capacity = max_bytes.div_ceil(CHUNK_SIZE) as usize;
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            index: FxHashMap::default(),
            free_list: Vec::new(),
            cursor: 0,
        }
    }

    /// Inserts or overwrites the entry for `hash`.
    ///
    /// Overwrite is keyed purely on the hash: a colliding key replaces the
    /// previous occupant rather than chaining alongside it. `ttl` of `None`
    /// writes a non-expiring entry.
    pub fn set(
        &mut self,
        key: &str,
        hash: u64,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        if key.len() > usize::from(u16::MAX) {
            return Err(CacheError::KeyTooLarge);
        }
        if let Some(slot) = self.index.remove(&hash) {
            self.clear_slot(slot);
        }
        // Cannot fail on the overwrite path: clearing above freed a slot.
        let slot = self.allocate_slot()?;
        let expire_at = ttl.map_or(0, |ttl| unix_now().saturating_add(ttl.as_secs() as i64));
        self.slots[slot as usize] = Some(entry::wrap(expire_at, hash, key, value));
        self.index.insert(hash, slot);
        Ok(())
    }

    /// Looks up the entry for `key`, re-checking the stored key to catch
    /// hash collisions between distinct keys.
    pub fn get(&self, key: &str, hash: u64) -> Result<Vec<u8>, CacheError> {
        let slot = *self.index.get(&hash).ok_or(CacheError::EntryNotFound)?;
        let buf = self.slots[slot as usize]
            .as_deref()
            .ok_or(CacheError::InternalInconsistency)?;
        if entry::key(buf) != key.as_bytes() {
            return Err(CacheError::KeyMismatch);
        }
        Ok(entry::value(buf).to_vec())
    }

    /// Removes the entry for `hash`. An absent hash is a no-op.
    pub fn del(&mut self, hash: u64) {
        if let Some(slot) = self.index.remove(&hash) {
            self.clear_slot(slot);
        }
    }

    /// Clears every occupied slot whose expiry has passed, returning the
    /// number of entries removed.
    ///
    /// Scans the allocated region up to the high-water cursor; slots
    /// cleared here go straight onto the free list. Entries written with
    /// no TTL (`expire_at == 0`) are never cleared.
    pub fn clean(&mut self, now: i64) -> usize {
        let mut removed = 0;
        for slot in 0..self.cursor {
            let hash = match self.slots[slot as usize].as_deref() {
                Some(buf) if is_expired(buf, now) => entry::hash(buf),
                _ => continue,
            };
            self.index.remove(&hash);
            self.clear_slot(slot);
            removed += 1;
        }
        removed
    }

    /// Number of live entries (index size, not slot-array length).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Fixed slot capacity of this segment.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn clear_slot(&mut self, slot: u32) {
        self.slots[slot as usize] = None;
        self.free_list.push(slot);
    }

    /// Pops a recycled slot, or advances the high-water cursor.
    fn allocate_slot(&mut self) -> Result<u32, CacheError> {
        if let Some(slot) = self.free_list.pop() {
            return Ok(slot);
        }
        if (self.cursor as usize) < self.slots.len() {
            let slot = self.cursor;
            self.cursor += 1;
            Ok(slot)
        } else {
            Err(CacheError::CacheFull)
        }
    }
}

fn is_expired(buf: &[u8], now: i64) -> bool {
    let expire_at = entry::expire_at(buf);
    expire_at != 0 && now >= expire_at
}

/// Current unix time in whole seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}
