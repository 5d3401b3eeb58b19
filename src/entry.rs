//! Binary entry codec.
//!
//! An entry is one contiguous buffer: a fixed little-endian header
//! followed by the raw key bytes, then the raw value bytes, sized exactly
//! to content with no padding.
//!
//! ## Layout
//!
//! ```text
//!   offset   0         8         16    18          18+klen
//!            ┌─────────┬─────────┬─────┬───────────┬─────────────────┐
//!            │expire_at│  hash   │klen │ key bytes │ value bytes ... │
//!            │ i64 LE  │ u64 LE  │u16LE│           │                 │
//!            └─────────┴─────────┴─────┴───────────┴─────────────────┘
//! ```
//!
//! `expire_at` is unix seconds; 0 marks a non-expiring entry. An update
//! never mutates a buffer in place; the segment writes a brand-new one.
//!
//! The readers assume buffers produced by [`wrap`] and perform no bounds
//! validation beyond what the fixed header guarantees; handing them a
//! foreign buffer is undefined.

/// Bytes of the expiry timestamp field.
pub const TIMESTAMP_SIZE: usize = 8;
/// Bytes of the key-hash field.
pub const HASH_SIZE: usize = 8;
/// Bytes of the key-length field.
pub const KEY_LEN_SIZE: usize = 2;
/// Total fixed header size.
pub const HEADER_SIZE: usize = TIMESTAMP_SIZE + HASH_SIZE + KEY_LEN_SIZE;

/// Encodes one entry into a buffer sized exactly to its content.
///
/// The caller guarantees `key.len() <= u16::MAX`; the segment enforces
/// this before encoding.
pub fn wrap(expire_at: i64, hash: u64, key: &str, value: &[u8]) -> Box<[u8]> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + key.len() + value.len());
    buf.extend_from_slice(&expire_at.to_le_bytes());
    buf.extend_from_slice(&hash.to_le_bytes());
    buf.extend_from_slice(&(key.len() as u16).to_le_bytes());
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(value);
    buf.into_boxed_slice()
}

/// Reads the expiry timestamp (unix seconds, 0 = never expires).
pub fn expire_at(buf: &[u8]) -> i64 {
    let mut raw = [0u8; TIMESTAMP_SIZE];
    raw.copy_from_slice(&buf[..TIMESTAMP_SIZE]);
    i64::from_le_bytes(raw)
}

/// Reads the stored key hash.
pub fn hash(buf: &[u8]) -> u64 {
    let mut raw = [0u8; HASH_SIZE];
    raw.copy_from_slice(&buf[TIMESTAMP_SIZE..TIMESTAMP_SIZE + HASH_SIZE]);
    u64::from_le_bytes(raw)
}

/// Returns the raw key bytes.
pub fn key(buf: &[u8]) -> &[u8] {
    &buf[HEADER_SIZE..HEADER_SIZE + key_len(buf)]
}

/// Returns the value bytes (everything after the key).
pub fn value(buf: &[u8]) -> &[u8] {
    &buf[HEADER_SIZE + key_len(buf)..]
}

fn key_len(buf: &[u8]) -> usize {
    let mut raw = [0u8; KEY_LEN_SIZE];
    raw.copy_from_slice(&buf[TIMESTAMP_SIZE + HASH_SIZE..HEADER_SIZE]);
    usize::from(u16::from_le_bytes(raw))
}
