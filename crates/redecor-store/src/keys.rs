//! Key encoding utilities for `RocksDB`.
//!
//! User IDs are variable-length, so every key that is scanned by user starts with a
//! length-prefixed user key. That keeps `"ab" || x` and `"a" || "b" || x` apart.

use redecor_core::UserId;

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create the prefix shared by every per-user key.
///
/// Format: `len (u16 BE) || user_id bytes`
#[must_use]
pub fn user_prefix(user_id: &UserId) -> Vec<u8> {
    let bytes = user_id.as_bytes();
    // User IDs are capped well below u16::MAX bytes.
    let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);

    let mut key = Vec::with_capacity(2 + bytes.len() + 8);
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(bytes);
    key
}

/// Create a user-transaction key.
///
/// Format: `user_prefix || sequence (u64 BE)`
///
/// Big-endian sequences sort in insertion order within a user's prefix.
#[must_use]
pub fn user_transaction_key(user_id: &UserId, sequence: u64) -> Vec<u8> {
    let mut key = user_prefix(user_id);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

/// Create an idempotency key entry.
///
/// Format: `user_prefix || idempotency_key bytes`
#[must_use]
pub fn idempotency_key(user_id: &UserId, key: &str) -> Vec<u8> {
    let mut out = user_prefix(user_id);
    out.extend_from_slice(key.as_bytes());
    out
}

/// Decode a stored sequence counter.
#[must_use]
pub fn decode_sequence(value: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = value.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}
