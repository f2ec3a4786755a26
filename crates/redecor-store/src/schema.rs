//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage. The PostgreSQL
//! schema lives in `migrations/`.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary account records, keyed by `user_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Credit transactions, keyed by `user_key || sequence`.
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// Next transaction sequence number per user, keyed by `user_id`.
    pub const SEQUENCES: &str = "sequences";

    /// Applied idempotency keys, keyed by `user_key || idempotency_key`.
    /// Value is the transaction ID.
    pub const IDEMPOTENCY_KEYS: &str = "idempotency_keys";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::TRANSACTIONS_BY_USER,
        cf::SEQUENCES,
        cf::IDEMPOTENCY_KEYS,
    ]
}
