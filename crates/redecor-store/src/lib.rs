//! Storage layer and credit ledger for redecor.
//!
//! This crate provides persistent storage for accounts and credit transactions, and
//! the [`CreditLedger`] that every feature route goes through to read or move credits.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process, for tests and single-node development.
//! - [`PgStore`]: PostgreSQL via `sqlx`; the delta is evaluated server-side inside a
//!   database transaction.
//! - `RocksStore` (feature `rocksdb-backend`): RocksDB `TransactionDB` with column
//!   families and pessimistic row locks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use redecor_core::{DeltaRequest, TransactionType, UserId};
//! use redecor_store::{CreditLedger, MemoryStore};
//!
//! # async fn example() -> redecor_core::Result<()> {
//! let ledger = CreditLedger::new(Arc::new(MemoryStore::new()));
//! let user_id = UserId::new("u1")?;
//!
//! ledger
//!     .apply_delta(&user_id, DeltaRequest::new(10, TransactionType::Purchase))
//!     .await?;
//! let balance = ledger.get_balance(&user_id).await?;
//! assert_eq!(balance.available_credits, 10);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ledger;
pub mod memory;
pub mod postgres;

#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use ledger::CreditLedger;
pub use memory::MemoryStore;
pub use postgres::PgStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use async_trait::async_trait;
use redecor_core::{Account, CreditTransaction, UserId};

/// The storage trait defining all database operations.
///
/// The ledger depends on this trait rather than on a concrete client, so the backend
/// can be swapped (and faked in tests).
#[async_trait]
pub trait Store: Send + Sync {
    /// Get an account by user ID.
    ///
    /// `Ok(None)` means the user has never had a balance mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn read_account(&self, user_id: &UserId) -> Result<Option<Account>>;

    /// Apply `transaction.amount` to the owning account and record the transaction.
    ///
    /// Both writes form one atomic unit: either the account row and the transaction
    /// row are both persisted or neither is. The account is created zero-initialised
    /// when missing. Concurrent calls for the same user are serialized, so no update
    /// is lost. Returns the account after the delta.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateRequest` if the transaction's idempotency key was
    ///   already recorded for this user. Nothing is written.
    /// - `StoreError::Database` / `StoreError::Serialization` on backend failure.
    async fn apply_delta(&self, transaction: &CreditTransaction) -> Result<Account>;

    /// List every transaction for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_transactions(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>>;

    /// List one page of a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_transactions_page(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        Ok(self
            .list_transactions(user_id)
            .await?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }
}
