//! Error types for the credit ledger.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Invalid amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid request field other than the amount.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller's balance does not cover the cost.
    ///
    /// Raised by the spend gate before any debit is attempted, never by a plain delta.
    #[error("insufficient credits: available={available}, required={required}")]
    InsufficientCredits {
        /// Spendable balance at the time of the check.
        available: i64,
        /// Credits the action costs.
        required: i64,
    },

    /// A delta with this idempotency key was already applied.
    #[error("duplicate request: {idempotency_key}")]
    DuplicateRequest {
        /// The repeated key.
        idempotency_key: String,
    },

    /// The backing store is unreachable or rejected the operation.
    #[error("storage error: {0}")]
    Storage(String),
}
