//! Credit transaction types.
//!
//! Every balance change is recorded as exactly one immutable transaction holding the
//! raw requested amount.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, TransactionId, UserId};

/// Maximum length of a transaction description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Maximum length of an idempotency key, in bytes.
pub const MAX_IDEMPOTENCY_KEY_BYTES: usize = 255;

/// A credit transaction representing one balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Requested amount. Positive = credit, negative = debit.
    pub amount: i64,

    /// Type of transaction.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Optional free-text note.
    pub description: Option<String>,

    /// Caller-supplied key that makes the delta apply at most once per user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,

    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Build the transaction that records `request` for `user_id`.
    #[must_use]
    pub fn new(user_id: UserId, request: DeltaRequest) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount: request.amount,
            transaction_type: request.transaction_type,
            description: request.description,
            idempotency_key: request.idempotency_key,
            created_at: Utc::now(),
        }
    }
}

/// Type of credit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// User purchased credits.
    Purchase,

    /// Credits spent on a feature.
    Usage,

    /// Credits returned to the user.
    Refund,

    /// Promotional credits.
    Bonus,

    /// Credits removed because they expired.
    Expiry,
}

impl TransactionType {
    /// All variants, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Purchase,
        Self::Usage,
        Self::Refund,
        Self::Bonus,
        Self::Expiry,
    ];

    /// The wire and storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Usage => "usage",
            Self::Refund => "refund",
            Self::Bonus => "bonus",
            Self::Expiry => "expiry",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LedgerError::InvalidRequest(format!("unknown transaction type: {s}")))
    }
}

/// A request to apply a signed delta to a user's balance.
///
/// The sign of `amount` is not checked against `transaction_type`; a `usage` delta
/// is expected to be negative and a `purchase` positive, but callers own that choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRequest {
    /// Signed amount. Must be non-zero.
    pub amount: i64,

    /// Type of transaction.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Optional note recorded with the transaction.
    #[serde(default)]
    pub description: Option<String>,

    /// Optional key that makes the delta apply at most once per user.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl DeltaRequest {
    /// Create a request without description or idempotency key.
    #[must_use]
    pub const fn new(amount: i64, transaction_type: TransactionType) -> Self {
        Self {
            amount,
            transaction_type,
            description: None,
            idempotency_key: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Check the request before it reaches storage.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `amount` is zero.
    /// - `LedgerError::InvalidRequest` if the description or idempotency key is
    ///   out of bounds.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "amount must be non-zero".into(),
            ));
        }

        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_CHARS {
                return Err(LedgerError::InvalidRequest(format!(
                    "description exceeds {MAX_DESCRIPTION_CHARS} characters"
                )));
            }
        }

        if let Some(key) = &self.idempotency_key {
            if key.trim().is_empty() {
                return Err(LedgerError::InvalidRequest(
                    "idempotency key must not be empty".into(),
                ));
            }
            if key.len() > MAX_IDEMPOTENCY_KEY_BYTES {
                return Err(LedgerError::InvalidRequest(format!(
                    "idempotency key exceeds {MAX_IDEMPOTENCY_KEY_BYTES} bytes"
                )));
            }
        }

        Ok(())
    }
}
