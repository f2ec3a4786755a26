//! Request and response types for the ledger client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use redecor_core::{Plan, TransactionType};

/// Request to apply a signed delta to a user's balance.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyDeltaRequest {
    /// User whose balance changes.
    pub user_id: String,
    /// Signed, non-zero amount.
    pub amount: i64,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional idempotency key, scoped to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl ApplyDeltaRequest {
    /// Create a request without description or idempotency key.
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: i64, transaction_type: TransactionType) -> Self {
        Self {
            user_id: user_id.into(),
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
}

/// Purchase confirmation request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConfirmPurchaseRequest<'a> {
    pub user_id: &'a str,
    pub plan: Plan,
    pub order_id: &'a str,
}

/// Balance response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceResponse {
    /// Spendable credits.
    pub available_credits: i64,
    /// Credits received over the account's lifetime.
    pub lifetime_credits: i64,
}

/// One recorded transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Requested amount (positive = credit, negative = debit).
    pub amount: i64,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Description.
    pub description: Option<String>,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

/// Transaction history page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// Response to an applied delta.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyDeltaResponse {
    /// The recorded transaction.
    pub transaction: TransactionResponse,
}

/// Response to a confirmed purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPurchaseResponse {
    /// The purchase transaction.
    pub transaction: TransactionResponse,
    /// Balance after the purchase, absent if the service could not re-read it.
    #[serde(default)]
    pub balance: Option<BalanceResponse>,
}

/// Error envelope returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
