//! Credit balance and transaction handlers for the signed-in user.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use redecor_core::{Balance, CreditTransaction, TransactionType, UserId};
use redecor_store::CreditLedger;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for transaction listings.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Spendable credits.
    pub available_credits: i64,
    /// Credits received over the account's lifetime.
    pub lifetime_credits: i64,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self {
            available_credits: balance.available_credits,
            lifetime_credits: balance.lifetime_credits,
        }
    }
}

/// Get current credit balance.
///
/// Users who never had a balance change see zeros.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.get_balance(&auth.user_id).await?;
    Ok(Json(balance.into()))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50, max: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

/// Transaction response.
#[derive(Debug, Serialize)]
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

impl From<&CreditTransaction> for TransactionResponse {
    fn from(tx: &CreditTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            description: tx.description.clone(),
            created_at: tx.created_at,
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// Fetch one page of history for `user_id`.
pub(crate) async fn transaction_page(
    ledger: &CreditLedger,
    user_id: &UserId,
    query: &ListTransactionsQuery,
) -> Result<ListTransactionsResponse, ApiError> {
    let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);

    // Fetch one more than requested to determine has_more
    let transactions = ledger
        .list_transactions_page(user_id, limit + 1, query.offset)
        .await?;

    let has_more = transactions.len() > limit;
    let transactions = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(ListTransactionsResponse {
        transactions,
        has_more,
    })
}

/// List transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let Query(query) = query?;
    let page = transaction_page(&state.ledger, &auth.user_id, &query).await?;
    Ok(Json(page))
}
