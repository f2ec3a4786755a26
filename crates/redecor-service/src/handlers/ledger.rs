//! Service-to-service ledger handlers.
//!
//! These are the entry points other backends use to read balances, apply deltas and
//! confirm plan purchases. All of them require `ServiceAuth`.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use redecor_core::{DeltaRequest, Plan, TransactionType, UserId};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::handlers::credits::{
    transaction_page, BalanceResponse, ListTransactionsQuery, ListTransactionsResponse,
    TransactionResponse,
};
use crate::state::AppState;

/// Get a user's balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user_id = UserId::new(user_id)?;
    let balance = state.ledger.get_balance(&user_id).await?;
    Ok(Json(balance.into()))
}

/// List a user's transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(user_id): Path<String>,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let Query(query) = query?;
    let user_id = UserId::new(user_id)?;
    let page = transaction_page(&state.ledger, &user_id, &query).await?;
    Ok(Json(page))
}

/// Apply-delta request.
#[derive(Debug, Deserialize)]
pub struct ApplyDeltaBody {
    /// The user whose balance changes.
    pub user_id: String,
    /// Signed, non-zero amount.
    pub amount: i64,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional idempotency key, scoped to the user.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Response carrying the recorded transaction.
#[derive(Debug, Serialize)]
pub struct TransactionEnvelope {
    /// The recorded transaction.
    pub transaction: TransactionResponse,
}

/// Apply a signed delta to a user's balance.
pub async fn apply_delta(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    body: Result<Json<ApplyDeltaBody>, JsonRejection>,
) -> Result<Json<TransactionEnvelope>, ApiError> {
    let Json(body) = body?;
    let user_id = UserId::new(body.user_id)?;

    let request = DeltaRequest {
        amount: body.amount,
        transaction_type: body.transaction_type,
        description: body.description,
        idempotency_key: body.idempotency_key,
    };

    tracing::debug!(
        service = %auth.service_name,
        user_id = %user_id,
        amount = %request.amount,
        "Delta requested"
    );

    let transaction = state.ledger.apply_delta(&user_id, request).await?;

    Ok(Json(TransactionEnvelope {
        transaction: TransactionResponse::from(&transaction),
    }))
}

/// Purchase confirmation request.
#[derive(Debug, Deserialize)]
pub struct ConfirmPurchaseBody {
    /// The buyer.
    pub user_id: String,
    /// The plan paid for.
    pub plan: Plan,
    /// Payment provider order id. One order credits at most once.
    pub order_id: String,
}

/// Purchase confirmation response.
#[derive(Debug, Serialize)]
pub struct ConfirmPurchaseResponse {
    /// The purchase transaction.
    pub transaction: TransactionResponse,
    /// Balance after the purchase. Omitted when the re-read fails; the credit stands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceResponse>,
}

/// Credit a paid plan to the buyer.
///
/// The order id becomes the idempotency key, so a repeated confirmation for the same
/// order is answered with `409 duplicate_request` instead of crediting twice. For the
/// same reason a failed balance re-read after the credit is logged rather than turned
/// into an error, so the caller never retries a purchase that already landed.
pub async fn confirm_purchase(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    body: Result<Json<ConfirmPurchaseBody>, JsonRejection>,
) -> Result<Json<ConfirmPurchaseResponse>, ApiError> {
    let Json(body) = body?;
    let user_id = UserId::new(body.user_id)?;

    let order_id = body.order_id.trim();
    if order_id.is_empty() {
        return Err(ApiError::BadRequest("order_id must not be empty".into()));
    }

    let request = DeltaRequest::new(body.plan.credits(), TransactionType::Purchase)
        .with_description(format!("{} plan purchase", body.plan.name()))
        .with_idempotency_key(format!("order:{order_id}"));

    let transaction = state.ledger.apply_delta(&user_id, request).await?;
    let balance = match state.ledger.get_balance(&user_id).await {
        Ok(balance) => Some(balance),
        Err(e) => {
            tracing::warn!(
                user_id = %user_id,
                transaction_id = %transaction.id,
                error = %e,
                "Purchase credited but balance re-read failed"
            );
            None
        }
    };

    tracing::info!(
        service = %auth.service_name,
        user_id = %user_id,
        plan = %body.plan.name(),
        order_id = %order_id,
        credits = %body.plan.credits(),
        "Purchase confirmed"
    );

    Ok(Json(ConfirmPurchaseResponse {
        transaction: TransactionResponse::from(&transaction),
        balance: balance.map(Into::into),
    }))
}
