//! Room redesign handler.
//!
//! A redesign costs credits. The handler charges through the ledger's spend gate
//! before anything is handed to the image-generation provider, which is an external
//! collaborator and not called from here.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use redecor_core::{GenerationModel, RedesignRequest, RedesignStyle};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::credits::BalanceResponse;
use crate::state::AppState;

/// Redesign response.
#[derive(Debug, Serialize)]
pub struct RedesignResponse {
    /// Identifier of the accepted redesign job.
    pub redesign_id: String,
    /// The user charged.
    pub user_id: String,
    /// Requested style.
    pub style: RedesignStyle,
    /// Model used.
    pub model: GenerationModel,
    /// Credits debited.
    pub credits_charged: i64,
    /// The usage transaction recording the charge.
    pub transaction_id: String,
    /// Balance after the charge. Omitted when the re-read fails; the charge stands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceResponse>,
}

/// Accept a room redesign, charging the configured credit cost.
///
/// Once the debit is recorded the request succeeds. A failed balance re-read after
/// that point is logged and leaves `balance` out of the response.
pub async fn create_redesign(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<RedesignRequest>, JsonRejection>,
) -> Result<Json<RedesignResponse>, ApiError> {
    let Json(body) = body?;
    body.validate()?;

    let cost = state.config.generation_cost_credits;
    let transaction = state
        .ledger
        .spend(&auth.user_id, cost, body.usage_description())
        .await?;

    let balance = match state.ledger.get_balance(&auth.user_id).await {
        Ok(balance) => Some(balance),
        Err(e) => {
            tracing::warn!(
                user_id = %auth.user_id,
                transaction_id = %transaction.id,
                error = %e,
                "Redesign charged but balance re-read failed"
            );
            None
        }
    };
    let redesign_id = ulid::Ulid::new().to_string();

    tracing::info!(
        user_id = %auth.user_id,
        redesign_id = %redesign_id,
        style = %body.style.as_str(),
        model = %body.model.as_str(),
        cost = %cost,
        "Redesign accepted"
    );

    Ok(Json(RedesignResponse {
        redesign_id,
        user_id: auth.user_id.to_string(),
        style: body.style,
        model: body.model,
        credits_charged: cost,
        transaction_id: transaction.id.to_string(),
        balance: balance.map(Into::into),
    }))
}
