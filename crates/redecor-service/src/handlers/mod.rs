//! API handlers.

pub mod credits;
pub mod health;
pub mod ledger;
pub mod plans;
pub mod redesigns;

use crate::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".into())
}
