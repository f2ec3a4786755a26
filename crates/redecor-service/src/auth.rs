//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - End-user identity forwarded by the auth gateway
//! - `ServiceAuth` - Service-to-service authentication via API key
//!
//! Session handling lives in the gateway; by the time a request reaches this service
//! the caller is just a stable user id.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use redecor_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated end user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the service API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Optional header naming the calling service, for logs.
pub const SERVICE_NAME_HEADER: &str = "x-service-name";

/// An authenticated end user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let user_id = UserId::new(raw).map_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed user id header");
            ApiError::Unauthorized
        })?;

        Ok(Self { user_id })
    }
}

/// Service authentication via API key.
///
/// Used for service-to-service requests (payment callbacks, feature backends).
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    /// The service name or identifier.
    pub service_name: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // No configured key means no service caller is trusted.
        let expected_key = state
            .config
            .service_api_key
            .as_ref()
            .ok_or(ApiError::Unauthorized)?;

        if api_key != expected_key {
            return Err(ApiError::Unauthorized);
        }

        let service_name = parts
            .headers
            .get(SERVICE_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self { service_name })
    }
}
