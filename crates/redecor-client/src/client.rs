//! Ledger HTTP client implementation.

use reqwest::{Client, Url};
use std::time::Duration;

use redecor_core::Plan;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, ApplyDeltaRequest, ApplyDeltaResponse, BalanceResponse,
    ConfirmPurchaseRequest, ConfirmPurchaseResponse, ListTransactionsResponse,
};

/// Redecor ledger API client.
///
/// Calls the service-to-service ledger endpoints with the configured API key.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl LedgerClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the redecor service (e.g., `"http://redecor:8080"`)
    /// * `api_key` - Service API key for authentication
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new ledger client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base URL {base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            service_name: options.service_name,
        })
    }

    /// Get a user's balance.
    ///
    /// Users with no account yet report zeros.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_balance(&self, user_id: &str) -> Result<BalanceResponse, ClientError> {
        let url = self.user_url(user_id, "balance")?;

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the first page of a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_transactions(
        &self,
        user_id: &str,
    ) -> Result<ListTransactionsResponse, ClientError> {
        let url = self.user_url(user_id, "transactions")?;

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List one page of a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_transactions_page(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ListTransactionsResponse, ClientError> {
        let url = self.user_url(user_id, "transactions")?;

        let response = self
            .client
            .get(url)
            .query(&[("limit", limit), ("offset", offset)])
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Apply a signed delta to a user's balance.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::DuplicateRequest` if the idempotency key was already
    /// applied, or another error if the request fails.
    pub async fn apply_delta(
        &self,
        request: ApplyDeltaRequest,
    ) -> Result<ApplyDeltaResponse, ClientError> {
        let url = format!("{}/v1/ledger/deltas", self.base_url);

        tracing::debug!(
            user_id = %request.user_id,
            amount = %request.amount,
            transaction_type = %request.transaction_type,
            "Applying credit delta"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Credit a paid plan to a user.
    ///
    /// Safe to retry: a repeated `order_id` for the same user is rejected with
    /// `ClientError::DuplicateRequest` and credits nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn confirm_purchase(
        &self,
        user_id: &str,
        plan: Plan,
        order_id: &str,
    ) -> Result<ConfirmPurchaseResponse, ClientError> {
        let url = format!("{}/v1/ledger/purchases", self.base_url);
        let request = ConfirmPurchaseRequest {
            user_id,
            plan,
            order_id,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Build `/v1/ledger/{user_id}/{leaf}` with the user id percent-encoded.
    fn user_url(&self, user_id: &str, leaf: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(["v1", "ledger", user_id, leaf]);
        Ok(url)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;
                let details = api_error.error.details.as_ref();
                let detail_i64 = |field: &str| {
                    details
                        .and_then(|d| d.get(field))
                        .and_then(serde_json::Value::as_i64)
                        .unwrap_or(0)
                };

                match code {
                    "insufficient_credits" => Err(ClientError::InsufficientCredits {
                        available: detail_i64("available"),
                        required: detail_i64("required"),
                    }),
                    "duplicate_request" => Err(ClientError::DuplicateRequest {
                        idempotency_key: details
                            .and_then(|d| d.get("idempotency_key"))
                            .and_then(serde_json::Value::as_str)
                            .map_or(message, str::to_string),
                    }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Service name to include in requests.
    pub service_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a service name.
    #[must_use]
    pub fn with_service_name(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Self::default()
        }
    }
}
