//! Application state.

use std::sync::Arc;

use redecor_store::{CreditLedger, Store};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The credit ledger every route goes through.
    pub ledger: CreditLedger,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not configured - ledger service routes will reject all calls");
        }

        Self {
            ledger: CreditLedger::new(store),
            config,
        }
    }
}
