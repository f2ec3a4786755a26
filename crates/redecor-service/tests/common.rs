//! Common test utilities for redecor integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use redecor_core::{Account, CreditTransaction, TransactionId, UserId};
use redecor_service::{create_router, AppState, ServiceConfig};
use redecor_store::{MemoryStore, Store, StoreError};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for on-disk backends (kept alive for test duration).
    pub _temp_dir: Option<TempDir>,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), None, test_config())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), None, config)
    }

    /// Create a harness over a fresh `RocksDB` store.
    #[cfg(feature = "rocksdb-backend")]
    pub fn with_rocks() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = redecor_store::RocksStore::open(temp_dir.path()).expect("Failed to open store");
        let mut config = test_config();
        config.storage_backend = redecor_service::StorageBackend::Rocksdb;
        config.data_dir = temp_dir.path().to_string_lossy().to_string();
        Self::with_store(Arc::new(store), Some(temp_dir), config)
    }

    /// Create a harness over a store whose failures are scripted.
    pub fn with_failing_store(store: FailingStore) -> Self {
        Self::with_store(Arc::new(store), None, test_config())
    }

    fn with_store(store: Arc<dyn Store>, temp_dir: Option<TempDir>, config: ServiceConfig) -> Self {
        let service_api_key = config.service_api_key.clone().unwrap_or_default();

        let state = AppState::new(store, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id: new_user_id(),
            service_api_key,
        }
    }

    /// The user id header value for the test user.
    pub fn user_header(&self) -> String {
        self.test_user_id.to_string()
    }

    /// Credit `amount` to `user_id` through the service ledger endpoint.
    pub async fn grant(&self, user_id: &UserId, amount: i64) {
        self.server
            .post("/v1/ledger/deltas")
            .add_header("x-api-key", self.service_api_key.clone())
            .json(&json!({
                "user_id": user_id.to_string(),
                "amount": amount,
                "type": "purchase",
            }))
            .await
            .assert_status_ok();
    }

    /// Read the test user's balance as `(available, lifetime)`.
    pub async fn balance(&self) -> (i64, i64) {
        let body: serde_json::Value = self
            .server
            .get("/v1/credits/balance")
            .add_header("x-user-id", self.user_header())
            .await
            .json();
        (
            body["available_credits"].as_i64().unwrap(),
            body["lifetime_credits"].as_i64().unwrap(),
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration used by the default harness.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        service_api_key: Some("test-service-key".into()),
        ..ServiceConfig::default()
    }
}

/// A fresh, unique user id.
pub fn new_user_id() -> UserId {
    UserId::new(format!("user-{}", TransactionId::generate())).expect("valid user id")
}

/// Error text a `FailingStore` reports; it must never reach a response body.
pub const STORE_FAILURE: &str = "connection refused by db-primary:5432";

/// A `MemoryStore` wrapper that fails on demand.
pub struct FailingStore {
    inner: MemoryStore,
    reads_left: AtomicUsize,
    fail_writes: bool,
}

impl FailingStore {
    /// Every operation fails.
    pub fn unavailable() -> Self {
        Self {
            inner: MemoryStore::new(),
            reads_left: AtomicUsize::new(0),
            fail_writes: true,
        }
    }

    /// Writes and listings succeed; account reads fail after `reads` successful ones.
    pub fn reads_fail_after(reads: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            reads_left: AtomicUsize::new(reads),
            fail_writes: false,
        }
    }

    fn failure() -> StoreError {
        StoreError::Database(STORE_FAILURE.to_string())
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn read_account(&self, user_id: &UserId) -> redecor_store::Result<Option<Account>> {
        let allowed = self
            .reads_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(Self::failure());
        }
        self.inner.read_account(user_id).await
    }

    async fn apply_delta(&self, transaction: &CreditTransaction) -> redecor_store::Result<Account> {
        if self.fail_writes {
            return Err(Self::failure());
        }
        self.inner.apply_delta(transaction).await
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
    ) -> redecor_store::Result<Vec<CreditTransaction>> {
        if self.fail_writes {
            return Err(Self::failure());
        }
        self.inner.list_transactions(user_id).await
    }
}
