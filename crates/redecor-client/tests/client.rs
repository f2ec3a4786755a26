//! Client SDK tests against a mocked ledger service.

use redecor_client::{ApplyDeltaRequest, ClientError, ClientOptions, LedgerClient};
use redecor_core::{Plan, TransactionType};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-service-key";

fn client_for(server: &MockServer) -> LedgerClient {
    LedgerClient::with_options(
        server.uri(),
        API_KEY,
        ClientOptions::with_service_name("payments"),
    )
    .unwrap()
}

fn transaction_json(amount: i64, transaction_type: &str) -> serde_json::Value {
    json!({
        "id": "01J9Z3X4K5M6N7P8Q9R0S1T2V3",
        "amount": amount,
        "type": transaction_type,
        "description": null,
        "created_at": "2026-01-01T00:00:00Z",
    })
}

#[tokio::test]
async fn get_balance_sends_service_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ledger/user-1/balance"))
        .and(header("x-api-key", API_KEY))
        .and(header("x-service-name", "payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "available_credits": 7,
            "lifetime_credits": 10,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let balance = client_for(&server).get_balance("user-1").await.unwrap();

    assert_eq!(balance.available_credits, 7);
    assert_eq!(balance.lifetime_credits, 10);
}

#[tokio::test]
async fn user_id_is_percent_encoded_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ledger/auth0%7Cabc/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "available_credits": 0,
            "lifetime_credits": 0,
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).get_balance("auth0|abc").await.unwrap();
}

#[tokio::test]
async fn list_transactions_page_passes_limit_and_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ledger/user-1/transactions"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactions": [transaction_json(-3, "usage"), transaction_json(10, "purchase")],
            "has_more": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_transactions_page("user-1", 2, 4)
        .await
        .unwrap();

    assert!(page.has_more);
    assert_eq!(page.transactions.len(), 2);
    assert_eq!(page.transactions[0].amount, -3);
    assert_eq!(page.transactions[0].transaction_type, TransactionType::Usage);
}

#[tokio::test]
async fn apply_delta_posts_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ledger/deltas"))
        .and(header("x-api-key", API_KEY))
        .and(body_json(json!({
            "user_id": "user-1",
            "amount": 5,
            "type": "bonus",
            "description": "welcome",
            "idempotency_key": "welcome:user-1",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "transaction": transaction_json(5, "bonus") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .apply_delta(
            ApplyDeltaRequest::new("user-1", 5, TransactionType::Bonus)
                .with_description("welcome")
                .with_idempotency_key("welcome:user-1"),
        )
        .await
        .unwrap();

    assert_eq!(response.transaction.amount, 5);
    assert_eq!(response.transaction.transaction_type, TransactionType::Bonus);
}

#[tokio::test]
async fn confirm_purchase_posts_plan_and_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ledger/purchases"))
        .and(body_json(json!({
            "user_id": "user-1",
            "plan": "pro",
            "order_id": "ORDER-123",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction": transaction_json(30, "purchase"),
            "balance": { "available_credits": 30, "lifetime_credits": 30 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let purchase = client_for(&server)
        .confirm_purchase("user-1", Plan::Pro, "ORDER-123")
        .await
        .unwrap();

    assert_eq!(purchase.transaction.amount, 30);
    assert_eq!(purchase.balance.unwrap().available_credits, 30);
}

#[tokio::test]
async fn confirm_purchase_accepts_missing_balance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ledger/purchases"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "transaction": transaction_json(10, "purchase") })),
        )
        .mount(&server)
        .await;

    let purchase = client_for(&server)
        .confirm_purchase("user-1", Plan::Starter, "ORDER-9")
        .await
        .unwrap();

    assert_eq!(purchase.transaction.amount, 10);
    assert!(purchase.balance.is_none());
}

#[tokio::test]
async fn payment_required_maps_to_insufficient_credits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ledger/deltas"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {
                "code": "insufficient_credits",
                "message": "insufficient credits",
                "details": { "available": 0, "required": 1 },
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .apply_delta(ApplyDeltaRequest::new("user-1", -1, TransactionType::Usage))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::InsufficientCredits {
            available: 0,
            required: 1
        }
    ));
}

#[tokio::test]
async fn conflict_maps_to_duplicate_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ledger/purchases"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "duplicate_request",
                "message": "duplicate request",
                "details": { "idempotency_key": "order:ORDER-123" },
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .confirm_purchase("user-1", Plan::Starter, "ORDER-123")
        .await
        .unwrap_err();

    match err {
        ClientError::DuplicateRequest { idempotency_key } => {
            assert_eq!(idempotency_key, "order:ORDER-123");
        }
        other => panic!("expected duplicate request, got {other:?}"),
    }
}

#[tokio::test]
async fn other_errors_keep_code_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ledger/user-1/balance"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "unauthorized", "message": "invalid API key" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_balance("user-1").await.unwrap_err();

    match err {
        ClientError::Api {
            code,
            message,
            status,
        } => {
            assert_eq!(code, "unauthorized");
            assert_eq!(message, "invalid API key");
            assert_eq!(status, 401);
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ledger/user-1/transactions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_transactions("user-1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Api { ref code, status: 502, .. } if code == "unknown"
    ));
}
