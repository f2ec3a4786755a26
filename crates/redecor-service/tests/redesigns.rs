//! Credit-gated redesign integration tests.

mod common;

use axum::http::StatusCode;
use common::{test_config, TestHarness};
use redecor_service::ServiceConfig;
use serde_json::json;

fn redesign_body() -> serde_json::Value {
    json!({
        "image_url": "https://uploads.example.com/room.jpg",
        "style": "tropical",
    })
}

#[tokio::test]
async fn redesign_charges_one_credit() {
    let harness = TestHarness::new();
    harness.grant(&harness.test_user_id, 10).await;

    let response = harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&redesign_body())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["style"], "tropical");
    assert_eq!(body["model"], "stable_diffusion");
    assert_eq!(body["credits_charged"], 1);
    assert_eq!(body["user_id"], harness.user_header());
    assert_eq!(body["balance"]["available_credits"], 9);
    assert_eq!(body["balance"]["lifetime_credits"], 10);
    assert!(body["redesign_id"].as_str().is_some());

    let history: serde_json::Value = harness
        .server
        .get("/v1/credits/transactions")
        .add_header("x-user-id", harness.user_header())
        .await
        .json();
    let latest = &history["transactions"][0];
    assert_eq!(latest["amount"], -1);
    assert_eq!(latest["type"], "usage");
    assert_eq!(latest["description"], "tropical redesign (stable_diffusion)");
    assert_eq!(latest["id"], body["transaction_id"]);
}

#[tokio::test]
async fn redesign_without_credits_is_payment_required() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&redesign_body())
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_credits");
    assert_eq!(body["error"]["details"]["available"], 0);
    assert_eq!(body["error"]["details"]["required"], 1);

    // Nothing was debited or recorded.
    let history: serde_json::Value = harness
        .server
        .get("/v1/credits/transactions")
        .add_header("x-user-id", harness.user_header())
        .await
        .json();
    assert!(history["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn redesign_uses_configured_cost() {
    let harness = TestHarness::with_config(ServiceConfig {
        generation_cost_credits: 3,
        ..test_config()
    });
    harness.grant(&harness.test_user_id, 5).await;

    let response = harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&json!({
            "image_url": "https://uploads.example.com/room.jpg",
            "style": "scandinavian",
            "model": "dall_e",
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credits_charged"], 3);
    assert_eq!(body["model"], "dall_e");
    assert_eq!(harness.balance().await, (2, 5));

    // 2 left, 3 needed.
    harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&redesign_body())
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);
    assert_eq!(harness.balance().await, (2, 5));
}

#[tokio::test]
async fn redesign_rejects_invalid_input_without_charging() {
    let harness = TestHarness::new();
    harness.grant(&harness.test_user_id, 10).await;

    let bad_url = harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&json!({ "image_url": "file:///etc/passwd", "style": "modern" }))
        .await;
    bad_url.assert_status_bad_request();

    let bad_style = harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&json!({ "image_url": "https://x.example/r.jpg", "style": "baroque" }))
        .await;
    bad_style.assert_status_bad_request();
    let body: serde_json::Value = bad_style.json();
    assert_eq!(body["error"]["code"], "bad_request");

    assert_eq!(harness.balance().await, (10, 10));
}

#[tokio::test]
async fn redesign_without_auth_fails() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/redesigns")
        .json(&redesign_body())
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn redesigns_until_empty() {
    let harness = TestHarness::new();
    harness.grant(&harness.test_user_id, 3).await;

    for _ in 0..3 {
        harness
            .server
            .post("/v1/redesigns")
            .add_header("x-user-id", harness.user_header())
            .json(&redesign_body())
            .await
            .assert_status_ok();
    }

    harness
        .server
        .post("/v1/redesigns")
        .add_header("x-user-id", harness.user_header())
        .json(&redesign_body())
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);
    assert_eq!(harness.balance().await, (0, 3));
}
