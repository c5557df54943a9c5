use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vakt::{create_router, AppState};
use vakt_core::{ConsentProvider, ConsentValue, InMemoryRecordStore, StorageArea};

/// Create a test app with in-memory stores.
fn create_test_app(consent: ConsentValue) -> (axum::Router, AppState) {
    let state = AppState::new(
        Arc::new(ConsentProvider::new(consent)),
        Arc::new(InMemoryRecordStore::new(StorageArea::Provisional)),
        Arc::new(InMemoryRecordStore::new(StorageArea::Authorized)),
    )
    .unwrap();
    (create_router(state.clone()), state)
}

/// Send a request and return status plus body (JSON when it parses, otherwise a string).
async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn post_record(app: &axum::Router, value: Value) {
    let (status, _) = send(app, json_request("POST", "/records", value)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

fn payloads(body: &Value) -> Vec<Value> {
    body["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["record"]["payload"].clone())
        .collect()
}

// ============================================================================
// Health endpoint tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state) = create_test_app(ConsentValue::Pending);

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ============================================================================
// Consent endpoint tests
// ============================================================================

#[tokio::test]
async fn test_get_consent() {
    let (app, _state) = create_test_app(ConsentValue::NotGranted);

    let (status, body) = send(&app, get("/consent")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "consent": "not_granted" }));
}

#[tokio::test]
async fn test_change_consent_returns_transition() {
    let (app, state) = create_test_app(ConsentValue::Pending);

    let (status, body) = send(
        &app,
        json_request("PUT", "/consent", json!({ "consent": "granted" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "from": "pending", "to": "granted" }));
    assert_eq!(state.consent.current_value(), ConsentValue::Granted);
}

#[tokio::test]
async fn test_change_consent_rejects_unknown_value() {
    let (app, state) = create_test_app(ConsentValue::Pending);

    let (status, _) = send(
        &app,
        json_request("PUT", "/consent", json!({ "consent": "maybe" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.consent.current_value(), ConsentValue::Pending);
}

// ============================================================================
// Record routing tests
// ============================================================================

#[tokio::test]
async fn test_pending_records_are_buffered() {
    let (app, state) = create_test_app(ConsentValue::Pending);

    post_record(&app, json!({ "event": "launch" })).await;
    state.writer.flush().await;

    let (status, body) = send(&app, get("/api/records/provisional")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(payloads(&body), vec![json!({ "event": "launch" })]);

    let (_, body) = send(&app, get("/api/records/authorized")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_granting_consent_promotes_buffered_records() {
    let (app, _state) = create_test_app(ConsentValue::Pending);

    for n in 1..=3 {
        post_record(&app, json!(n)).await;
    }
    send(
        &app,
        json_request("PUT", "/consent", json!({ "consent": "granted" })),
    )
    .await;
    for n in 4..=5 {
        post_record(&app, json!(n)).await;
    }

    // Listing runs on the writer queue, after the migration and the writes.
    let (_, body) = send(&app, get("/api/records/authorized")).await;
    assert_eq!(
        payloads(&body),
        vec![json!(1), json!(2), json!(3), json!(4), json!(5)]
    );

    let (_, body) = send(&app, get("/api/records/pending")).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_revoking_consent_discards_everything() {
    let (app, _state) = create_test_app(ConsentValue::Granted);

    post_record(&app, json!("before")).await;
    send(
        &app,
        json_request("PUT", "/consent", json!({ "consent": "not_granted" })),
    )
    .await;
    post_record(&app, json!("after")).await;

    let (_, authorized) = send(&app, get("/api/records/authorized")).await;
    let (_, provisional) = send(&app, get("/api/records/provisional")).await;
    assert_eq!(authorized["count"], 0);
    assert_eq!(provisional["count"], 0);
}

#[tokio::test]
async fn test_area_names_are_case_insensitive() {
    let (app, state) = create_test_app(ConsentValue::Granted);

    post_record(&app, json!("kept")).await;
    state.writer.flush().await;

    let (status, body) = send(&app, get("/api/records/Authorized")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"], "authorized");
    assert_eq!(payloads(&body), vec![json!("kept")]);
}

#[tokio::test]
async fn test_unknown_area_is_rejected() {
    let (app, _state) = create_test_app(ConsentValue::Pending);

    let (status, _) = send(&app, get("/api/records/trash")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Batch hand-off tests
// ============================================================================

#[tokio::test]
async fn test_batch_and_ack() {
    let (app, _state) = create_test_app(ConsentValue::Granted);

    for n in 1..=3 {
        post_record(&app, json!(n)).await;
    }

    let (status, batch) = send(
        &app,
        json_request("POST", "/api/batches?limit=2", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payloads(&batch), vec![json!(1), json!(2)]);

    let keys: Vec<Value> = batch["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["key"].clone())
        .collect();
    let (status, ack) = send(
        &app,
        json_request("POST", "/api/batches/ack", json!({ "keys": keys })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "removed": 2 }));

    let (_, remaining) = send(&app, get("/api/records/authorized")).await;
    assert_eq!(payloads(&remaining), vec![json!(3)]);
}

#[tokio::test]
async fn test_batch_limit_is_validated() {
    let (app, _state) = create_test_app(ConsentValue::Granted);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/batches?limit=0", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
