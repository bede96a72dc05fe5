//! Integration tests for the results-stack session endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use procura_server::{config::Config, routes, state::AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app() -> Router {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Config::default()
    };
    routes::router(Arc::new(AppState::new(config)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn run_body(id: &str) -> Value {
    json!({
        "run": {
            "runId": id,
            "query": "rugged tablets under $2k",
            "vendorsSnapshot": {"vendors": [{"id": "v1", "name": "Acme"}]}
        }
    })
}

#[tokio::test]
async fn test_get_creates_default_session() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/api/kiba/sessions/s-1", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "s-1");
    assert_eq!(body["status"], "open");
    assert_eq!(body["currentStep"], "request");
    assert_eq!(body["version"], 1);
    assert_eq!(body["audit"].as_array().unwrap().len(), 1);
    assert_eq!(body["audit"][0]["event"], "session_init");

    // a second read returns the same record, not a fresh one
    let (_, again) = send(&app, "GET", "/api/kiba/sessions/s-1", Value::Null).await;
    assert_eq!(again["version"], 1);
}

#[tokio::test]
async fn test_patch_bumps_version_and_audits() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/kiba/sessions/s-1",
        json!({"currentStep": "vendorSearch"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStep"], "vendorSearch");
    assert_eq!(body["version"], 2);
    let audit = body["audit"].as_array().unwrap();
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[1]["event"], "patch");
    assert_eq!(audit[1]["payload"], json!(["currentStep"]));
}

#[tokio::test]
async fn test_patch_with_stale_version_conflicts() {
    let app = create_test_app();
    send(
        &app,
        "PATCH",
        "/api/kiba/sessions/s-1",
        json!({"currentStep": "vendorSearch"}),
    )
    .await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/kiba/sessions/s-1",
        json!({"currentStep": "evaluation", "version": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "version_conflict");
    assert_eq!(body["serverVersion"], 2);

    // record unchanged by the rejected patch
    let (_, session) = send(&app, "GET", "/api/kiba/sessions/s-1", Value::Null).await;
    assert_eq!(session["currentStep"], "vendorSearch");
    assert_eq!(session["version"], 2);
}

#[tokio::test]
async fn test_create_run_sets_active_run() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/kiba/sessions/s-1/runs",
        run_body("run-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steps"]["vendorSearch"]["activeRunId"], "run-1");
    assert_eq!(body["steps"]["vendorSearch"]["runs"][0]["runId"], "run-1");
    assert_eq!(body["steps"]["vendorSearch"]["runs"][0]["query"], "rugged tablets under $2k");
    assert_eq!(body["audit"].as_array().unwrap().last().unwrap()["event"], "run_created");

    let (status, body) = send(
        &app,
        "POST",
        "/api/kiba/sessions/s-1/runs",
        json!({"run": {"query": "missing id"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("run"));
}

#[tokio::test]
async fn test_patch_cannot_erase_run_history() {
    let app = create_test_app();
    send(&app, "POST", "/api/kiba/sessions/s-1/runs", run_body("run-1")).await;
    send(&app, "POST", "/api/kiba/sessions/s-1/runs", run_body("run-2")).await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/kiba/sessions/s-1",
        json!({"steps": {"vendorSearch": {"runs": [], "activeRunId": null}}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steps"]["vendorSearch"]["runs"].as_array().unwrap().len(), 2);
    assert_eq!(body["steps"]["vendorSearch"]["activeRunId"], "run-2");
}

#[tokio::test]
async fn test_close_preconditions_reported() {
    let app = create_test_app();

    let (status, _) = send(&app, "POST", "/api/kiba/sessions/missing/close", Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, "GET", "/api/kiba/sessions/s-1", Value::Null).await;
    let (status, body) = send(&app, "POST", "/api/kiba/sessions/s-1/close", Value::Null).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["failed_precondition"], "no vendor-search runs recorded");

    send(&app, "POST", "/api/kiba/sessions/s-1/runs", run_body("run-1")).await;
    let (_, body) = send(&app, "POST", "/api/kiba/sessions/s-1/close", Value::Null).await;
    assert_eq!(body["failed_precondition"], "shortlist is empty");

    send(
        &app,
        "PATCH",
        "/api/kiba/sessions/s-1",
        json!({"steps": {"evaluation": {"shortlistVendorIds": ["v1"]}}}),
    )
    .await;
    let (_, body) = send(&app, "POST", "/api/kiba/sessions/s-1/close", Value::Null).await;
    assert_eq!(body["failed_precondition"], "no vendor selected");
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = create_test_app();

    send(&app, "POST", "/api/kiba/sessions/s-1/runs", run_body("run-1")).await;

    // read-modify-write with the version token, the way the frontend does
    let (_, session) = send(&app, "GET", "/api/kiba/sessions/s-1", Value::Null).await;
    let version = session["version"].as_u64().unwrap();
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/kiba/sessions/s-1",
        json!({
            "version": version,
            "currentStep": "selection",
            "steps": {
                "request": {"title": "Rugged tablets"},
                "evaluation": {"shortlistVendorIds": ["v1"], "notesByVendorId": {"v1": "solid"}},
                "selection": {"selectedVendorId": "v1", "rationale": "best fit", "totalAwardAmount": 5400.0}
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/kiba/sessions/s-1/close", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["final"]["activeRunId"], "run-1");
    assert_eq!(body["final"]["selection"]["selectedVendorId"], "v1");
    assert_eq!(body["final"]["vendorsSnapshot"]["vendors"][0]["name"], "Acme");
    assert_eq!(body["audit"].as_array().unwrap().last().unwrap()["event"], "closed");
    // runs survive into the snapshot's steps
    assert_eq!(body["final"]["steps"]["vendorSearch"]["runs"][0]["runId"], "run-1");
}
