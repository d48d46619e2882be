//! Integration tests for the HTTP API
//!
//! Drives the axum router with `tower::util::oneshot` over the fake
//! converter; no network involved.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{configured_converter, FakeConverter, SESSION_ID};
use s2i_common::events::EventBus;
use s2i_ui::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

fn setup_app(converter: Arc<FakeConverter>) -> axum::Router {
    let state = AppState::new(
        converter.clone(),
        converter.clone(),
        converter.clone(),
        converter,
        EventBus::new(256),
    );
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    post(uri, json!({}))
}

fn put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON body")
}

async fn open_session(app: &axum::Router) -> Value {
    let response = app
        .clone()
        .oneshot(post("/api/session", json!({"session_id": SESSION_ID})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn session_uri(suffix: &str) -> String {
    format!("/api/session/{}{}", SESSION_ID, suffix)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = setup_app(configured_converter());
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["open_sessions"], 0);
}

#[tokio::test]
async fn open_session_rejects_malformed_id() {
    let app = setup_app(configured_converter());
    let response = app
        .oneshot(post("/api/session", json!({"session_id": "not-a-uuid"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn open_session_surfaces_converter_eviction() {
    let converter = configured_converter();
    converter.session_gone.store(true, Ordering::SeqCst);
    let app = setup_app(converter);

    let response = app
        .oneshot(post("/api/session", json!({"session_id": SESSION_ID})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn session_lifecycle_open_snapshot_close() {
    let app = setup_app(configured_converter());

    let snapshot = open_session(&app).await;
    assert_eq!(snapshot["session_id"], SESSION_ID);
    assert_eq!(snapshot["current_step"], 1);
    assert_eq!(snapshot["file_count"], 2);
    assert_eq!(snapshot["export_phase"]["phase"], "unvalidated");

    let response = app.clone().oneshot(get(&session_uri(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(delete(&session_uri(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get(&session_uri(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shift_selection_sequence_over_the_api() {
    let app = setup_app(configured_converter());
    open_session(&app).await;
    app.clone()
        .oneshot(post_empty(&session_uri("/review/reload")))
        .await
        .unwrap();

    let select = |id: &str, multi: bool| {
        post(&session_uri("/review/select"), json!({"feature_id": id, "multi": multi}))
    };

    app.clone().oneshot(select("u1", false)).await.unwrap();
    app.clone().oneshot(select("u2", true)).await.unwrap();
    let response = app.clone().oneshot(select("u1", true)).await.unwrap();
    assert_eq!(body_json(response).await["selected"], json!(["u2"]));

    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/review/deselect")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["selected"], json!([]));
}

#[tokio::test]
async fn filter_projection_is_stable_and_pure() {
    let app = setup_app(configured_converter());
    open_session(&app).await;
    app.clone()
        .oneshot(post_empty(&session_uri("/review/reload")))
        .await
        .unwrap();

    let filters = json!({"feature_type": "unit"});
    let first = body_json(
        app.clone()
            .oneshot(put(&session_uri("/review/filters"), filters.clone()))
            .await
            .unwrap(),
    )
    .await;
    let second = body_json(
        app.clone()
            .oneshot(put(&session_uri("/review/filters"), filters))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first["visible_count"], 2);
    assert_eq!(first["features"], second["features"]);
    assert_eq!(first["total_count"], 3);

    // Dropping the filters returns the full list.
    let all = body_json(
        app.clone()
            .oneshot(put(&session_uri("/review/filters"), json!({})))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(all["visible_count"], 3);
}

#[tokio::test]
async fn wizard_refusal_carries_the_predicate_reason() {
    let converter = Arc::new(FakeConverter::new());
    converter
        .files
        .lock()
        .unwrap()
        .push(common::imported_file("mystery", None, None));
    let app = setup_app(converter);
    open_session(&app).await;

    // Import is satisfied, so the first `next` moves to Classify.
    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/wizard/next")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["moved"], true);
    assert_eq!(body["step"], 2);

    // Classify is not: the refusal names the unclassified stem.
    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/wizard/next")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["moved"], false);
    assert_eq!(body["step"], 2);
    assert!(body["reason"].as_str().unwrap().contains("mystery"));
}

#[tokio::test]
async fn jump_to_summary_and_confirm_generates_the_draft() {
    let app = setup_app(configured_converter());
    open_session(&app).await;

    let response = app
        .clone()
        .oneshot(post(&session_uri("/wizard/jump"), json!({"step": 10})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["moved"], true);
    assert_eq!(body["step"], 10);

    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/wizard/confirm")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["generated_feature_count"], 2);

    let snapshot = body_json(app.clone().oneshot(get(&session_uri(""))).await.unwrap()).await;
    assert_eq!(snapshot["generation_status"], "draft_ready");
    assert_eq!(snapshot["feature_count"], 5);
}

#[tokio::test]
async fn blocked_export_returns_conflict() {
    let converter = configured_converter();
    converter.push_validation(export_report(1));
    let app = setup_app(converter);
    open_session(&app).await;

    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/validate")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["summary"]["error_count"], 1);

    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/export/request")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(body["error"]["message"].as_str().unwrap().contains("blocked"));
}

#[tokio::test]
async fn clean_validation_opens_export_and_streams_the_archive() {
    let app = setup_app(configured_converter());
    open_session(&app).await;

    app.clone().oneshot(post_empty(&session_uri("/validate"))).await.unwrap();
    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/export/request")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/export/confirm")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("venue.imdf.zip"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn mid_flight_eviction_clears_the_local_store() {
    let converter = configured_converter();
    let app = setup_app(converter.clone());
    open_session(&app).await;

    converter.session_gone.store(true, Ordering::SeqCst);
    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/validate")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "SESSION_NOT_FOUND");

    // The store is gone too: the snapshot now 404s without touching the
    // converter.
    let response = app.clone().oneshot(get(&session_uri(""))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn undo_endpoint_is_a_noop_on_empty_history() {
    let app = setup_app(configured_converter());
    open_session(&app).await;

    let response = app
        .clone()
        .oneshot(post_empty(&session_uri("/review/undo")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "empty");
    assert_eq!(body["history_depth"], 0);
}

/// One-error validation report for export gating tests
fn export_report(errors: usize) -> s2i_ui::models::ValidationReport {
    s2i_ui::models::ValidationReport {
        errors: (0..errors)
            .map(|i| s2i_ui::models::ValidationIssue {
                feature_id: Some(format!("e{}", i)),
                related_feature_id: None,
                check: "missing_level_id".to_string(),
                message: "level_id is required".to_string(),
                severity: s2i_ui::models::Severity::Error,
                auto_fixable: false,
                fix_description: None,
                overlap_geometry: None,
            })
            .collect(),
        warnings: Vec::new(),
        passed: Vec::new(),
        summary: s2i_ui::models::ValidationSummary {
            total_features: 3,
            error_count: errors,
            warning_count: 0,
            auto_fixable_count: 0,
        },
    }
}
