//! Integration tests for the kyt-vt HTTP API
//!
//! Router-level tests driving the full stack (handlers, engine, database)
//! against an in-memory database via `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use kyt_common::config::SlaThresholds;
use kyt_common::db::init_in_memory;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use kyt_vt::{build_router, AppState};

/// Test helper: build app over a fresh in-memory database
async fn setup_app() -> axum::Router {
    let pool = init_in_memory().await.expect("in-memory database");
    let sla = SlaThresholds::load(&pool).await.expect("sla settings");
    build_router(AppState::new(pool, sla))
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

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn admin() -> Value {
    json!({ "guid": "admin-1", "role": "admin" })
}

fn superadmin() -> Value {
    json!({ "guid": "superadmin-1", "role": "superadmin" })
}

fn masteradmin() -> Value {
    json!({ "guid": "masteradmin-1", "role": "masteradmin" })
}

/// Create a submission and return its id
async fn create_submission(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(post("/api/submissions", json!({ "marketer_id": uuid::Uuid::new_v4() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    body["id"].as_str().unwrap().to_string()
}

/// Submit all three forms over HTTP
async fn submit_all_forms(app: &axum::Router, id: &str) {
    for form in ["biodata", "guarantor", "commitment"] {
        let response = app
            .clone()
            .oneshot(post(
                &format!("/api/submissions/{id}/forms/{form}"),
                json!({ "payload": { "form": form } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "submitting {form}");
    }
}

/// Walk a submission to pending_superadmin_review
async fn advance_to_superadmin_queue(app: &axum::Router, id: &str) {
    submit_all_forms(app, id).await;

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/submissions/{id}/admin/verification"),
            json!({ "actor": admin(), "notes": "docs attached" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post(&format!("/api/submissions/{id}/admin/send"), json!({ "actor": admin() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "kyt-vt");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_create_submission_starts_pending() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(post("/api/submissions", json!({ "marketer_id": uuid::Uuid::new_v4() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "pending_admin_review");
    assert_eq!(body["biodata"]["submitted"], false);
}

#[tokio::test]
async fn test_unknown_form_name_is_rejected() {
    let app = setup_app().await;
    let id = create_submission(&app).await;

    let response = app
        .clone()
        .oneshot(post(&format!("/api/submissions/{id}/forms/passport"), json!({ "payload": {} })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "invalid_form_name");
}

#[tokio::test]
async fn test_timeline_reflects_partial_forms() {
    let app = setup_app().await;
    let id = create_submission(&app).await;

    let response = app
        .clone()
        .oneshot(post(&format!("/api/submissions/{id}/forms/biodata"), json!({ "payload": {} })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get(&format!("/api/submissions/{id}/timeline"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["current_status"], "pending_admin_review");
    assert_eq!(body["progress_percentage"], 8.3);
    assert_eq!(body["stages"][0]["name"], "forms");
    assert_eq!(body["stages"][0]["status"], "in_progress");
    assert_eq!(body["is_stuck"], false);
    assert_eq!(body["bottleneck_stage"], Value::Null);
}

#[tokio::test]
async fn test_full_pipeline_over_http() {
    let app = setup_app().await;
    let id = create_submission(&app).await;
    advance_to_superadmin_queue(&app, &id).await;

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/submissions/{id}/superadmin/review"),
            json!({ "actor": superadmin(), "result": "approved", "notes": "checks out" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    // Auto-advanced past the transient verified status
    assert_eq!(body["status"], "pending_masteradmin_approval");

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/submissions/{id}/masteradmin/decision"),
            json!({ "actor": masteradmin(), "result": "approved" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get(&format!("/api/submissions/{id}/timeline"))).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["current_status"], "approved");
    assert_eq!(body["progress_percentage"], 100.0);
    for stage in body["stages"].as_array().unwrap() {
        assert_eq!(stage["status"], "completed");
    }
}

#[tokio::test]
async fn test_illegal_transition_returns_conflict_with_current_status() {
    let app = setup_app().await;
    let id = create_submission(&app).await;

    // MasterAdmin decision straight from pending_admin_review
    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/submissions/{id}/masteradmin/decision"),
            json!({ "actor": masteradmin(), "result": "approved" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "illegal_transition");
    assert_eq!(body["current_status"], "pending_admin_review");
}

#[tokio::test]
async fn test_empty_review_notes_are_unprocessable() {
    let app = setup_app().await;
    let id = create_submission(&app).await;
    advance_to_superadmin_queue(&app, &id).await;

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/submissions/{id}/superadmin/review"),
            json!({ "actor": superadmin(), "result": "rejected", "notes": "  " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let app = setup_app().await;

    let ghost = uuid::Uuid::new_v4();
    let response = app.clone().oneshot(get(&format!("/api/submissions/{ghost}/timeline"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_timelines_filter_by_status() {
    let app = setup_app().await;
    let moving = create_submission(&app).await;
    advance_to_superadmin_queue(&app, &moving).await;
    let _fresh = create_submission(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/timelines?status=pending_superadmin_review"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let timelines = body.as_array().unwrap();
    assert_eq!(timelines.len(), 1);
    assert_eq!(timelines[0]["submission_id"], moving.as_str());

    // Unknown status filter is a validation error, not an empty result
    let response = app.clone().oneshot(get("/api/timelines?status=launched")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_stats_over_the_fleet() {
    let app = setup_app().await;

    // One completed, one untouched
    let done = create_submission(&app).await;
    advance_to_superadmin_queue(&app, &done).await;
    app.clone()
        .oneshot(post(
            &format!("/api/submissions/{done}/superadmin/review"),
            json!({ "actor": superadmin(), "result": "approved", "notes": "ok" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post(
            &format!("/api/submissions/{done}/masteradmin/decision"),
            json!({ "actor": masteradmin(), "result": "approved" }),
        ))
        .await
        .unwrap();
    let _fresh = create_submission(&app).await;

    let response = app.clone().oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["completed"], 1);
    assert_eq!(body["in_progress"], 1);
    assert_eq!(body["stuck"], 0);
    assert!(body["average_completion_ms"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_external_log_append() {
    let app = setup_app().await;
    let id = create_submission(&app).await;

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/submissions/{id}/log"),
            json!({ "action_type": "document_viewed", "details": "admin opened biodata scan" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Missing action_type is rejected
    let response = app
        .clone()
        .oneshot(post(&format!("/api/submissions/{id}/log"), json!({ "action_type": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_reset_endpoint_rewinds() {
    let app = setup_app().await;
    let id = create_submission(&app).await;
    advance_to_superadmin_queue(&app, &id).await;

    let response = app
        .clone()
        .oneshot(post(&format!("/api/submissions/{id}/admin/reset"), json!({ "actor": admin() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "pending_admin_review");
    assert_eq!(body["admin_verification"]["uploaded_at"], Value::Null);
    // Forms are left intact
    assert_eq!(body["biodata"]["submitted"], true);
}
