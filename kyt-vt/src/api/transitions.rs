//! Workflow transition handlers
//!
//! One handler per actor action. All of them delegate to the transition
//! engine; the handlers only shape requests and responses.

use axum::{
    extract::{Path, State},
    Json,
};
use kyt_common::db::models::{Actor, ReviewResult, Submission};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::submissions::parse_submission_id;
use crate::workflow::WorkflowAction;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadVerificationRequest {
    pub actor: Actor,
    pub notes: Option<String>,
}

/// POST /api/submissions/:id/admin/verification
///
/// Gated on all three forms being submitted.
pub async fn upload_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UploadVerificationRequest>,
) -> Result<Json<Submission>, ApiError> {
    let id = parse_submission_id(&id)?;
    let submission = state
        .engine()
        .apply(
            id,
            WorkflowAction::AdminUploadVerification,
            &request.actor,
            request.notes.as_deref(),
        )
        .await?;
    Ok(Json(submission))
}

#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: Actor,
}

/// POST /api/submissions/:id/admin/send
pub async fn send_to_superadmin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<Submission>, ApiError> {
    let id = parse_submission_id(&id)?;
    let submission = state
        .engine()
        .apply(id, WorkflowAction::AdminSendToSuperAdmin, &request.actor, None)
        .await?;
    Ok(Json(submission))
}

#[derive(Debug, Deserialize)]
pub struct SuperAdminReviewRequest {
    pub actor: Actor,
    pub result: ReviewResult,
    /// Required non-empty for both outcomes
    pub notes: String,
}

/// POST /api/submissions/:id/superadmin/review
///
/// Verification auto-advances the submission to the masteradmin queue;
/// rejection is terminal.
pub async fn superadmin_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SuperAdminReviewRequest>,
) -> Result<Json<Submission>, ApiError> {
    let id = parse_submission_id(&id)?;
    let action = match request.result {
        ReviewResult::Approved => WorkflowAction::SuperAdminVerify,
        ReviewResult::Rejected => WorkflowAction::SuperAdminReject,
    };
    let submission = state
        .engine()
        .apply(id, action, &request.actor, Some(&request.notes))
        .await?;
    Ok(Json(submission))
}

#[derive(Debug, Deserialize)]
pub struct MasterDecisionRequest {
    pub actor: Actor,
    pub result: ReviewResult,
}

/// POST /api/submissions/:id/masteradmin/decision
pub async fn masteradmin_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MasterDecisionRequest>,
) -> Result<Json<Submission>, ApiError> {
    let id = parse_submission_id(&id)?;
    let action = match request.result {
        ReviewResult::Approved => WorkflowAction::MasterAdminApprove,
        ReviewResult::Rejected => WorkflowAction::MasterAdminReject,
    };
    let submission = state.engine().apply(id, action, &request.actor, None).await?;
    Ok(Json(submission))
}

/// POST /api/submissions/:id/admin/reset
///
/// Administrative rewind of a submission awaiting superadmin review.
/// Audit-logged with the invoking actor.
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<Submission>, ApiError> {
    let id = parse_submission_id(&id)?;
    let submission = state
        .engine()
        .apply(id, WorkflowAction::AdminReset, &request.actor, None)
        .await?;
    Ok(Json(submission))
}
