//! Submission creation and form intake handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kyt_common::db::models::{FormKind, Submission};
use kyt_common::ids::{MarketerId, SubmissionId};
use kyt_common::Error;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::workflow::forms;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub marketer_id: MarketerId,
}

/// POST /api/submissions
///
/// A submission comes into existence when the marketer begins the first
/// form; it starts in `pending_admin_review` with empty form slots.
pub async fn create_submission(
    State(state): State<AppState>,
    Json(request): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let submission = crate::db::insert_submission(&state.db, request.marketer_id).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitFormRequest {
    pub payload: serde_json::Value,
}

/// POST /api/submissions/:id/forms/:form
///
/// Submit or re-submit one of the three intake forms. Unknown form names
/// fail with 400; everything else about the payload is opaque to the core.
pub async fn submit_form(
    State(state): State<AppState>,
    Path((id, form)): Path<(String, String)>,
    Json(request): Json<SubmitFormRequest>,
) -> Result<Json<Submission>, ApiError> {
    let id = parse_submission_id(&id)?;
    let kind: FormKind = form.parse()?;

    let submission = forms::submit_form(&state.db, &state.bus, id, kind, request.payload).await?;
    Ok(Json(submission))
}

/// Parse a path segment as a submission id
pub fn parse_submission_id(raw: &str) -> Result<SubmissionId, Error> {
    raw.parse()
        .map_err(|_| Error::Validation(format!("invalid submission id: {raw}")))
}
