//! External audit-append handler
//!
//! The excluded activity-logging collaborator records free-form actions
//! against a submission's audit history. These rows carry no status
//! transition and the timeline builder ignores them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kyt_common::events::KytEvent;
use kyt_common::time;
use kyt_common::Error;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::submissions::parse_submission_id;
use crate::db::{append_audit, NewAudit};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub action_type: String,
    pub details: Option<String>,
    /// Identity of the collaborator appending the record, if known
    pub actor_guid: Option<String>,
}

/// POST /api/submissions/:id/log
pub async fn append_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<LogRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = parse_submission_id(&id)?;
    let action = request.action_type.trim();
    if action.is_empty() {
        return Err(Error::Validation("action_type must be non-empty".to_string()).into());
    }

    // The submission must exist before anything is logged against it
    crate::db::fetch_submission(&state.db, id).await?;

    let now = time::now();
    append_audit(
        &state.db,
        &NewAudit {
            submission_id: id,
            actor_guid: request.actor_guid.as_deref().unwrap_or("external"),
            actor_role: None,
            action,
            from_status: None,
            to_status: None,
            notes: request.details.as_deref(),
            created_at: now,
        },
    )
    .await?;

    state.bus.emit(KytEvent::AuditAppended {
        submission_id: id,
        action: action.to_string(),
        timestamp: now,
    });

    Ok((StatusCode::CREATED, Json(json!({ "status": "ok" }))))
}
