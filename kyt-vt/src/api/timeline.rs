//! Timeline read handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use kyt_common::time;
use kyt_common::Error;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::submissions::parse_submission_id;
use crate::db::SubmissionFilter;
use crate::timeline::{analyze, Timeline};
use crate::AppState;

/// GET /api/submissions/:id/timeline
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Timeline>, ApiError> {
    let id = parse_submission_id(&id)?;
    let submission = crate::db::fetch_submission(&state.db, id).await?;
    let audit = crate::db::fetch_audit(&state.db, id).await?;

    Ok(Json(analyze(&submission, &audit, &state.sla, time::now())))
}

/// Collection filters. `status` and `marketer_id` are pushed into SQL;
/// `stuck` is a derived verdict and filters after analysis.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub status: Option<String>,
    pub marketer_id: Option<String>,
    pub stuck: Option<bool>,
}

/// GET /api/timelines
pub async fn list_timelines(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<Timeline>>, ApiError> {
    let timelines = fetch_timelines(&state, &query).await?;
    Ok(Json(timelines))
}

/// Load and analyze every submission matching the filter. Shared with the
/// stats handler so both views agree on filtering semantics.
pub async fn fetch_timelines(
    state: &AppState,
    query: &TimelineQuery,
) -> Result<Vec<Timeline>, Error> {
    let filter = SubmissionFilter {
        status: query
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| Error::Validation(format!("unknown status filter: {:?}", query.status)))?,
        marketer_id: query
            .marketer_id
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| {
                Error::Validation(format!("invalid marketer id filter: {:?}", query.marketer_id))
            })?,
    };

    let submissions = crate::db::fetch_submissions(&state.db, &filter).await?;
    let now = time::now();

    let mut timelines = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        let audit = crate::db::fetch_audit(&state.db, submission.id).await?;
        timelines.push(analyze(submission, &audit, &state.sla, now));
    }

    if let Some(stuck) = query.stuck {
        timelines.retain(|t| t.is_stuck == stuck);
    }

    Ok(timelines)
}
