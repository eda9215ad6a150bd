//! Server-Sent Events for workflow activity

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /api/events - SSE stream of workflow events
///
/// Streams FormSubmitted/StatusChanged/SubmissionReset/AuditAppended
/// events plus a heartbeat, so dashboards can refresh without polling.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    kyt_common::sse::create_event_sse_stream(state.bus.clone(), "kyt-vt")
}
