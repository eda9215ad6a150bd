//! Aggregate statistics handler

use axum::{
    extract::{Query, State},
    Json,
};

use crate::api::error::ApiError;
use crate::api::timeline::{fetch_timelines, TimelineQuery};
use crate::timeline::{compute_stats, AggregateStats};
use crate::AppState;

/// GET /api/stats
///
/// Fleet-level counters over the (optionally filtered) submission set.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<AggregateStats>, ApiError> {
    let timelines = fetch_timelines(&state, &query).await?;
    Ok(Json(compute_stats(&timelines)))
}
