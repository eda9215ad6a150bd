//! kyt-vt library - Verification Tracker module
//!
//! Tracks marketer KYC submissions through Admin, SuperAdmin, and
//! MasterAdmin review, and serves the derived timeline/progress/SLA views.

use axum::Router;
use kyt_common::config::SlaThresholds;
use kyt_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod api;
pub mod db;
pub mod timeline;
pub mod workflow;

use workflow::TransitionEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event broadcast bus feeding the SSE stream
    pub bus: Arc<EventBus>,
    /// SLA thresholds loaded from the settings table at startup
    pub sla: SlaThresholds,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, sla: SlaThresholds) -> Self {
        Self {
            db,
            bus: Arc::new(EventBus::default()),
            sla,
        }
    }

    /// Transition engine bound to this state's pool and bus
    pub fn engine(&self) -> TransitionEngine {
        TransitionEngine::new(self.db.clone(), self.bus.clone())
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/submissions", post(api::create_submission))
        .route("/api/submissions/:id/forms/:form", post(api::submit_form))
        .route(
            "/api/submissions/:id/admin/verification",
            post(api::upload_verification),
        )
        .route("/api/submissions/:id/admin/send", post(api::send_to_superadmin))
        .route(
            "/api/submissions/:id/superadmin/review",
            post(api::superadmin_review),
        )
        .route(
            "/api/submissions/:id/masteradmin/decision",
            post(api::masteradmin_decision),
        )
        .route("/api/submissions/:id/admin/reset", post(api::reset))
        .route("/api/submissions/:id/timeline", get(api::get_timeline))
        .route("/api/submissions/:id/log", post(api::append_log))
        .route("/api/timelines", get(api::list_timelines))
        .route("/api/stats", get(api::get_stats))
        .route("/api/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
