//! HTTP API handlers for kyt-vt

pub mod error;
pub mod health;
pub mod log;
pub mod sse;
pub mod stats;
pub mod submissions;
pub mod timeline;
pub mod transitions;

pub use error::ApiError;
pub use health::health_routes;
pub use log::append_log;
pub use sse::event_stream;
pub use stats::get_stats;
pub use submissions::{create_submission, submit_form};
pub use timeline::{get_timeline, list_timelines};
pub use transitions::{
    masteradmin_decision, reset, send_to_superadmin, superadmin_review, upload_verification,
};
