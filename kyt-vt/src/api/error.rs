//! HTTP mapping for workflow errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kyt_common::Error;
use serde_json::json;
use tracing::error;

/// Wrapper so core errors can flow out of handlers with `?`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::InvalidFormName(_) => (StatusCode::BAD_REQUEST, "invalid_form_name"),
            Error::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            // 409 carries the actual current status so the caller can
            // resynchronize before retrying
            Error::IllegalTransition { .. } => (StatusCode::CONFLICT, "illegal_transition"),
            Error::ConcurrentModification(_) => (StatusCode::CONFLICT, "concurrent_modification"),
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                error!("Internal error serving request: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut body = json!({
            "error": kind,
            "message": self.0.to_string(),
        });
        if let Error::IllegalTransition { current, .. } = &self.0 {
            body["current_status"] = json!(current);
        }

        (status, Json(body)).into_response()
    }
}
