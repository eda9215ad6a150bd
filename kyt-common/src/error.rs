//! Common error types for KYT

use thiserror::Error;

/// Common result type for KYT operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the KYT workflow core.
///
/// All failure modes are per-request: an error is reported to the caller of
/// the single action that produced it and the submission row is left
/// untouched. The core never retries on its own: retrying an
/// `IllegalTransition` can never succeed, and retrying a
/// `ConcurrentModification` requires a fresh read first.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown submission id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Form name outside {biodata, guarantor, commitment}
    #[error("Invalid form name: {0}")]
    InvalidFormName(String),

    /// Action attempted from a state not in its permitted source set,
    /// or a transition guard failed. Carries the actual current status
    /// so the caller can resynchronize.
    #[error("Illegal transition: {action} not permitted from status {current}")]
    IllegalTransition { action: String, current: String },

    /// Lost an optimistic-concurrency race on the same submission.
    /// The caller should re-read before retrying.
    #[error("Concurrent modification of submission {0}")]
    ConcurrentModification(String),

    /// Invalid request payload (e.g. empty required notes on review)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
