//! Database queries for the verification tracker

pub mod audit;
pub mod submissions;

pub use audit::{append_audit, fetch_audit, NewAudit};
pub use submissions::{fetch_submission, fetch_submissions, insert_submission, SubmissionFilter};
