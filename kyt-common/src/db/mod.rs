//! Database layer
//!
//! Schema initialization and row models for the submission workflow.

pub mod init;
pub mod models;

pub use init::{get_setting_i64, init_database, init_in_memory};
