//! Audit history queries
//!
//! The audit table is append-only: rows are inserted inside the same
//! transaction as the state write they describe, and nothing ever updates
//! or deletes them.

use chrono::{DateTime, Utc};
use kyt_common::db::models::{ActorRole, AuditRecord, SubmissionStatus};
use kyt_common::ids::SubmissionId;
use kyt_common::Result;
use sqlx::{Executor, Sqlite, SqlitePool};

/// One audit row to append
#[derive(Debug, Clone)]
pub struct NewAudit<'a> {
    pub submission_id: SubmissionId,
    pub actor_guid: &'a str,
    pub actor_role: Option<ActorRole>,
    pub action: &'a str,
    pub from_status: Option<SubmissionStatus>,
    pub to_status: Option<SubmissionStatus>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Append one audit row. Takes any executor so callers can append inside
/// the transaction that performs the matching state write.
pub async fn append_audit<'e, E>(executor: E, audit: &NewAudit<'_>) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO submission_audit
            (submission_guid, actor_guid, actor_role, action, from_status, to_status, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(audit.submission_id.to_string())
    .bind(audit.actor_guid)
    .bind(audit.actor_role.map(|r| r.as_str()))
    .bind(audit.action)
    .bind(audit.from_status.map(|s| s.as_str()))
    .bind(audit.to_status.map(|s| s.as_str()))
    .bind(audit.notes)
    .bind(audit.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Load the full audit history for one submission, oldest first
pub async fn fetch_audit(pool: &SqlitePool, id: SubmissionId) -> Result<Vec<AuditRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM submission_audit WHERE submission_guid = ? ORDER BY id ASC",
    )
    .bind(id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(AuditRecord::from_row).collect()
}
