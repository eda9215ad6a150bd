//! Submission row queries

use kyt_common::db::models::{Submission, SubmissionStatus};
use kyt_common::ids::{MarketerId, SubmissionId};
use kyt_common::time;
use kyt_common::{Error, Result};
use sqlx::SqlitePool;

/// Create a fresh submission in `pending_admin_review`.
///
/// A submission comes into existence when the marketer begins the first
/// form; all three form slots start empty.
pub async fn insert_submission(pool: &SqlitePool, marketer_id: MarketerId) -> Result<Submission> {
    let id = SubmissionId::new();
    let now = time::now();

    sqlx::query(
        r#"
        INSERT INTO submissions (guid, marketer_guid, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(marketer_id.to_string())
    .bind(SubmissionStatus::PendingAdminReview.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    fetch_submission(pool, id).await
}

/// Load one submission by id
pub async fn fetch_submission(pool: &SqlitePool, id: SubmissionId) -> Result<Submission> {
    let row = sqlx::query("SELECT * FROM submissions WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Submission::from_row(&row),
        None => Err(Error::NotFound(format!("submission {id}"))),
    }
}

/// Optional filters for collection reads. `stuck` is not here; it is a
/// derived verdict, applied after timeline analysis.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub marketer_id: Option<MarketerId>,
}

/// Load submissions matching the filter, oldest first
pub async fn fetch_submissions(
    pool: &SqlitePool,
    filter: &SubmissionFilter,
) -> Result<Vec<Submission>> {
    let mut sql = String::from("SELECT * FROM submissions WHERE 1=1");
    if filter.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if filter.marketer_id.is_some() {
        sql.push_str(" AND marketer_guid = ?");
    }
    sql.push_str(" ORDER BY created_at ASC");

    let mut query = sqlx::query(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status.as_str());
    }
    if let Some(marketer_id) = filter.marketer_id {
        query = query.bind(marketer_id.to_string());
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(Submission::from_row).collect()
}
