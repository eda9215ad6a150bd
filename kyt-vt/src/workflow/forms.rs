//! Form registry
//!
//! Tracks completion of the three intake forms (biodata, guarantor,
//! commitment). Submitting a form never changes `submissions.status`; it
//! only gates the first workflow transition.

use kyt_common::db::models::{FormKind, Submission};
use kyt_common::events::{EventBus, KytEvent};
use kyt_common::ids::SubmissionId;
use kyt_common::time;
use kyt_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Submit (or re-submit) one form.
///
/// Re-submission overwrites the payload and `submitted_at` but leaves the
/// completion flag set: submitting the same form twice is idempotent with
/// respect to workflow progress. Terminal submissions reject all writes.
pub async fn submit_form(
    pool: &SqlitePool,
    bus: &Arc<EventBus>,
    id: SubmissionId,
    kind: FormKind,
    payload: serde_json::Value,
) -> Result<Submission> {
    let now = time::now();
    let payload_text = serde_json::to_string(&payload)
        .map_err(|e| Error::Validation(format!("unserializable form payload: {e}")))?;

    let mut tx = pool.begin().await?;

    let row = sqlx::query("SELECT * FROM submissions WHERE guid = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?;
    let submission = match row {
        Some(row) => Submission::from_row(&row)?,
        None => return Err(Error::NotFound(format!("submission {id}"))),
    };

    if submission.status.is_terminal() {
        return Err(Error::IllegalTransition {
            action: "form.submit".to_string(),
            current: submission.status.as_str().to_string(),
        });
    }

    let sql = format!(
        r#"
        UPDATE submissions
        SET {form}_submitted = 1, {form}_submitted_at = ?, {form}_payload = ?,
            updated_at = ?, version = version + 1
        WHERE guid = ? AND version = ?
        "#,
        form = kind.as_str()
    );
    let result = sqlx::query(&sql)
        .bind(now)
        .bind(payload_text)
        .bind(now)
        .bind(id.to_string())
        .bind(submission.version)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::ConcurrentModification(id.to_string()));
    }

    tx.commit().await?;

    let submission = crate::db::fetch_submission(pool, id).await?;
    info!(
        "Submission {} received form {} ({}/3 submitted)",
        id,
        kind,
        submission.forms_submitted_count()
    );

    bus.emit(KytEvent::FormSubmitted {
        submission_id: id,
        form: kind,
        forms_submitted: submission.forms_submitted_count(),
        timestamp: now,
    });

    Ok(submission)
}

/// Whether review can begin: all three forms submitted
pub fn all_forms_submitted(submission: &Submission) -> bool {
    submission.all_forms_submitted()
}
