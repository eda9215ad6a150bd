//! Transition engine
//!
//! Applies one actor action to one submission: loads the row, checks the
//! transition table and guards, performs the write with an optimistic
//! version check, and appends the matching audit rows, all inside a single
//! transaction. A failed action leaves the submission untouched.

use crate::db::audit::{append_audit, NewAudit};
use crate::workflow::machine::{target_status, WorkflowAction};
use kyt_common::db::models::{Actor, Submission, SubmissionStatus};
use kyt_common::events::{EventBus, KytEvent};
use kyt_common::ids::SubmissionId;
use kyt_common::time;
use kyt_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

/// Audit action name for the automatic superadmin-verified hop
const AUTO_ADVANCE_ACTION: &str = "workflow.auto_advance";

#[derive(Clone)]
pub struct TransitionEngine {
    db: SqlitePool,
    bus: Arc<EventBus>,
}

impl TransitionEngine {
    pub fn new(db: SqlitePool, bus: Arc<EventBus>) -> Self {
        Self { db, bus }
    }

    /// Apply one action on behalf of an actor.
    ///
    /// Returns the submission as committed. Errors:
    /// - `NotFound`: unknown submission id
    /// - `Validation`: wrong actor role, or missing required notes
    /// - `IllegalTransition`: wrong source status or failed guard
    /// - `ConcurrentModification`: another writer committed first
    pub async fn apply(
        &self,
        id: SubmissionId,
        action: WorkflowAction,
        actor: &Actor,
        notes: Option<&str>,
    ) -> Result<Submission> {
        let now = time::now();
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        if actor.role != action.required_role() {
            return Err(Error::Validation(format!(
                "{} requires role {}, actor has role {}",
                action,
                action.required_role().as_str(),
                actor.role.as_str()
            )));
        }
        if action.requires_notes() && notes.is_none() {
            return Err(Error::Validation(format!("{action} requires non-empty notes")));
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query("SELECT * FROM submissions WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let submission = match row {
            Some(row) => Submission::from_row(&row)?,
            None => return Err(Error::NotFound(format!("submission {id}"))),
        };
        let current = submission.status;

        let target = target_status(current, action)?;

        // Guard: verification cannot be uploaded until the marketer has
        // submitted all three forms
        if action == WorkflowAction::AdminUploadVerification && !submission.all_forms_submitted() {
            return Err(Error::IllegalTransition {
                action: action.as_str().to_string(),
                current: current.as_str().to_string(),
            });
        }

        // The transient superadmin_verified status never rests in the
        // status column
        let final_status = if target == SubmissionStatus::SuperadminVerified {
            SubmissionStatus::PendingMasterApproval
        } else {
            target
        };

        let result = match action {
            WorkflowAction::AdminUploadVerification => {
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET status = ?, admin_uploaded_at = ?, admin_notes = ?,
                        updated_at = ?, version = version + 1
                    WHERE guid = ? AND version = ?
                    "#,
                )
                .bind(final_status.as_str())
                .bind(now)
                .bind(notes)
                .bind(now)
                .bind(id.to_string())
                .bind(submission.version)
                .execute(&mut *tx)
                .await?
            }
            WorkflowAction::AdminSendToSuperAdmin => {
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET status = ?, updated_at = ?, version = version + 1
                    WHERE guid = ? AND version = ?
                    "#,
                )
                .bind(final_status.as_str())
                .bind(now)
                .bind(id.to_string())
                .bind(submission.version)
                .execute(&mut *tx)
                .await?
            }
            WorkflowAction::SuperAdminVerify | WorkflowAction::SuperAdminReject => {
                let review_result = if action == WorkflowAction::SuperAdminVerify {
                    "approved"
                } else {
                    "rejected"
                };
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET status = ?, superadmin_reviewed_at = ?, superadmin_result = ?,
                        superadmin_notes = ?, updated_at = ?, version = version + 1
                    WHERE guid = ? AND version = ?
                    "#,
                )
                .bind(final_status.as_str())
                .bind(now)
                .bind(review_result)
                .bind(notes)
                .bind(now)
                .bind(id.to_string())
                .bind(submission.version)
                .execute(&mut *tx)
                .await?
            }
            WorkflowAction::MasterAdminApprove | WorkflowAction::MasterAdminReject => {
                let decision = if action == WorkflowAction::MasterAdminApprove {
                    "approved"
                } else {
                    "rejected"
                };
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET status = ?, master_decided_at = ?, master_result = ?,
                        updated_at = ?, version = version + 1
                    WHERE guid = ? AND version = ?
                    "#,
                )
                .bind(final_status.as_str())
                .bind(now)
                .bind(decision)
                .bind(now)
                .bind(id.to_string())
                .bind(submission.version)
                .execute(&mut *tx)
                .await?
            }
            WorkflowAction::AdminReset => {
                // Rewind clears the admin verification record; the forms
                // stay intact
                sqlx::query(
                    r#"
                    UPDATE submissions
                    SET status = ?, admin_uploaded_at = NULL, admin_notes = NULL,
                        updated_at = ?, version = version + 1
                    WHERE guid = ? AND version = ?
                    "#,
                )
                .bind(final_status.as_str())
                .bind(now)
                .bind(id.to_string())
                .bind(submission.version)
                .execute(&mut *tx)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            // Row existed at the read above, so the version moved under us
            warn!("Lost transition race on submission {id} ({action})");
            return Err(Error::ConcurrentModification(id.to_string()));
        }

        append_audit(
            &mut *tx,
            &NewAudit {
                submission_id: id,
                actor_guid: &actor.guid,
                actor_role: Some(actor.role),
                action: action.as_str(),
                from_status: Some(current),
                to_status: Some(target),
                notes,
                created_at: now,
            },
        )
        .await?;

        // Superadmin verification parks on the transient status only in
        // audit history; record the automatic hop as its own row so the
        // timeline builder can anchor the masteradmin stage on it
        if target != final_status {
            append_audit(
                &mut *tx,
                &NewAudit {
                    submission_id: id,
                    actor_guid: &actor.guid,
                    actor_role: Some(actor.role),
                    action: AUTO_ADVANCE_ACTION,
                    from_status: Some(target),
                    to_status: Some(final_status),
                    notes: None,
                    created_at: now,
                },
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            "Submission {} transitioned {} -> {} via {} by {} ({})",
            id,
            current,
            final_status,
            action,
            actor.guid,
            actor.role.as_str()
        );

        self.bus.emit(KytEvent::StatusChanged {
            submission_id: id,
            old_status: current,
            new_status: final_status,
            action: action.as_str().to_string(),
            timestamp: now,
        });
        if action == WorkflowAction::AdminReset {
            self.bus.emit(KytEvent::SubmissionReset {
                submission_id: id,
                actor_guid: actor.guid.clone(),
                timestamp: now,
            });
        }

        crate::db::fetch_submission(&self.db, id).await
    }
}
