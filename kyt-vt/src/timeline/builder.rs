//! Stage timeline builder
//!
//! Derives the four review stages of a submission from its append-only
//! audit history. Stages are recomputed on every read and never persisted;
//! a stage's `started_at` is the timestamp of the transition that entered
//! it, not the submission's `created_at`.

use crate::workflow::machine::WorkflowAction;
use chrono::{DateTime, Utc};
use kyt_common::db::models::{AuditRecord, ReviewResult, Submission, SubmissionStatus};
use kyt_common::time::elapsed_ms;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four derived phases of a submission's journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Forms,
    AdminReview,
    SuperadminReview,
    MasteradminApproval,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forms => "forms",
            Self::AdminReview => "admin_review",
            Self::SuperadminReview => "superadmin_review",
            Self::MasteradminApproval => "masteradmin_approval",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
}

/// One derived stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub name: StageName,
    pub status: StageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_elapsed_ms: i64,
    /// Review outcome, present on the superadmin stage once reviewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ReviewResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Stage {
    fn derive(
        name: StageName,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let (status, time_elapsed_ms) = match (started_at, completed_at) {
            (Some(start), Some(end)) => (StageStatus::Completed, elapsed_ms(start, end)),
            (Some(start), None) => (StageStatus::InProgress, elapsed_ms(start, now)),
            _ => (StageStatus::Pending, 0),
        };
        Self {
            name,
            status,
            started_at,
            completed_at,
            time_elapsed_ms,
            result: None,
            notes: None,
        }
    }
}

/// Build the four stages for one submission.
///
/// A reset truncates the audit window used for the admin and superadmin
/// stages: entries before the latest reset belong to the overwritten
/// attempt and only the newest attempt is rendered. The forms stage is not
/// truncated: the forms themselves survive a reset.
pub fn build_stages(
    submission: &Submission,
    audit: &[AuditRecord],
    now: DateTime<Utc>,
) -> [Stage; 4] {
    let reset_id = audit
        .iter()
        .rev()
        .find(|rec| rec.action == WorkflowAction::AdminReset.as_str())
        .map(|rec| rec.id);

    // Transition timestamps, newest attempt only
    let entered_admin_verified_any = last_entry_into(audit, SubmissionStatus::AdminVerified, None);
    let entered_admin_verified =
        last_entry_into(audit, SubmissionStatus::AdminVerified, reset_id);
    let entered_pending_super =
        last_entry_into(audit, SubmissionStatus::PendingSuperadminReview, reset_id);
    let entered_pending_master =
        last_entry_into(audit, SubmissionStatus::PendingMasterApproval, reset_id);
    let rejected_by_super =
        last_terminal_from(audit, SubmissionStatus::PendingSuperadminReview, reset_id);
    let master_decided =
        last_terminal_from(audit, SubmissionStatus::PendingMasterApproval, reset_id);
    let reset_at = reset_id.and_then(|id| {
        audit.iter().find(|rec| rec.id == id).map(|rec| rec.created_at)
    });

    // Forms: runs from creation until verification is first uploaded
    let mut forms = Stage::derive(
        StageName::Forms,
        Some(submission.created_at),
        entered_admin_verified_any,
        now,
    );
    if forms.status == StageStatus::InProgress && submission.forms_submitted_count() == 0 {
        forms.status = StageStatus::Pending;
        forms.time_elapsed_ms = 0;
    }

    // Admin review: from verification upload to the send-up. After a reset
    // the stage restarts in progress at the reset timestamp until the admin
    // re-uploads.
    let admin_started = entered_admin_verified.or(reset_at);
    let admin_review = Stage::derive(
        StageName::AdminReview,
        admin_started,
        entered_pending_super,
        now,
    );

    // Superadmin review: completes on the hop to the masteradmin queue or
    // on a superadmin rejection, whichever occurred
    let super_completed = entered_pending_master.or(rejected_by_super);
    let mut superadmin_review = Stage::derive(
        StageName::SuperadminReview,
        entered_pending_super,
        super_completed,
        now,
    );
    superadmin_review.result = submission.superadmin_review.result;
    superadmin_review.notes = submission.superadmin_review.notes.clone();

    let masteradmin_approval = Stage::derive(
        StageName::MasteradminApproval,
        entered_pending_master,
        master_decided,
        now,
    );

    [forms, admin_review, superadmin_review, masteradmin_approval]
}

/// Timestamp of the newest transition into `status`, optionally restricted
/// to rows after the latest reset
fn last_entry_into(
    audit: &[AuditRecord],
    status: SubmissionStatus,
    after_id: Option<i64>,
) -> Option<DateTime<Utc>> {
    audit
        .iter()
        .rev()
        .filter(|rec| after_id.map_or(true, |min| rec.id > min))
        .find(|rec| rec.to_status == Some(status))
        .map(|rec| rec.created_at)
}

/// Timestamp of the newest terminal transition out of `from`
fn last_terminal_from(
    audit: &[AuditRecord],
    from: SubmissionStatus,
    after_id: Option<i64>,
) -> Option<DateTime<Utc>> {
    audit
        .iter()
        .rev()
        .filter(|rec| after_id.map_or(true, |min| rec.id > min))
        .find(|rec| {
            rec.from_status == Some(from)
                && matches!(
                    rec.to_status,
                    Some(SubmissionStatus::Approved) | Some(SubmissionStatus::Rejected)
                )
        })
        .map(|rec| rec.created_at)
}
