//! Progress and bottleneck analysis
//!
//! Folds the derived stages into the per-submission verdicts the
//! presentation layer renders: progress percentage, total elapsed time,
//! and the stuck/bottleneck call against the configured SLA thresholds.

use crate::timeline::builder::{build_stages, Stage, StageName, StageStatus};
use chrono::{DateTime, Utc};
use kyt_common::config::SlaThresholds;
use kyt_common::db::models::{AuditRecord, Submission, SubmissionStatus};
use kyt_common::ids::{MarketerId, SubmissionId};
use kyt_common::time::elapsed_ms;
use serde::{Deserialize, Serialize};

/// Points contributed by each of the four stages
const STAGE_WEIGHT: f64 = 25.0;

/// Derived view of one submission's journey. Constructed on demand per
/// read request; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub submission_id: SubmissionId,
    pub marketer_id: MarketerId,
    pub current_status: SubmissionStatus,
    pub stages: Vec<Stage>,
    pub progress_percentage: f64,
    pub total_time_elapsed_ms: i64,
    pub is_stuck: bool,
    pub bottleneck_stage: Option<StageName>,
}

/// Build the full timeline for one submission.
pub fn analyze(
    submission: &Submission,
    audit: &[AuditRecord],
    sla: &SlaThresholds,
    now: DateTime<Utc>,
) -> Timeline {
    let stages = build_stages(submission, audit, now);

    let progress_percentage = progress(submission, &stages);

    let total_time_elapsed_ms = if submission.status.is_terminal() {
        let finished = audit
            .iter()
            .rev()
            .find(|rec| {
                matches!(
                    rec.to_status,
                    Some(SubmissionStatus::Approved) | Some(SubmissionStatus::Rejected)
                )
            })
            .map(|rec| rec.created_at)
            .unwrap_or(submission.updated_at);
        elapsed_ms(submission.created_at, finished)
    } else {
        elapsed_ms(submission.created_at, now)
    };

    let (is_stuck, bottleneck_stage) = detect_bottleneck(submission, &stages, sla);

    Timeline {
        submission_id: submission.id,
        marketer_id: submission.marketer_id,
        current_status: submission.status,
        stages: stages.to_vec(),
        progress_percentage,
        total_time_elapsed_ms,
        is_stuck,
        bottleneck_stage,
    }
}

/// 25 points per completed stage; the forms stage contributes fractionally
/// (submitted forms / 3) until verification is uploaded. 0 for a brand-new
/// submission, 100 only once the masteradmin stage is completed.
fn progress(submission: &Submission, stages: &[Stage; 4]) -> f64 {
    let raw: f64 = stages
        .iter()
        .map(|stage| match (stage.name, stage.status) {
            (_, StageStatus::Completed) => STAGE_WEIGHT,
            (StageName::Forms, _) => {
                STAGE_WEIGHT * submission.forms_submitted_count() as f64 / 3.0
            }
            _ => 0.0,
        })
        .sum();
    // One decimal is plenty for a progress bar
    (raw * 10.0).round() / 10.0
}

/// A submission is stuck when its current (first non-completed) stage has
/// been open longer than that stage's SLA threshold and the submission is
/// still non-terminal.
fn detect_bottleneck(
    submission: &Submission,
    stages: &[Stage; 4],
    sla: &SlaThresholds,
) -> (bool, Option<StageName>) {
    if submission.status.is_terminal() {
        return (false, None);
    }

    let current = stages.iter().find(|stage| stage.status != StageStatus::Completed);
    match current {
        Some(stage) if stage.time_elapsed_ms > threshold_ms(stage.name, sla) => {
            (true, Some(stage.name))
        }
        _ => (false, None),
    }
}

fn threshold_ms(name: StageName, sla: &SlaThresholds) -> i64 {
    match name {
        StageName::Forms => sla.forms_ms,
        StageName::AdminReview => sla.admin_review_ms,
        StageName::SuperadminReview => sla.superadmin_review_ms,
        StageName::MasteradminApproval => sla.masteradmin_approval_ms,
    }
}
