//! Database models
//!
//! Row types for the `submissions` and `submission_audit` tables plus the
//! closed enums stored in their TEXT columns. The audit table is
//! append-only and is the source of truth for timeline derivation; the
//! scalar columns on `submissions` carry the latest committed values only.

use crate::error::{Error, Result};
use crate::ids::{MarketerId, SubmissionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use std::fmt;
use std::str::FromStr;

/// Canonical submission status, stored as snake_case TEXT.
///
/// `SuperadminVerified` never rests in the `submissions.status` column
/// (superadmin verification auto-advances to `PendingMasterApproval` inside
/// the same transaction), but it does appear in audit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingAdminReview,
    AdminVerified,
    PendingSuperadminReview,
    SuperadminVerified,
    #[serde(rename = "pending_masteradmin_approval")]
    PendingMasterApproval,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAdminReview => "pending_admin_review",
            Self::AdminVerified => "admin_verified",
            Self::PendingSuperadminReview => "pending_superadmin_review",
            Self::SuperadminVerified => "superadmin_verified",
            Self::PendingMasterApproval => "pending_masteradmin_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal submissions are immutable. Even the reset escape hatch
    /// cannot touch them; it only applies to `PendingSuperadminReview`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending_admin_review" => Ok(Self::PendingAdminReview),
            "admin_verified" => Ok(Self::AdminVerified),
            "pending_superadmin_review" => Ok(Self::PendingSuperadminReview),
            "superadmin_verified" => Ok(Self::SuperadminVerified),
            "pending_masteradmin_approval" => Ok(Self::PendingMasterApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::Internal(format!("unknown submission status: {other}"))),
        }
    }
}

/// The three intake forms a marketer must complete before review begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Biodata,
    Guarantor,
    Commitment,
}

impl FormKind {
    pub const ALL: [FormKind; 3] = [Self::Biodata, Self::Guarantor, Self::Commitment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biodata => "biodata",
            Self::Guarantor => "guarantor",
            Self::Commitment => "commitment",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "biodata" => Ok(Self::Biodata),
            "guarantor" => Ok(Self::Guarantor),
            "commitment" => Ok(Self::Commitment),
            other => Err(Error::InvalidFormName(other.to_string())),
        }
    }
}

/// Outcome of a superadmin review or masteradmin decision.
/// Immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewResult {
    Approved,
    Rejected,
}

impl ReviewResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for ReviewResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::Validation(format!("unknown review result: {other}"))),
        }
    }
}

/// Role of the human actor performing an action. Taken as an explicit
/// parameter on every mutation; the core holds no ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Marketer,
    Admin,
    #[serde(rename = "superadmin")]
    SuperAdmin,
    #[serde(rename = "masteradmin")]
    MasterAdmin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marketer => "marketer",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
            Self::MasterAdmin => "masteradmin",
        }
    }
}

impl FromStr for ActorRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "marketer" => Ok(Self::Marketer),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::SuperAdmin),
            "masteradmin" => Ok(Self::MasterAdmin),
            other => Err(Error::Validation(format!("unknown actor role: {other}"))),
        }
    }
}

/// Identity of the actor behind a mutation, recorded verbatim in audit rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub guid: String,
    pub role: ActorRole,
}

/// One intake form slot. Re-submission overwrites `submitted_at` and the
/// payload but never clears `submitted`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormSlot {
    pub submitted: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Admin verification upload. `uploaded_at` is set only once all three
/// forms are submitted, and cleared again by an audited reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminVerification {
    pub uploaded_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// SuperAdmin review record. `result` is immutable once non-null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuperAdminReview {
    pub reviewed_at: Option<DateTime<Utc>>,
    pub result: Option<ReviewResult>,
    pub notes: Option<String>,
}

/// MasterAdmin decision record. `result` is immutable once non-null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterDecision {
    pub decided_at: Option<DateTime<Utc>>,
    pub result: Option<ReviewResult>,
}

/// One marketer verification attempt, tracked end-to-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub marketer_id: MarketerId,
    pub status: SubmissionStatus,
    /// Optimistic-concurrency counter; bumped by every successful mutation
    #[serde(skip)]
    pub version: i64,
    pub biodata: FormSlot,
    pub guarantor: FormSlot,
    pub commitment: FormSlot,
    pub admin_verification: AdminVerification,
    pub superadmin_review: SuperAdminReview,
    pub masteradmin_decision: MasterDecision,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn form(&self, kind: FormKind) -> &FormSlot {
        match kind {
            FormKind::Biodata => &self.biodata,
            FormKind::Guarantor => &self.guarantor,
            FormKind::Commitment => &self.commitment,
        }
    }

    pub fn forms_submitted_count(&self) -> usize {
        FormKind::ALL
            .iter()
            .filter(|kind| self.form(**kind).submitted)
            .count()
    }

    pub fn all_forms_submitted(&self) -> bool {
        self.forms_submitted_count() == FormKind::ALL.len()
    }

    /// Decode a `submissions` row
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let status: String = row.try_get("status")?;
        let id: String = row.try_get("guid")?;
        let marketer: String = row.try_get("marketer_guid")?;

        let form_slot = |prefix: &str| -> Result<FormSlot> {
            let submitted: i64 = row.try_get(format!("{prefix}_submitted").as_str())?;
            let payload: Option<String> = row.try_get(format!("{prefix}_payload").as_str())?;
            Ok(FormSlot {
                submitted: submitted != 0,
                submitted_at: row.try_get(format!("{prefix}_submitted_at").as_str())?,
                payload: payload
                    .as_deref()
                    .map(serde_json::from_str)
                    .transpose()
                    .map_err(|e| Error::Internal(format!("corrupt {prefix} payload: {e}")))?,
            })
        };

        let superadmin_result: Option<String> = row.try_get("superadmin_result")?;
        let master_result: Option<String> = row.try_get("master_result")?;

        Ok(Self {
            id: id
                .parse()
                .map_err(|e| Error::Internal(format!("corrupt submission guid: {e}")))?,
            marketer_id: marketer
                .parse()
                .map_err(|e| Error::Internal(format!("corrupt marketer guid: {e}")))?,
            status: status.parse()?,
            version: row.try_get("version")?,
            biodata: form_slot("biodata")?,
            guarantor: form_slot("guarantor")?,
            commitment: form_slot("commitment")?,
            admin_verification: AdminVerification {
                uploaded_at: row.try_get("admin_uploaded_at")?,
                notes: row.try_get("admin_notes")?,
            },
            superadmin_review: SuperAdminReview {
                reviewed_at: row.try_get("superadmin_reviewed_at")?,
                result: superadmin_result.as_deref().map(str::parse).transpose()?,
                notes: row.try_get("superadmin_notes")?,
            },
            masteradmin_decision: MasterDecision {
                decided_at: row.try_get("master_decided_at")?,
                result: master_result.as_deref().map(str::parse).transpose()?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// One append-only audit row. Transition rows carry `from_status` and
/// `to_status`; external log appends carry neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub submission_id: SubmissionId,
    pub actor_guid: String,
    pub actor_role: Option<ActorRole>,
    pub action: String,
    pub from_status: Option<SubmissionStatus>,
    pub to_status: Option<SubmissionStatus>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Decode a `submission_audit` row
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let submission: String = row.try_get("submission_guid")?;
        let role: Option<String> = row.try_get("actor_role")?;
        let from_status: Option<String> = row.try_get("from_status")?;
        let to_status: Option<String> = row.try_get("to_status")?;

        Ok(Self {
            id: row.try_get("id")?,
            submission_id: submission
                .parse()
                .map_err(|e| Error::Internal(format!("corrupt audit submission guid: {e}")))?,
            actor_guid: row.try_get("actor_guid")?,
            actor_role: role.as_deref().map(str::parse).transpose()?,
            action: row.try_get("action")?,
            from_status: from_status.as_deref().map(str::parse).transpose()?,
            to_status: to_status.as_deref().map(str::parse).transpose()?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            SubmissionStatus::PendingAdminReview,
            SubmissionStatus::AdminVerified,
            SubmissionStatus::PendingSuperadminReview,
            SubmissionStatus::SuperadminVerified,
            SubmissionStatus::PendingMasterApproval,
            SubmissionStatus::Approved,
            SubmissionStatus::Rejected,
        ] {
            let parsed: SubmissionStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_form_name_is_invalid_form_name() {
        let err = "passport".parse::<FormKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidFormName(name) if name == "passport"));
    }

    #[test]
    fn test_serde_names_match_canonical_strings() {
        for status in [
            SubmissionStatus::PendingMasterApproval,
            SubmissionStatus::SuperadminVerified,
            SubmissionStatus::PendingAdminReview,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        for role in [ActorRole::SuperAdmin, ActorRole::MasterAdmin, ActorRole::Admin] {
            assert_eq!(serde_json::to_value(role).unwrap(), role.as_str());
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
        assert!(!SubmissionStatus::PendingMasterApproval.is_terminal());
    }
}
