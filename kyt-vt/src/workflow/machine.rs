//! Transition rules for the submission state machine
//!
//! Pure lookup over the permitted (source status, action) pairs. Guard
//! evaluation and persistence live in the engine; this module answers only
//! "is this move legal, and where does it land".

use kyt_common::db::models::{ActorRole, SubmissionStatus};
use kyt_common::{Error, Result};
use std::fmt;

/// Every actor action that can move a submission between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    /// Admin uploads the verification record (requires all three forms)
    AdminUploadVerification,
    /// Admin forwards the verified submission to the SuperAdmin queue
    AdminSendToSuperAdmin,
    /// SuperAdmin verifies; auto-advances to the MasterAdmin queue
    SuperAdminVerify,
    /// SuperAdmin rejects (terminal)
    SuperAdminReject,
    /// MasterAdmin approves (terminal)
    MasterAdminApprove,
    /// MasterAdmin rejects (terminal)
    MasterAdminReject,
    /// Admin rewinds a submission awaiting superadmin review back to the
    /// start of admin review. The only backward move in the machine.
    AdminReset,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminUploadVerification => "admin.upload_verification",
            Self::AdminSendToSuperAdmin => "admin.send_to_superadmin",
            Self::SuperAdminVerify => "superadmin.verify",
            Self::SuperAdminReject => "superadmin.reject",
            Self::MasterAdminApprove => "masteradmin.approve",
            Self::MasterAdminReject => "masteradmin.reject",
            Self::AdminReset => "admin.reset",
        }
    }

    /// Role that must be presented by the acting user
    pub fn required_role(&self) -> ActorRole {
        match self {
            Self::AdminUploadVerification | Self::AdminSendToSuperAdmin | Self::AdminReset => {
                ActorRole::Admin
            }
            Self::SuperAdminVerify | Self::SuperAdminReject => ActorRole::SuperAdmin,
            Self::MasterAdminApprove | Self::MasterAdminReject => ActorRole::MasterAdmin,
        }
    }

    /// Whether this action requires non-empty reviewer notes
    pub fn requires_notes(&self) -> bool {
        matches!(self, Self::SuperAdminVerify | Self::SuperAdminReject)
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status a legal action lands on, or `IllegalTransition` carrying the
/// actual current status so the caller can resynchronize.
///
/// `SuperAdminVerify` lands on the transient `SuperadminVerified`; the
/// engine immediately advances it to `PendingMasterApproval` within the
/// same committed write.
pub fn target_status(
    from: SubmissionStatus,
    action: WorkflowAction,
) -> Result<SubmissionStatus> {
    use SubmissionStatus::*;
    use WorkflowAction::*;

    match (from, action) {
        (PendingAdminReview, AdminUploadVerification) => Ok(AdminVerified),
        (AdminVerified, AdminSendToSuperAdmin) => Ok(PendingSuperadminReview),
        (PendingSuperadminReview, SuperAdminVerify) => Ok(SuperadminVerified),
        (PendingSuperadminReview, SuperAdminReject) => Ok(Rejected),
        (PendingMasterApproval, MasterAdminApprove) => Ok(Approved),
        (PendingMasterApproval, MasterAdminReject) => Ok(Rejected),
        (PendingSuperadminReview, AdminReset) => Ok(PendingAdminReview),
        (current, action) => Err(Error::IllegalTransition {
            action: action.as_str().to_string(),
            current: current.as_str().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;
    use WorkflowAction::*;

    const ALL_STATUSES: [SubmissionStatus; 7] = [
        PendingAdminReview,
        AdminVerified,
        PendingSuperadminReview,
        SuperadminVerified,
        PendingMasterApproval,
        Approved,
        Rejected,
    ];

    const ALL_ACTIONS: [WorkflowAction; 7] = [
        AdminUploadVerification,
        AdminSendToSuperAdmin,
        SuperAdminVerify,
        SuperAdminReject,
        MasterAdminApprove,
        MasterAdminReject,
        AdminReset,
    ];

    #[test]
    fn test_happy_path_targets() {
        assert_eq!(
            target_status(PendingAdminReview, AdminUploadVerification).unwrap(),
            AdminVerified
        );
        assert_eq!(
            target_status(AdminVerified, AdminSendToSuperAdmin).unwrap(),
            PendingSuperadminReview
        );
        assert_eq!(
            target_status(PendingSuperadminReview, SuperAdminVerify).unwrap(),
            SuperadminVerified
        );
        assert_eq!(
            target_status(PendingMasterApproval, MasterAdminApprove).unwrap(),
            Approved
        );
    }

    #[test]
    fn test_rejections_are_terminal_targets() {
        assert_eq!(
            target_status(PendingSuperadminReview, SuperAdminReject).unwrap(),
            Rejected
        );
        assert_eq!(
            target_status(PendingMasterApproval, MasterAdminReject).unwrap(),
            Rejected
        );
    }

    #[test]
    fn test_reset_is_the_only_backward_move() {
        assert_eq!(
            target_status(PendingSuperadminReview, AdminReset).unwrap(),
            PendingAdminReview
        );
        // Reset from anywhere else is illegal, terminal states included
        for from in [PendingAdminReview, AdminVerified, PendingMasterApproval, Approved, Rejected] {
            assert!(target_status(from, AdminReset).is_err());
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for from in [Approved, Rejected] {
            for action in ALL_ACTIONS {
                assert!(
                    target_status(from, action).is_err(),
                    "{action} must not be legal from {from}"
                );
            }
        }
    }

    #[test]
    fn test_masteradmin_decide_from_admin_verified_is_illegal() {
        let err = target_status(AdminVerified, MasterAdminApprove).unwrap_err();
        match err {
            Error::IllegalTransition { action, current } => {
                assert_eq!(action, "masteradmin.approve");
                assert_eq!(current, "admin_verified");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_every_illegal_pair_reports_current_status() {
        for from in ALL_STATUSES {
            for action in ALL_ACTIONS {
                if let Err(Error::IllegalTransition { current, .. }) = target_status(from, action)
                {
                    assert_eq!(current, from.as_str());
                }
            }
        }
    }

    #[test]
    fn test_role_requirements() {
        assert_eq!(AdminUploadVerification.required_role(), ActorRole::Admin);
        assert_eq!(AdminReset.required_role(), ActorRole::Admin);
        assert_eq!(SuperAdminVerify.required_role(), ActorRole::SuperAdmin);
        assert_eq!(MasterAdminReject.required_role(), ActorRole::MasterAdmin);
    }

    #[test]
    fn test_notes_required_only_for_superadmin_review() {
        assert!(SuperAdminVerify.requires_notes());
        assert!(SuperAdminReject.requires_notes());
        assert!(!AdminUploadVerification.requires_notes());
        assert!(!MasterAdminApprove.requires_notes());
    }
}
