//! Workflow service for transaction state transitions.

use chrono::Utc;
use holdco_shared::types::UserId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalStatus, WorkflowAction};

/// Stateless service for managing transaction workflow transitions.
///
/// All methods are associated functions that validate a transition and
/// return the resulting `WorkflowAction` with its audit data. Who may
/// trigger a transition is decided by the access policy, not here.
pub struct WorkflowService;

impl WorkflowService {
    /// Save an edit, optionally submitting it for approval.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Save)` with Draft, or Pending when `submit`
    /// * `Err(WorkflowError::NotEditable)` for Approved or Cancelled
    pub fn save(
        current_status: ApprovalStatus,
        submit: bool,
    ) -> Result<WorkflowAction, WorkflowError> {
        if !current_status.is_editable() {
            return Err(WorkflowError::NotEditable(current_status));
        }

        Ok(if submit {
            WorkflowAction::Save {
                new_status: ApprovalStatus::Pending,
                submitted_at: Some(Utc::now()),
            }
        } else {
            WorkflowAction::Save {
                new_status: ApprovalStatus::Draft,
                submitted_at: None,
            }
        })
    }

    /// Submit a draft or rejected transaction for approval.
    pub fn submit(current_status: ApprovalStatus) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            ApprovalStatus::Draft | ApprovalStatus::Rejected => Ok(WorkflowAction::Submit {
                new_status: ApprovalStatus::Pending,
                submitted_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: ApprovalStatus::Pending,
            }),
        }
    }

    /// Approve a pending transaction.
    pub fn approve(
        current_status: ApprovalStatus,
        approved_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            ApprovalStatus::Pending => Ok(WorkflowAction::Approve {
                new_status: ApprovalStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: ApprovalStatus::Approved,
            }),
        }
    }

    /// Reject a pending transaction.
    ///
    /// # Returns
    /// * `Err(WorkflowError::InvalidTransition)` if not in Pending status
    /// * `Err(WorkflowError::RejectionReasonRequired)` if reason is blank
    pub fn reject(
        current_status: ApprovalStatus,
        rejected_by: UserId,
        rejection_reason: &str,
    ) -> Result<WorkflowAction, WorkflowError> {
        if current_status != ApprovalStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: ApprovalStatus::Rejected,
            });
        }

        let reason = rejection_reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }

        Ok(WorkflowAction::Reject {
            new_status: ApprovalStatus::Rejected,
            rejected_by,
            rejection_reason: reason.to_string(),
        })
    }

    /// Cancel a transaction that is neither approved nor already cancelled.
    pub fn cancel(
        current_status: ApprovalStatus,
        cancelled_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if current_status.is_terminal() {
            return Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: ApprovalStatus::Cancelled,
            });
        }

        Ok(WorkflowAction::Cancel {
            new_status: ApprovalStatus::Cancelled,
            cancelled_by,
            cancelled_at: Utc::now(),
        })
    }

    /// Approved transactions are never deleted.
    pub fn ensure_deletable(current_status: ApprovalStatus) -> Result<(), WorkflowError> {
        match current_status {
            ApprovalStatus::Approved => Err(WorkflowError::NotDeletable(current_status)),
            _ => Ok(()),
        }
    }

    /// Payment status may change in any state except Cancelled.
    pub fn ensure_payment_updatable(current_status: ApprovalStatus) -> Result<(), WorkflowError> {
        match current_status {
            ApprovalStatus::Cancelled => Err(WorkflowError::PaymentStatusLocked(current_status)),
            _ => Ok(()),
        }
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
        use ApprovalStatus::{Approved, Cancelled, Draft, Pending, Rejected};

        matches!(
            (from, to),
            (Draft | Pending | Rejected, Draft | Pending | Cancelled)
                | (Pending, Approved | Rejected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_as_draft_and_submit() {
        let action = WorkflowService::save(ApprovalStatus::Rejected, false).unwrap();
        assert_eq!(action.new_status(), ApprovalStatus::Draft);

        let action = WorkflowService::save(ApprovalStatus::Pending, true).unwrap();
        assert_eq!(action.new_status(), ApprovalStatus::Pending);
        assert!(matches!(
            action,
            WorkflowAction::Save {
                submitted_at: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_save_approved_or_cancelled_fails() {
        assert!(matches!(
            WorkflowService::save(ApprovalStatus::Approved, false),
            Err(WorkflowError::NotEditable(ApprovalStatus::Approved))
        ));
        assert!(matches!(
            WorkflowService::save(ApprovalStatus::Cancelled, true),
            Err(WorkflowError::NotEditable(ApprovalStatus::Cancelled))
        ));
    }

    #[test]
    fn test_submit_from_draft_or_rejected() {
        for status in [ApprovalStatus::Draft, ApprovalStatus::Rejected] {
            let action = WorkflowService::submit(status).unwrap();
            assert_eq!(action.new_status(), ApprovalStatus::Pending);
        }
    }

    #[test]
    fn test_submit_from_pending_fails() {
        assert!(matches!(
            WorkflowService::submit(ApprovalStatus::Pending),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_approve_from_pending() {
        let approver = UserId::new();
        let action = WorkflowService::approve(ApprovalStatus::Pending, approver).unwrap();
        assert_eq!(action.new_status(), ApprovalStatus::Approved);
        assert!(matches!(action, WorkflowAction::Approve { approved_by, .. } if approved_by == approver));
    }

    #[test]
    fn test_approve_from_draft_or_approved_fails() {
        for status in [ApprovalStatus::Draft, ApprovalStatus::Approved] {
            assert!(matches!(
                WorkflowService::approve(status, UserId::new()),
                Err(WorkflowError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_reject_from_pending_trims_reason() {
        let action =
            WorkflowService::reject(ApprovalStatus::Pending, UserId::new(), "  Missing invoice ")
                .unwrap();
        assert_eq!(action.new_status(), ApprovalStatus::Rejected);
        assert!(matches!(
            action,
            WorkflowAction::Reject { ref rejection_reason, .. } if rejection_reason == "Missing invoice"
        ));
    }

    #[test]
    fn test_reject_blank_reason_fails() {
        for reason in ["", "   "] {
            assert!(matches!(
                WorkflowService::reject(ApprovalStatus::Pending, UserId::new(), reason),
                Err(WorkflowError::RejectionReasonRequired)
            ));
        }
    }

    #[test]
    fn test_reject_from_draft_fails() {
        assert!(matches!(
            WorkflowService::reject(ApprovalStatus::Draft, UserId::new(), "no"),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reject_checks_status_before_reason() {
        for status in [ApprovalStatus::Draft, ApprovalStatus::Approved] {
            assert!(matches!(
                WorkflowService::reject(status, UserId::new(), "  "),
                Err(WorkflowError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_cancel() {
        for status in [
            ApprovalStatus::Draft,
            ApprovalStatus::Pending,
            ApprovalStatus::Rejected,
        ] {
            let action = WorkflowService::cancel(status, UserId::new()).unwrap();
            assert_eq!(action.new_status(), ApprovalStatus::Cancelled);
        }
        for status in [ApprovalStatus::Approved, ApprovalStatus::Cancelled] {
            assert!(WorkflowService::cancel(status, UserId::new()).is_err());
        }
    }

    #[test]
    fn test_ensure_deletable() {
        assert!(WorkflowService::ensure_deletable(ApprovalStatus::Draft).is_ok());
        assert!(WorkflowService::ensure_deletable(ApprovalStatus::Cancelled).is_ok());
        assert!(matches!(
            WorkflowService::ensure_deletable(ApprovalStatus::Approved),
            Err(WorkflowError::NotDeletable(_))
        ));
    }

    #[test]
    fn test_ensure_payment_updatable() {
        assert!(WorkflowService::ensure_payment_updatable(ApprovalStatus::Approved).is_ok());
        assert!(WorkflowService::ensure_payment_updatable(ApprovalStatus::Cancelled).is_err());
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(WorkflowService::is_valid_transition(
            ApprovalStatus::Draft,
            ApprovalStatus::Pending
        ));
        assert!(WorkflowService::is_valid_transition(
            ApprovalStatus::Pending,
            ApprovalStatus::Draft
        ));
        assert!(WorkflowService::is_valid_transition(
            ApprovalStatus::Pending,
            ApprovalStatus::Rejected
        ));
        assert!(WorkflowService::is_valid_transition(
            ApprovalStatus::Rejected,
            ApprovalStatus::Cancelled
        ));

        assert!(!WorkflowService::is_valid_transition(
            ApprovalStatus::Draft,
            ApprovalStatus::Approved
        ));
        assert!(!WorkflowService::is_valid_transition(
            ApprovalStatus::Approved,
            ApprovalStatus::Cancelled
        ));
        assert!(!WorkflowService::is_valid_transition(
            ApprovalStatus::Cancelled,
            ApprovalStatus::Draft
        ));
    }
}
