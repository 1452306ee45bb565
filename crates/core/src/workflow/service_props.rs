//! Property-based tests for WorkflowService.

use holdco_shared::types::UserId;
use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{ApprovalStatus, WorkflowAction};

/// Strategy for generating random ApprovalStatus values.
fn arb_status() -> impl Strategy<Value = ApprovalStatus> {
    prop::sample::select(ApprovalStatus::ALL.to_vec())
}

/// Strategy for generating random user IDs.
fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating reasons with visible characters.
fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,20}( [a-zA-Z0-9]{1,20}){0,4}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every successful operation lands on a state `is_valid_transition` accepts.
    #[test]
    fn prop_actions_agree_with_transition_table(
        status in arb_status(),
        user in arb_user(),
        submit in any::<bool>(),
        reason in arb_reason(),
    ) {
        let results = [
            WorkflowService::save(status, submit),
            WorkflowService::submit(status),
            WorkflowService::approve(status, user),
            WorkflowService::reject(status, user, &reason),
            WorkflowService::cancel(status, user),
        ];
        for action in results.into_iter().flatten() {
            prop_assert!(WorkflowService::is_valid_transition(status, action.new_status()));
        }
    }

    /// Only PENDING can be approved or rejected.
    #[test]
    fn prop_only_pending_is_decidable(
        status in arb_status(),
        user in arb_user(),
        reason in arb_reason(),
    ) {
        let approved = WorkflowService::approve(status, user);
        let rejected = WorkflowService::reject(status, user, &reason);
        if status == ApprovalStatus::Pending {
            prop_assert!(approved.is_ok());
            prop_assert!(rejected.is_ok());
        } else {
            let approve_ok = matches!(
                approved,
                Err(WorkflowError::InvalidTransition { from, to: ApprovalStatus::Approved }) if from == status
            );
            let reject_ok = matches!(
                rejected,
                Err(WorkflowError::InvalidTransition { from, to: ApprovalStatus::Rejected }) if from == status
            );
            prop_assert!(approve_ok);
            prop_assert!(reject_ok);
        }
    }

    /// A rejection keeps the approver and the trimmed reason.
    #[test]
    fn prop_reject_records_audit_fields(user in arb_user(), reason in arb_reason()) {
        let padded = format!("  {reason}\t");
        let action = WorkflowService::reject(ApprovalStatus::Pending, user, &padded).unwrap();
        if let WorkflowAction::Reject { rejected_by, rejection_reason, .. } = action {
            prop_assert_eq!(rejected_by, user);
            prop_assert_eq!(rejection_reason, reason);
        } else {
            prop_assert!(false, "Expected Reject action");
        }
    }

    /// Terminal states accept nothing: no edit, no cancel, no decision.
    #[test]
    fn prop_terminal_states_are_final(
        status in arb_status(),
        user in arb_user(),
        submit in any::<bool>(),
    ) {
        prop_assume!(status.is_terminal());
        prop_assert!(WorkflowService::save(status, submit).is_err());
        prop_assert!(WorkflowService::submit(status).is_err());
        prop_assert!(WorkflowService::cancel(status, user).is_err());
        for to in ApprovalStatus::ALL {
            prop_assert!(!WorkflowService::is_valid_transition(status, to));
        }
    }

    /// Editable states can always be saved, as draft or as pending.
    #[test]
    fn prop_editable_states_can_be_saved(status in arb_status(), submit in any::<bool>()) {
        prop_assume!(status.is_editable());
        let action = WorkflowService::save(status, submit).unwrap();
        let expected = if submit { ApprovalStatus::Pending } else { ApprovalStatus::Draft };
        prop_assert_eq!(action.new_status(), expected);
    }
}
