//! Workflow error types.

use thiserror::Error;

use crate::workflow::types::ApprovalStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ApprovalStatus,
        /// The attempted target status.
        to: ApprovalStatus,
    },

    /// Attempted to edit an approved or cancelled transaction.
    #[error("Cannot modify transaction in {0} status")]
    NotEditable(ApprovalStatus),

    /// Attempted to delete an approved transaction.
    #[error("Cannot delete transaction in {0} status")]
    NotDeletable(ApprovalStatus),

    /// Attempted to change payment status of a cancelled transaction.
    #[error("Cannot change payment status of transaction in {0} status")]
    PaymentStatusLocked(ApprovalStatus),

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RejectionReasonRequired => 400,
            Self::InvalidTransition { .. }
            | Self::NotEditable(_)
            | Self::NotDeletable(_)
            | Self::PaymentStatusLocked(_) => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotEditable(_) => "NOT_EDITABLE",
            Self::NotDeletable(_) => "NOT_DELETABLE",
            Self::PaymentStatusLocked(_) => "PAYMENT_STATUS_LOCKED",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: ApprovalStatus::Draft,
            to: ApprovalStatus::Approved,
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(
            err.to_string(),
            "Invalid status transition from DRAFT to APPROVED"
        );
    }

    #[test]
    fn test_not_deletable_error() {
        let err = WorkflowError::NotDeletable(ApprovalStatus::Approved);
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), "Cannot delete transaction in APPROVED status");
    }

    #[test]
    fn test_rejection_reason_required_error() {
        let err = WorkflowError::RejectionReasonRequired;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "REJECTION_REASON_REQUIRED");
    }
}
