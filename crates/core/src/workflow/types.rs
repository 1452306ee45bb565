//! Workflow domain types for the transaction approval lifecycle.

use chrono::{DateTime, Utc};
use holdco_shared::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval status of a transaction.
///
/// The valid transitions are:
/// - Draft / Rejected / Pending → Draft or Pending (edit, save or submit)
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject, with reason)
/// - Draft / Pending / Rejected → Cancelled (cancel)
///
/// Approved and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Being drafted, freely editable.
    Draft,
    /// Submitted and waiting for an approver.
    Pending,
    /// Approved (immutable).
    Approved,
    /// Sent back by an approver; editable and resubmittable.
    Rejected,
    /// Withdrawn (immutable).
    Cancelled,
}

impl ApprovalStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the transaction's fields can still be changed.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending | Self::Rejected)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Cancelled)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow action representing a state transition with audit data.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Edit saved as a draft or resubmitted. Clears any rejection reason.
    Save {
        /// Draft, or Pending when submitted.
        new_status: ApprovalStatus,
        /// Set when the edit also submits.
        submitted_at: Option<DateTime<Utc>>,
    },
    /// Submit for approval without editing.
    Submit {
        /// Always Pending.
        new_status: ApprovalStatus,
        /// When the transaction was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Approve a pending transaction.
    Approve {
        /// Always Approved.
        new_status: ApprovalStatus,
        /// The approver.
        approved_by: UserId,
        /// When the transaction was approved.
        approved_at: DateTime<Utc>,
    },
    /// Reject a pending transaction.
    Reject {
        /// Always Rejected.
        new_status: ApprovalStatus,
        /// The approver who rejected.
        rejected_by: UserId,
        /// Trimmed, non-empty reason.
        rejection_reason: String,
    },
    /// Cancel a transaction that is not approved.
    Cancel {
        /// Always Cancelled.
        new_status: ApprovalStatus,
        /// Who cancelled.
        cancelled_by: UserId,
        /// When it was cancelled.
        cancelled_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> ApprovalStatus {
        match self {
            Self::Save { new_status, .. }
            | Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Cancel { new_status, .. } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_and_parse() {
        for status in ApprovalStatus::ALL {
            assert_eq!(ApprovalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApprovalStatus::parse("pending"), Some(ApprovalStatus::Pending));
        assert_eq!(ApprovalStatus::parse("posted"), None);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
        assert_eq!(format!("{}", ApprovalStatus::Rejected), "REJECTED");
    }

    #[test]
    fn test_status_editable_and_terminal() {
        assert!(ApprovalStatus::Draft.is_editable());
        assert!(ApprovalStatus::Pending.is_editable());
        assert!(ApprovalStatus::Rejected.is_editable());
        assert!(!ApprovalStatus::Approved.is_editable());
        assert!(!ApprovalStatus::Cancelled.is_editable());

        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Cancelled.is_terminal());
        assert!(!ApprovalStatus::Rejected.is_terminal());
    }
}
