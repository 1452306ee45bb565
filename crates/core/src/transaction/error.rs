//! Transaction validation errors.

use thiserror::Error;

use super::types::{ObjectType, TransactionType};

/// Rule violations in a transaction request.
#[derive(Debug, Error)]
pub enum TransactionValidationError {
    /// Amount is zero or negative.
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(i64),

    /// The field matching `objectType` is absent.
    #[error("Counterpart for object type {0} is missing")]
    MissingCounterpart(ObjectType),

    /// A field belonging to another `objectType` is populated.
    #[error("Only the {0} counterpart field may be set")]
    ConflictingCounterpart(ObjectType),

    /// INDIRECT without `allocationRuleId`.
    #[error("Allocation rule is required for indirect cost allocation")]
    AllocationRuleRequired,

    /// DIRECT with `allocationRuleId`.
    #[error("Allocation rule is only allowed for indirect cost allocation")]
    UnexpectedAllocationRule,

    /// DIRECT without `businessUnitId`.
    #[error("Business unit is required for direct cost allocation")]
    BusinessUnitRequired,

    /// Category belongs to another transaction type.
    #[error("Category is for {category} transactions, not {transaction}")]
    CategoryTypeMismatch {
        /// Type the category is defined for.
        category: TransactionType,
        /// Type of the transaction.
        transaction: TransactionType,
    },

    /// Attachment list is longer than allowed.
    #[error("At most {max} attachments are allowed, got {count}")]
    TooManyAttachments {
        /// Attachments supplied.
        count: usize,
        /// Upper bound.
        max: usize,
    },

    /// Attachment reference is neither an upload path nor an absolute URL.
    #[error("Invalid attachment reference: {0}")]
    InvalidAttachment(String),
}

impl TransactionValidationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        400
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "INVALID_AMOUNT",
            Self::MissingCounterpart(_) => "COUNTERPART_MISSING",
            Self::ConflictingCounterpart(_) => "COUNTERPART_CONFLICT",
            Self::AllocationRuleRequired => "ALLOCATION_RULE_REQUIRED",
            Self::UnexpectedAllocationRule => "ALLOCATION_RULE_NOT_ALLOWED",
            Self::BusinessUnitRequired => "BUSINESS_UNIT_REQUIRED",
            Self::CategoryTypeMismatch { .. } => "CATEGORY_TYPE_MISMATCH",
            Self::TooManyAttachments { .. } => "TOO_MANY_ATTACHMENTS",
            Self::InvalidAttachment(_) => "INVALID_ATTACHMENT",
        }
    }
}
