//! Allocation error types.

use holdco_shared::types::BusinessUnitId;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while validating a rule or splitting an amount.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Rule has no lines.
    #[error("Allocation rule must contain at least one business unit")]
    EmptyRule,

    /// The same business unit appears twice in one rule.
    #[error("Business unit {0} appears more than once in the allocation rule")]
    DuplicateBusinessUnit(BusinessUnitId),

    /// Percentage outside `[0, 100]`.
    #[error("Percentage {0} must be between 0 and 100")]
    PercentageOutOfRange(Decimal),

    /// Percentage with more than two decimal places.
    #[error("Percentage {0} has more than two decimal places")]
    PercentageTooPrecise(Decimal),

    /// Percentages do not add up to 100.
    #[error("Allocation percentages must sum to 100, got {0}")]
    PercentageSum(Decimal),

    /// Amount to split is not positive.
    #[error("Amount to allocate must be positive, got {0}")]
    InvalidAmount(i64),

    /// INDIRECT transaction without a rule.
    #[error("Allocation rule is required for indirect cost allocation")]
    RuleRequired,

    /// Referenced rule does not exist.
    #[error("Allocation rule {0} not found")]
    RuleNotFound(Uuid),

    /// Intermediate arithmetic left the `i64` range.
    #[error("Allocation amount overflow")]
    Overflow,
}

impl AllocationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RuleNotFound(_) => 404,
            Self::Overflow => 500,
            _ => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRule => "EMPTY_ALLOCATION_RULE",
            Self::DuplicateBusinessUnit(_) => "DUPLICATE_BUSINESS_UNIT",
            Self::PercentageOutOfRange(_) => "PERCENTAGE_OUT_OF_RANGE",
            Self::PercentageTooPrecise(_) => "PERCENTAGE_TOO_PRECISE",
            Self::PercentageSum(_) => "PERCENTAGE_SUM_INVALID",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::RuleRequired => "ALLOCATION_RULE_REQUIRED",
            Self::RuleNotFound(_) => "ALLOCATION_RULE_NOT_FOUND",
            Self::Overflow => "ALLOCATION_OVERFLOW",
        }
    }
}
