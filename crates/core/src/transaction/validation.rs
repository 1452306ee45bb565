//! Rules a transaction must satisfy before it is written.

use chrono::NaiveDate;
use holdco_shared::types::{
    AllocationRuleId, Amount, BusinessUnitId, CategoryId, PaymentMethodId,
};

use super::error::TransactionValidationError;
use super::types::{CostAllocation, Counterpart, PaymentStatus, TransactionType};

/// Upper bound on attachments per transaction.
pub const MAX_ATTACHMENTS: usize = 20;

/// URL prefix of files served from the uploads directory.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// A typed transaction request, shared by create and update.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Business date.
    pub date: NaiveDate,
    /// Income, expense or loan.
    pub transaction_type: TransactionType,
    /// Category, which must be defined for `transaction_type`.
    pub category_id: CategoryId,
    /// The other party.
    pub counterpart: Counterpart,
    /// Owning unit. Optional only for INDIRECT, where a default is assigned.
    pub business_unit_id: Option<BusinessUnitId>,
    /// Amount in whole currency units.
    pub amount: Amount,
    /// Direct or rule-based.
    pub cost_allocation: CostAllocation,
    /// Set iff `cost_allocation` is INDIRECT.
    pub allocation_rule_id: Option<AllocationRuleId>,
    /// How it was or will be paid.
    pub payment_method_id: PaymentMethodId,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// Free text.
    pub description: Option<String>,
    /// File references.
    pub attachments: Vec<String>,
}

impl TransactionDraft {
    /// Checks every rule that needs no database lookup.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(
                self.amount.units(),
            ));
        }

        match (self.cost_allocation, self.allocation_rule_id) {
            (CostAllocation::Indirect, None) => {
                return Err(TransactionValidationError::AllocationRuleRequired);
            }
            (CostAllocation::Direct, Some(_)) => {
                return Err(TransactionValidationError::UnexpectedAllocationRule);
            }
            _ => {}
        }

        if self.cost_allocation == CostAllocation::Direct && self.business_unit_id.is_none() {
            return Err(TransactionValidationError::BusinessUnitRequired);
        }

        validate_attachments(&self.attachments)
    }
}

/// Checks the attachment list length and each reference.
///
/// A reference is either a path under `/uploads/` without `..` segments, or
/// an absolute `http(s)` URL.
///
/// # Errors
///
/// Returns `TooManyAttachments` or the first `InvalidAttachment`.
pub fn validate_attachments(attachments: &[String]) -> Result<(), TransactionValidationError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(TransactionValidationError::TooManyAttachments {
            count: attachments.len(),
            max: MAX_ATTACHMENTS,
        });
    }

    for reference in attachments {
        let valid = if let Some(path) = reference.strip_prefix(UPLOADS_PREFIX) {
            !path.is_empty() && !path.split('/').any(|segment| segment == "..")
        } else {
            reference.starts_with("https://") || reference.starts_with("http://")
        };
        if !valid {
            return Err(TransactionValidationError::InvalidAttachment(
                reference.clone(),
            ));
        }
    }

    Ok(())
}

/// A transaction may only use a category defined for its own type.
///
/// # Errors
///
/// Returns `CategoryTypeMismatch` if the types differ.
pub fn ensure_category_matches(
    category_type: TransactionType,
    transaction_type: TransactionType,
) -> Result<(), TransactionValidationError> {
    if category_type == transaction_type {
        Ok(())
    } else {
        Err(TransactionValidationError::CategoryTypeMismatch {
            category: category_type,
            transaction: transaction_type,
        })
    }
}
