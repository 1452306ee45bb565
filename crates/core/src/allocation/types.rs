//! Allocation rule domain types.

use std::collections::HashSet;

use holdco_shared::types::{AllocationRuleId, Amount, BusinessUnitId};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::error::AllocationError;

/// Basis points in 100%.
pub const FULL_BASIS_POINTS: i32 = 10_000;

/// One business unit's percentage within a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationLine {
    /// Business unit receiving the share.
    pub business_unit_id: BusinessUnitId,
    /// Percentage in `[0, 100]`, at most two decimal places.
    pub percentage: Decimal,
}

/// A named mapping of business units to percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRule {
    /// Rule ID.
    pub id: AllocationRuleId,
    /// Display name.
    pub name: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Lines in rule order.
    pub lines: Vec<AllocationLine>,
}

/// The computed amount for one business unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationShare {
    /// Business unit receiving the share.
    pub business_unit_id: BusinessUnitId,
    /// Percentage the share was computed from.
    pub percentage: Decimal,
    /// Share in whole currency units.
    pub amount: Amount,
}

impl AllocationRule {
    /// Checks the rule is usable for allocation.
    ///
    /// # Errors
    ///
    /// See [`validate_lines`].
    pub fn validate(&self) -> Result<(), AllocationError> {
        validate_lines(&self.lines)
    }

    /// The business unit with the largest percentage, first one on ties.
    ///
    /// Used as the default unit of an INDIRECT transaction.
    #[must_use]
    pub fn primary_business_unit(&self) -> Option<BusinessUnitId> {
        primary_business_unit(&self.lines)
    }
}

/// Validates rule lines: non-empty, unique units, each percentage in
/// `[0, 100]` with at most two decimals, and a total of exactly 100.
///
/// # Errors
///
/// Returns the first violation found, in the order listed above.
pub fn validate_lines(lines: &[AllocationLine]) -> Result<(), AllocationError> {
    if lines.is_empty() {
        return Err(AllocationError::EmptyRule);
    }

    let mut seen = HashSet::with_capacity(lines.len());
    let mut total_bp = 0i32;
    for line in lines {
        if !seen.insert(line.business_unit_id) {
            return Err(AllocationError::DuplicateBusinessUnit(line.business_unit_id));
        }
        total_bp += percentage_to_basis_points(line.percentage)?;
    }

    if total_bp != FULL_BASIS_POINTS {
        return Err(AllocationError::PercentageSum(basis_points_to_percentage(
            total_bp,
        )));
    }

    Ok(())
}

/// See [`AllocationRule::primary_business_unit`].
#[must_use]
pub fn primary_business_unit(lines: &[AllocationLine]) -> Option<BusinessUnitId> {
    let mut best: Option<&AllocationLine> = None;
    for line in lines {
        match best {
            Some(current) if line.percentage <= current.percentage => {}
            _ => best = Some(line),
        }
    }
    best.map(|line| line.business_unit_id)
}

/// Converts a percentage to basis points (`60.5` -> `6050`).
///
/// # Errors
///
/// Fails if the value is outside `[0, 100]` or has more than two decimals.
pub fn percentage_to_basis_points(percentage: Decimal) -> Result<i32, AllocationError> {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(AllocationError::PercentageOutOfRange(percentage));
    }

    let scaled = percentage * Decimal::ONE_HUNDRED;
    if scaled != scaled.trunc() {
        return Err(AllocationError::PercentageTooPrecise(percentage));
    }

    scaled
        .to_i32()
        .ok_or(AllocationError::PercentageOutOfRange(percentage))
}

/// Converts basis points back to a normalized percentage (`6050` -> `60.5`).
#[must_use]
pub fn basis_points_to_percentage(basis_points: i32) -> Decimal {
    Decimal::new(i64::from(basis_points), 2).normalize()
}
