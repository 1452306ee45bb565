//! Amount split using the Largest Remainder Method.
//!
//! Works on integer currency units:
//! 1. Compute each exact share as `total * basis_points / 10_000`
//! 2. Floor each share
//! 3. Compute how many units are left over against the rounded expected total
//! 4. Hand the leftover units to the lines with the largest fractional parts
//!
//! Ties go to the earlier line in rule order, so the result is deterministic.

use holdco_shared::types::{Amount, BusinessUnitId};
use rust_decimal::Decimal;

use super::error::AllocationError;
use super::types::{
    AllocationLine, AllocationShare, FULL_BASIS_POINTS, percentage_to_basis_points,
};

/// Splits `total` across the rule lines.
///
/// When the percentages sum to 100 the shares sum to `total` exactly. For
/// legacy rules with another sum, the shares sum to
/// `round(total * sum / 100)`, rounding half up.
///
/// # Errors
///
/// Returns an error if `total` is not positive, `lines` is empty, or a
/// percentage is out of range.
///
/// # Example
///
/// ```
/// use holdco_core::allocation::{AllocationLine, split_amount};
/// use holdco_shared::types::BusinessUnitId;
/// use rust_decimal_macros::dec;
///
/// let lines = vec![
///     AllocationLine { business_unit_id: BusinessUnitId::new(), percentage: dec!(60) },
///     AllocationLine { business_unit_id: BusinessUnitId::new(), percentage: dec!(40) },
/// ];
/// let shares = split_amount(1_000_000, &lines).unwrap();
/// assert_eq!(shares[0].amount.units(), 600_000);
/// assert_eq!(shares[1].amount.units(), 400_000);
/// ```
pub fn split_amount(
    total: i64,
    lines: &[AllocationLine],
) -> Result<Vec<AllocationShare>, AllocationError> {
    if total <= 0 {
        return Err(AllocationError::InvalidAmount(total));
    }
    if lines.is_empty() {
        return Err(AllocationError::EmptyRule);
    }

    let basis_points = lines
        .iter()
        .map(|line| percentage_to_basis_points(line.percentage))
        .collect::<Result<Vec<_>, _>>()?;

    let full = i128::from(FULL_BASIS_POINTS);
    let total_wide = i128::from(total);

    let mut floors = Vec::with_capacity(lines.len());
    let mut remainders = Vec::with_capacity(lines.len());
    for bp in &basis_points {
        let exact = total_wide * i128::from(*bp);
        floors.push(exact / full);
        remainders.push(exact % full);
    }

    let bp_sum: i128 = basis_points.iter().map(|bp| i128::from(*bp)).sum();
    let expected = (total_wide * bp_sum + full / 2) / full;
    let allocated: i128 = floors.iter().sum();
    let leftover = usize::try_from(expected - allocated).map_err(|_| AllocationError::Overflow)?;

    if leftover > 0 {
        // Stable sort keeps rule order among equal remainders.
        let mut order: Vec<usize> = (0..lines.len()).collect();
        order.sort_by(|a, b| remainders[*b].cmp(&remainders[*a]));
        for idx in order.into_iter().take(leftover) {
            floors[idx] += 1;
        }
    }

    lines
        .iter()
        .zip(floors)
        .map(|(line, units)| {
            let units = i64::try_from(units).map_err(|_| AllocationError::Overflow)?;
            Ok(AllocationShare {
                business_unit_id: line.business_unit_id,
                percentage: line.percentage,
                amount: Amount::new(units),
            })
        })
        .collect()
}

/// The single share of a DIRECT transaction: 100% to its own unit.
#[must_use]
pub fn direct_share(business_unit_id: BusinessUnitId, total: Amount) -> AllocationShare {
    AllocationShare {
        business_unit_id,
        percentage: Decimal::ONE_HUNDRED,
        amount: total,
    }
}
