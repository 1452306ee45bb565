//! Property-based tests for the allocation split.

use holdco_shared::types::BusinessUnitId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::split::split_amount;
use super::types::{AllocationLine, FULL_BASIS_POINTS};

/// Strategy for rule lines whose basis points add up to exactly 10,000.
fn rule_summing_to_100() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(1i32..10_000, 1..8).prop_map(|weights| {
        let weight_sum: i32 = weights.iter().sum();
        let mut bps: Vec<i32> = weights
            .iter()
            .map(|w| w * FULL_BASIS_POINTS / weight_sum)
            .collect();
        let assigned: i32 = bps.iter().sum();
        if let Some(last) = bps.last_mut() {
            *last += FULL_BASIS_POINTS - assigned;
        }
        bps
    })
}

fn to_lines(bps: &[i32]) -> Vec<AllocationLine> {
    bps.iter()
        .map(|bp| AllocationLine {
            business_unit_id: BusinessUnitId::new(),
            percentage: Decimal::new(i64::from(*bp), 2),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Shares of a rule summing to 100 always add back to the total.
    #[test]
    fn prop_shares_sum_to_total(
        total in 1i64..10_000_000_000_000,
        bps in rule_summing_to_100(),
    ) {
        let shares = split_amount(total, &to_lines(&bps)).unwrap();
        let sum: i64 = shares.iter().map(|s| s.amount.units()).sum();
        prop_assert_eq!(sum, total);
    }

    /// Every share is the floor or the ceiling of its exact value.
    #[test]
    fn prop_share_within_one_unit_of_exact(
        total in 1i64..10_000_000_000_000,
        bps in rule_summing_to_100(),
    ) {
        let shares = split_amount(total, &to_lines(&bps)).unwrap();
        for (share, bp) in shares.iter().zip(&bps) {
            let exact = i128::from(total) * i128::from(*bp);
            let floor = exact / i128::from(FULL_BASIS_POINTS);
            let units = i128::from(share.amount.units());
            prop_assert!(units == floor || units == floor + 1);
        }
    }

    /// Shares keep the rule's order and business units.
    #[test]
    fn prop_shares_follow_rule_order(
        total in 1i64..1_000_000_000,
        bps in rule_summing_to_100(),
    ) {
        let lines = to_lines(&bps);
        let shares = split_amount(total, &lines).unwrap();
        prop_assert_eq!(shares.len(), lines.len());
        for (share, line) in shares.iter().zip(&lines) {
            prop_assert_eq!(share.business_unit_id, line.business_unit_id);
            prop_assert!(share.amount.units() >= 0);
        }
    }

    /// Splitting twice gives the same answer.
    #[test]
    fn prop_split_is_deterministic(
        total in 1i64..1_000_000_000,
        bps in rule_summing_to_100(),
    ) {
        let lines = to_lines(&bps);
        prop_assert_eq!(
            split_amount(total, &lines).unwrap(),
            split_amount(total, &lines).unwrap()
        );
    }
}
