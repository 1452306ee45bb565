//! Property-based tests for transaction validation.

use holdco_shared::types::{AllocationRuleId, Amount, EmployeeId, PartnerId};
use proptest::prelude::*;

use super::error::TransactionValidationError;
use super::types::{CostAllocation, Counterpart, CounterpartFields, ObjectType};
use super::validation::tests::draft;

fn arb_object_type() -> impl Strategy<Value = ObjectType> {
    prop_oneof![
        Just(ObjectType::Partner),
        Just(ObjectType::Employee),
        Just(ObjectType::Student),
        Just(ObjectType::Other),
    ]
}

/// Strategy producing any combination of the four counterpart fields.
fn arb_fields() -> impl Strategy<Value = CounterpartFields> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::option::of("[a-zA-Z]{1,20}"),
        prop::option::of("[a-zA-Z]{1,20}"),
    )
        .prop_map(|(partner, employee, student_name, other_name)| CounterpartFields {
            partner_id: partner.then(PartnerId::new),
            employee_id: employee.then(EmployeeId::new),
            student_name,
            other_name,
        })
}

fn populated(fields: &CounterpartFields) -> Vec<ObjectType> {
    let mut set = Vec::new();
    if fields.partner_id.is_some() {
        set.push(ObjectType::Partner);
    }
    if fields.employee_id.is_some() {
        set.push(ObjectType::Employee);
    }
    if fields.student_name.is_some() {
        set.push(ObjectType::Student);
    }
    if fields.other_name.is_some() {
        set.push(ObjectType::Other);
    }
    set
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A counterpart builds iff exactly its own field is populated.
    #[test]
    fn prop_counterpart_exactly_one_field(
        object_type in arb_object_type(),
        fields in arb_fields(),
    ) {
        let set = populated(&fields);
        let result = Counterpart::from_fields(object_type, fields);
        if set == vec![object_type] {
            let counterpart = result.unwrap();
            prop_assert_eq!(counterpart.object_type(), object_type);
            prop_assert_eq!(populated(&counterpart.to_fields()), vec![object_type]);
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Non-positive amounts never validate.
    #[test]
    fn prop_non_positive_amount_rejected(units in i64::MIN..=0) {
        let mut d = draft();
        d.amount = Amount::new(units);
        let rejected = matches!(
            d.validate(),
            Err(TransactionValidationError::NonPositiveAmount(_))
        );
        prop_assert!(rejected);
    }

    /// The rule reference is present exactly when allocation is INDIRECT.
    #[test]
    fn prop_rule_iff_indirect(indirect in any::<bool>(), with_rule in any::<bool>()) {
        let mut d = draft();
        d.cost_allocation = if indirect { CostAllocation::Indirect } else { CostAllocation::Direct };
        d.allocation_rule_id = with_rule.then(AllocationRuleId::new);
        prop_assert_eq!(d.validate().is_ok(), indirect == with_rule);
    }
}
