//! Property-based tests for the access policy.

use holdco_shared::types::{BusinessUnitId, UserId};
use proptest::prelude::*;
use uuid::Uuid;

use super::policy::authorize;
use super::types::{Action, Principal, Resource, Role};

fn arb_action() -> impl Strategy<Value = Action> {
    prop::sample::select(vec![
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Submit,
        Action::Approve,
        Action::Reject,
        Action::Cancel,
        Action::UpdatePaymentStatus,
    ])
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn arb_bu() -> impl Strategy<Value = BusinessUnitId> {
    // Small pool so principals and resources frequently share a unit.
    (0u128..3).prop_map(|n| BusinessUnitId::from_uuid(Uuid::from_u128(n + 1)))
}

fn arb_user() -> impl Strategy<Value = UserId> {
    (0u128..3).prop_map(|n| UserId::from_uuid(Uuid::from_u128(n + 100)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Non-privileged callers never touch transactions outside their scope.
    #[test]
    fn prop_transactions_confined_to_scope(
        role in arb_role(),
        home in prop::option::of(arb_bu()),
        user in arb_user(),
        tx_bu in arb_bu(),
        creator in arb_user(),
        action in arb_action(),
    ) {
        let principal = Principal::new(user, role, home);
        let resource = Resource::Transaction { business_unit_id: tx_bu, created_by: creator };
        let allowed = authorize(&principal, &resource, action).is_ok();
        if allowed && !role.is_privileged() {
            prop_assert!(principal.visibility().contains(tx_bu));
            prop_assert!(!action.is_decision());
        }
    }

    /// Whatever staff may mutate, they created.
    #[test]
    fn prop_staff_mutates_only_own_transactions(
        home in arb_bu(),
        user in arb_user(),
        creator in arb_user(),
        action in arb_action(),
    ) {
        prop_assume!(!matches!(action, Action::Read | Action::Create));
        let principal = Principal::new(user, Role::Staff, Some(home));
        let resource = Resource::Transaction { business_unit_id: home, created_by: creator };
        if authorize(&principal, &resource, action).is_ok() {
            prop_assert_eq!(creator, user);
        }
    }

    /// CEO and Admin are never refused.
    #[test]
    fn prop_privileged_never_refused(
        admin in any::<bool>(),
        home in prop::option::of(arb_bu()),
        tx_bu in arb_bu(),
        creator in arb_user(),
        action in arb_action(),
    ) {
        let role = if admin { Role::Admin } else { Role::Ceo };
        let principal = Principal::new(UserId::new(), role, home);
        for resource in [
            Resource::Transaction { business_unit_id: tx_bu, created_by: creator },
            Resource::Partner { business_unit_id: None },
            Resource::Employee { business_unit_id: tx_bu },
            Resource::User,
            Resource::ActivityLog,
        ] {
            prop_assert!(authorize(&principal, &resource, action).is_ok());
        }
    }
}
