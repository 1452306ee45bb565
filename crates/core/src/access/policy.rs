//! The access policy.
//!
//! | Resource                 | CEO/ADMIN | BU_LEAD (own unit)        | STAFF (own unit)          |
//! |--------------------------|-----------|---------------------------|---------------------------|
//! | Transaction read/create  | yes       | yes                       | yes                       |
//! | Transaction mutate       | yes       | yes                       | creator only              |
//! | Transaction decide       | yes       | no                        | no                        |
//! | Partner/Employee read    | yes       | own unit, shared partners | own unit, shared partners |
//! | Partner/Employee write   | yes       | own unit                  | no                        |
//! | Master data read         | yes       | yes                       | yes                       |
//! | Master data write        | yes       | no                        | no                        |
//! | Users, activity log      | yes       | no                        | no                        |

use holdco_shared::types::BusinessUnitId;

use super::error::AccessError;
use super::types::{Action, BuScope, Principal, Resource, Role};

/// Decides whether `principal` may perform `action` on `resource`.
///
/// # Errors
///
/// Returns the reason for refusal.
pub fn authorize(
    principal: &Principal,
    resource: &Resource,
    action: Action,
) -> Result<(), AccessError> {
    if principal.role.is_privileged() {
        return Ok(());
    }

    let forbidden = || AccessError::Forbidden {
        role: principal.role,
        action,
        resource: resource.name(),
    };
    let scope = principal.visibility();

    match *resource {
        Resource::Transaction {
            business_unit_id,
            created_by,
        } => {
            if action.is_decision() {
                return Err(forbidden());
            }
            ensure_in_scope(scope, business_unit_id, resource)?;
            match action {
                Action::Read | Action::Create => Ok(()),
                _ if principal.role == Role::BuLead => Ok(()),
                _ if created_by == principal.user_id => Ok(()),
                _ => Err(AccessError::NotCreator(action)),
            }
        }
        Resource::Partner { business_unit_id } => match (action, business_unit_id) {
            (Action::Read, None) => Ok(()),
            (Action::Read, Some(bu)) => ensure_in_scope(scope, bu, resource),
            (_, _) if principal.role != Role::BuLead => Err(forbidden()),
            (_, Some(bu)) => ensure_in_scope(scope, bu, resource),
            (_, None) => Err(AccessError::OutsideBusinessUnit(resource.name())),
        },
        Resource::Employee { business_unit_id } => {
            if action != Action::Read && principal.role != Role::BuLead {
                return Err(forbidden());
            }
            ensure_in_scope(scope, business_unit_id, resource)
        }
        Resource::MasterData(_) => match action {
            Action::Read => Ok(()),
            _ => Err(forbidden()),
        },
        Resource::User | Resource::ActivityLog => Err(forbidden()),
    }
}

fn ensure_in_scope(
    scope: BuScope,
    business_unit_id: BusinessUnitId,
    resource: &Resource,
) -> Result<(), AccessError> {
    match scope {
        BuScope::Empty => Err(AccessError::NoBusinessUnit),
        _ if scope.contains(business_unit_id) => Ok(()),
        _ => Err(AccessError::OutsideBusinessUnit(resource.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::types::MasterData;
    use holdco_shared::types::UserId;
    use rstest::rstest;

    struct Fixture {
        home: BusinessUnitId,
        other: BusinessUnitId,
        lead: Principal,
        staff: Principal,
        orphan: Principal,
        admin: Principal,
    }

    fn fixture() -> Fixture {
        let home = BusinessUnitId::new();
        Fixture {
            home,
            other: BusinessUnitId::new(),
            lead: Principal::new(UserId::new(), Role::BuLead, Some(home)),
            staff: Principal::new(UserId::new(), Role::Staff, Some(home)),
            orphan: Principal::new(UserId::new(), Role::Staff, None),
            admin: Principal::new(UserId::new(), Role::Admin, None),
        }
    }

    fn transaction(bu: BusinessUnitId, created_by: UserId) -> Resource {
        Resource::Transaction {
            business_unit_id: bu,
            created_by,
        }
    }

    #[rstest]
    #[case(Action::Read)]
    #[case(Action::Create)]
    #[case(Action::Update)]
    #[case(Action::Delete)]
    #[case(Action::Approve)]
    #[case(Action::Reject)]
    fn test_privileged_roles_do_anything(#[case] action: Action) {
        let f = fixture();
        let ceo = Principal::new(UserId::new(), Role::Ceo, None);
        for principal in [f.admin, ceo] {
            assert!(authorize(&principal, &transaction(f.other, UserId::new()), action).is_ok());
            assert!(authorize(&principal, &Resource::User, action).is_ok());
            assert!(authorize(&principal, &Resource::ActivityLog, action).is_ok());
        }
    }

    #[test]
    fn test_staff_transaction_rules() {
        let f = fixture();
        let own = transaction(f.home, f.staff.user_id);
        let colleague = transaction(f.home, f.lead.user_id);

        assert!(authorize(&f.staff, &colleague, Action::Read).is_ok());
        assert!(authorize(&f.staff, &own, Action::Create).is_ok());
        assert!(authorize(&f.staff, &own, Action::Update).is_ok());
        assert!(authorize(&f.staff, &own, Action::Cancel).is_ok());
        assert!(matches!(
            authorize(&f.staff, &colleague, Action::Update),
            Err(AccessError::NotCreator(Action::Update))
        ));
        assert!(matches!(
            authorize(&f.staff, &own, Action::Approve),
            Err(AccessError::Forbidden { .. })
        ));
        assert!(matches!(
            authorize(&f.staff, &transaction(f.other, f.staff.user_id), Action::Read),
            Err(AccessError::OutsideBusinessUnit(_))
        ));
    }

    #[test]
    fn test_lead_transaction_rules() {
        let f = fixture();
        let staff_made = transaction(f.home, f.staff.user_id);

        assert!(authorize(&f.lead, &staff_made, Action::Update).is_ok());
        assert!(authorize(&f.lead, &staff_made, Action::Delete).is_ok());
        assert!(authorize(&f.lead, &staff_made, Action::UpdatePaymentStatus).is_ok());
        assert!(authorize(&f.lead, &staff_made, Action::Reject).is_err());
        assert!(authorize(&f.lead, &transaction(f.other, f.lead.user_id), Action::Read).is_err());
    }

    #[test]
    fn test_partner_rules() {
        let f = fixture();
        let shared = Resource::Partner {
            business_unit_id: None,
        };
        let own = Resource::Partner {
            business_unit_id: Some(f.home),
        };
        let foreign = Resource::Partner {
            business_unit_id: Some(f.other),
        };

        assert!(authorize(&f.staff, &shared, Action::Read).is_ok());
        assert!(authorize(&f.staff, &own, Action::Read).is_ok());
        assert!(authorize(&f.staff, &foreign, Action::Read).is_err());
        assert!(matches!(
            authorize(&f.staff, &own, Action::Create),
            Err(AccessError::Forbidden { .. })
        ));

        assert!(authorize(&f.lead, &own, Action::Update).is_ok());
        assert!(authorize(&f.lead, &foreign, Action::Delete).is_err());
        assert!(authorize(&f.lead, &shared, Action::Create).is_err());

        assert!(authorize(&f.orphan, &shared, Action::Read).is_ok());
        assert!(matches!(
            authorize(&f.orphan, &own, Action::Read),
            Err(AccessError::NoBusinessUnit)
        ));
    }

    #[test]
    fn test_employee_rules() {
        let f = fixture();
        let own = Resource::Employee {
            business_unit_id: f.home,
        };
        let foreign = Resource::Employee {
            business_unit_id: f.other,
        };

        assert!(authorize(&f.staff, &own, Action::Read).is_ok());
        assert!(authorize(&f.staff, &own, Action::Update).is_err());
        assert!(authorize(&f.lead, &own, Action::Create).is_ok());
        assert!(authorize(&f.lead, &foreign, Action::Read).is_err());
    }

    #[rstest]
    #[case(MasterData::BusinessUnit)]
    #[case(MasterData::Category)]
    #[case(MasterData::PaymentMethod)]
    #[case(MasterData::AllocationRule)]
    fn test_master_data_read_only_for_non_privileged(#[case] table: MasterData) {
        let f = fixture();
        let resource = Resource::MasterData(table);
        for principal in [f.lead, f.staff, f.orphan] {
            assert!(authorize(&principal, &resource, Action::Read).is_ok());
            assert!(authorize(&principal, &resource, Action::Create).is_err());
            assert!(authorize(&principal, &resource, Action::Delete).is_err());
        }
        assert!(authorize(&f.admin, &resource, Action::Update).is_ok());
    }

    #[test]
    fn test_users_and_activity_log_are_admin_only() {
        let f = fixture();
        for principal in [f.lead, f.staff] {
            assert!(authorize(&principal, &Resource::User, Action::Read).is_err());
            assert!(authorize(&principal, &Resource::ActivityLog, Action::Read).is_err());
        }
    }

    #[test]
    fn test_forbidden_message() {
        let f = fixture();
        let err = authorize(
            &f.staff,
            &Resource::MasterData(MasterData::PaymentMethod),
            Action::Delete,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Role STAFF may not delete payment methods");
        assert_eq!(err.status_code(), 403);
    }
}
