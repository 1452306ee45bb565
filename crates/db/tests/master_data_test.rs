//! Integration tests for master data repositories.

mod common;

use common::{business_unit, ledger, partner_input, payment_method, setup};
use holdco_core::access::{AccessError, Role};
use holdco_core::audit::EntityKind;
use holdco_core::transaction::TransactionType;
use holdco_db::repositories::{
    ActivityLogFilter, ActivityLogRepository, BusinessUnitInput, BusinessUnitRepository,
    CategoryInput, CategoryRepository, EmployeeFilter, EmployeeInput, EmployeeRepository,
    PartnerFilter, PartnerRepository, PaymentMethodRepository, RepositoryError,
    TransactionRepository,
};
use holdco_shared::types::{BusinessUnitId, PageRequest, PaymentMethodId};
use rstest::rstest;

fn unit_input(code: &str, name: &str) -> BusinessUnitInput {
    BusinessUnitInput {
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        is_active: true,
    }
}

fn employee_input(code: &str, bu: uuid::Uuid) -> EmployeeInput {
    EmployeeInput {
        code: code.to_string(),
        full_name: format!("Employee {code}"),
        email: Some(format!("{}@holdco.test", code.to_lowercase())),
        phone: None,
        position: None,
        business_unit_id: BusinessUnitId::from_uuid(bu),
        is_active: true,
    }
}

#[rstest]
#[case::same_code("EDU", "Education Two", "code")]
#[case::same_name("EDU2", "Education", "name")]
#[tokio::test]
async fn test_duplicate_business_unit_conflicts(
    #[case] code: &str,
    #[case] name: &str,
    #[case] field: &str,
) {
    let t = setup().await;
    let repo = BusinessUnitRepository::new(t.db.clone());
    repo.create(&t.admin, unit_input("EDU", "Education")).await.unwrap();

    let err = repo.create(&t.admin, unit_input(code, name)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(ref m) if m.contains(field)));
}

#[tokio::test]
async fn test_update_business_unit_keeps_own_code() {
    let t = setup().await;
    let repo = BusinessUnitRepository::new(t.db.clone());
    let unit = repo.create(&t.admin, unit_input("EDU", "Education")).await.unwrap();

    let mut input = unit_input("EDU", "Education Centre");
    input.description = Some("Language school".into());
    let updated = repo.update(&t.admin, unit.id, input).await.unwrap();
    assert_eq!(updated.name, "Education Centre");
    assert_eq!(updated.code, "EDU");
}

#[rstest]
#[case::employees("employees")]
#[case::partners("partners")]
#[tokio::test]
async fn test_delete_referenced_business_unit_is_refused(#[case] dependents: &str) {
    let t = setup().await;
    let unit = business_unit(&t, "EDU").await;
    if dependents == "employees" {
        EmployeeRepository::new(t.db.clone())
            .create(&t.admin, employee_input("E001", unit.id))
            .await
            .unwrap();
    } else {
        PartnerRepository::new(t.db.clone())
            .create(&t.admin, partner_input("P001", Some(unit.id)))
            .await
            .unwrap();
    }

    let err = BusinessUnitRepository::new(t.db.clone())
        .delete(&t.admin, unit.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InUse(ref m) if m.contains(dependents)));
}

#[tokio::test]
async fn test_delete_unused_business_unit_is_logged() {
    let t = setup().await;
    let unit = business_unit(&t, "EDU").await;
    BusinessUnitRepository::new(t.db.clone())
        .delete(&t.admin, unit.id)
        .await
        .unwrap();

    let logs = ActivityLogRepository::new(t.db.clone())
        .history(&t.admin, EntityKind::BusinessUnit, unit.id)
        .await
        .unwrap();
    let actions: Vec<&str> = logs.iter().map(|log| log.action.as_str()).collect();
    assert_eq!(actions, ["CREATE", "DELETE"]);
}

#[tokio::test]
async fn test_delete_payment_method_used_by_partner_is_refused() {
    let t = setup().await;
    let method = payment_method(&t, "Bank transfer").await;
    let mut input = partner_input("P001", None);
    input.payment_method_id = Some(PaymentMethodId::from_uuid(method.id));
    PartnerRepository::new(t.db.clone())
        .create(&t.admin, input)
        .await
        .unwrap();

    let err = PaymentMethodRepository::new(t.db.clone())
        .delete(&t.admin, method.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InUse(ref m) if m.contains("in use")));
}

#[tokio::test]
async fn test_delete_payment_method_used_by_transaction_is_refused() {
    let t = setup().await;
    let l = ledger(&t).await;
    TransactionRepository::new(t.db.clone())
        .create(&t.admin, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();

    let err = PaymentMethodRepository::new(t.db.clone())
        .delete(&t.admin, l.cash.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InUse(_)));
}

#[tokio::test]
async fn test_duplicate_payment_method_name_conflict() {
    let t = setup().await;
    payment_method(&t, "Cash").await;
    let err = PaymentMethodRepository::new(t.db.clone())
        .create(
            &t.admin,
            holdco_db::repositories::PaymentMethodInput {
                name: "Cash".into(),
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(_)));
}

#[tokio::test]
async fn test_category_type_is_locked_once_used() {
    let t = setup().await;
    let l = ledger(&t).await;
    TransactionRepository::new(t.db.clone())
        .create(&t.admin, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();

    let err = CategoryRepository::new(t.db.clone())
        .update(
            &t.admin,
            l.expense.id,
            CategoryInput {
                code: l.expense.code.clone(),
                name: l.expense.name.clone(),
                transaction_type: TransactionType::Income,
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    let err = CategoryRepository::new(t.db.clone())
        .delete(&t.admin, l.expense.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InUse(_)));
}

#[tokio::test]
async fn test_partner_tax_code_must_be_unique() {
    let t = setup().await;
    let repo = PartnerRepository::new(t.db.clone());
    let mut first = partner_input("P001", None);
    first.tax_code = Some("0101234567".into());
    repo.create(&t.admin, first).await.unwrap();

    let mut second = partner_input("P002", None);
    second.tax_code = Some("0101234567".into());
    let err = repo.create(&t.admin, second).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(ref m) if m.contains("tax code")));

    // Partners without a tax code never collide
    repo.create(&t.admin, partner_input("P003", None)).await.unwrap();
    repo.create(&t.admin, partner_input("P004", None)).await.unwrap();
}

#[tokio::test]
async fn test_staff_cannot_write_master_data() {
    let t = setup().await;
    let unit = business_unit(&t, "EDU").await;
    let staff = common::insert_user(&t.db, Role::Staff, Some(BusinessUnitId::from_uuid(unit.id))).await;

    let err = BusinessUnitRepository::new(t.db.clone())
        .create(&staff, unit_input("NEW", "New unit"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Access(AccessError::Forbidden { .. })));

    // Reads stay open
    let units = BusinessUnitRepository::new(t.db.clone())
        .list(&staff, None)
        .await
        .unwrap();
    assert_eq!(units.len(), 1);
}

#[tokio::test]
async fn test_partner_visibility_by_business_unit() {
    let t = setup().await;
    let a = business_unit(&t, "A").await;
    let b = business_unit(&t, "B").await;
    let repo = PartnerRepository::new(t.db.clone());
    repo.create(&t.admin, partner_input("PA", Some(a.id))).await.unwrap();
    repo.create(&t.admin, partner_input("PB", Some(b.id))).await.unwrap();
    repo.create(&t.admin, partner_input("PS", None)).await.unwrap();

    let staff_a = common::insert_user(&t.db, Role::Staff, Some(BusinessUnitId::from_uuid(a.id))).await;
    let orphan = common::insert_user(&t.db, Role::Staff, None).await;

    let codes = |list: Vec<holdco_db::entities::partners::Model>| {
        list.into_iter().map(|p| p.code).collect::<Vec<_>>()
    };
    assert_eq!(
        codes(repo.list(&t.admin, PartnerFilter::default()).await.unwrap()),
        ["PA", "PB", "PS"]
    );
    assert_eq!(
        codes(repo.list(&staff_a, PartnerFilter::default()).await.unwrap()),
        ["PA", "PS"]
    );
    assert_eq!(
        codes(repo.list(&orphan, PartnerFilter::default()).await.unwrap()),
        ["PS"]
    );
}

#[tokio::test]
async fn test_bu_lead_manages_employees_of_own_unit_only() {
    let t = setup().await;
    let a = business_unit(&t, "A").await;
    let b = business_unit(&t, "B").await;
    let lead = common::insert_user(&t.db, Role::BuLead, Some(BusinessUnitId::from_uuid(a.id))).await;
    let repo = EmployeeRepository::new(t.db.clone());

    repo.create(&lead, employee_input("E001", a.id)).await.unwrap();
    let err = repo
        .create(&lead, employee_input("E002", b.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Access(AccessError::OutsideBusinessUnit(_))
    ));

    repo.create(&t.admin, employee_input("E003", b.id)).await.unwrap();
    let visible = repo.list(&lead, EmployeeFilter::default()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].code, "E001");
}

#[tokio::test]
async fn test_activity_log_needs_privileged_role() {
    let t = setup().await;
    business_unit(&t, "A").await;
    payment_method(&t, "Cash").await;

    let repo = ActivityLogRepository::new(t.db.clone());
    let page = repo
        .list(
            &t.admin,
            ActivityLogFilter {
                entity_type: Some(EntityKind::PaymentMethod),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].summary, "Created payment method Cash");

    let lead = common::insert_user(&t.db, Role::BuLead, None).await;
    let err = repo
        .list(&lead, ActivityLogFilter::default(), PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Access(_)));
}
