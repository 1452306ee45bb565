//! Integration tests for the transaction repository.

mod common;

use chrono::NaiveDate;
use common::{ledger, partner_input, rule, setup};
use holdco_core::access::{AccessError, Role};
use holdco_core::audit::EntityKind;
use holdco_core::transaction::{
    CostAllocation, Counterpart, TransactionType, TransactionValidationError,
};
use holdco_db::entities::sea_orm_active_enums::{ApprovalState, CounterpartType};
use holdco_db::repositories::{
    ActivityLogRepository, PartnerRepository, RepositoryError, TransactionFilter,
    TransactionRepository, attachments_of, counterpart_of,
};
use holdco_shared::types::{AllocationRuleId, BusinessUnitId, CategoryId, PageRequest, PartnerId};
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn test_create_assigns_sequential_codes() {
    let t = setup().await;
    let l = ledger(&t).await;
    let repo = TransactionRepository::new(t.db.clone());

    let first = repo
        .create(&t.admin, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();
    let second = repo
        .create(&t.admin, common::draft(&l, l.unit_b.id), false)
        .await
        .unwrap();
    assert_eq!(first.code, "EXP-202601-0001");
    assert_eq!(second.code, "EXP-202601-0002");
    assert_eq!(first.approval_status, ApprovalState::Draft);
    assert_eq!(first.object_type, CounterpartType::Other);
    assert_eq!(first.other_name.as_deref(), Some("Landlord"));
    assert_eq!(attachments_of(&first), ["/uploads/2026/01/rent.pdf"]);

    let mut income = common::draft(&l, l.unit_a.id);
    income.transaction_type = TransactionType::Income;
    income.category_id = CategoryId::from_uuid(l.income.id);
    income.date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    let third = repo.create(&t.admin, income, true).await.unwrap();
    assert_eq!(third.code, "INC-202602-0001");
    assert_eq!(third.approval_status, ApprovalState::Pending);
    assert!(third.submitted_at.is_some());
}

#[tokio::test]
async fn test_create_is_logged_in_same_transaction() {
    let t = setup().await;
    let l = ledger(&t).await;
    let created = TransactionRepository::new(t.db.clone())
        .create(&t.admin, common::draft(&l, l.unit_a.id), true)
        .await
        .unwrap();

    let logs = ActivityLogRepository::new(t.db.clone())
        .history(&t.admin, EntityKind::Transaction, created.id)
        .await
        .unwrap();
    let actions: Vec<&str> = logs.iter().map(|log| log.action.as_str()).collect();
    assert_eq!(actions, ["CREATE", "SUBMIT"]);
    assert_eq!(logs[0].summary, "Created transaction EXP-202601-0001");
}

#[tokio::test]
async fn test_indirect_requires_rule() {
    let t = setup().await;
    let l = ledger(&t).await;
    let mut draft = common::draft(&l, l.unit_a.id);
    draft.cost_allocation = CostAllocation::Indirect;

    let err = TransactionRepository::new(t.db.clone())
        .create(&t.admin, draft, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Transaction(TransactionValidationError::AllocationRuleRequired)
    ));
}

#[tokio::test]
async fn test_indirect_default_business_unit() {
    let t = setup().await;
    let l = ledger(&t).await;
    let shared = rule(&t, "Shared", &[(l.unit_a.id, dec!(40)), (l.unit_b.id, dec!(60))]).await;
    let repo = TransactionRepository::new(t.db.clone());

    let mut draft = common::draft(&l, l.unit_a.id);
    draft.cost_allocation = CostAllocation::Indirect;
    draft.allocation_rule_id = Some(AllocationRuleId::from_uuid(shared.rule.id));
    draft.business_unit_id = None;

    // CEO/Admin: the unit with the largest share
    let by_admin = repo.create(&t.admin, draft.clone(), false).await.unwrap();
    assert_eq!(by_admin.business_unit_id, l.unit_b.id);

    // Scoped roles: their own unit
    let staff = common::insert_user(&t.db, Role::Staff, Some(BusinessUnitId::from_uuid(l.unit_a.id))).await;
    let by_staff = repo.create(&staff, draft, false).await.unwrap();
    assert_eq!(by_staff.business_unit_id, l.unit_a.id);

    let shares = repo.allocations(&staff, by_staff.id).await.unwrap();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].amount.units(), 400_000);
    assert_eq!(shares[1].amount.units(), 600_000);
}

#[tokio::test]
async fn test_direct_allocation_is_single_share() {
    let t = setup().await;
    let l = ledger(&t).await;
    let repo = TransactionRepository::new(t.db.clone());
    let created = repo
        .create(&t.admin, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();

    let shares = repo.allocations(&t.admin, created.id).await.unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].business_unit_id, BusinessUnitId::from_uuid(l.unit_a.id));
    assert_eq!(shares[0].percentage, dec!(100));
    assert_eq!(shares[0].amount.units(), 1_000_000);
}

#[tokio::test]
async fn test_category_must_match_type() {
    let t = setup().await;
    let l = ledger(&t).await;
    let mut draft = common::draft(&l, l.unit_a.id);
    draft.category_id = CategoryId::from_uuid(l.income.id);

    let err = TransactionRepository::new(t.db.clone())
        .create(&t.admin, draft, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Transaction(TransactionValidationError::CategoryTypeMismatch { .. })
    ));
}

#[tokio::test]
async fn test_unknown_partner_is_validation_error() {
    let t = setup().await;
    let l = ledger(&t).await;
    let mut draft = common::draft(&l, l.unit_a.id);
    draft.counterpart = Counterpart::Partner(PartnerId::from_uuid(Uuid::now_v7()));

    let err = TransactionRepository::new(t.db.clone())
        .create(&t.admin, draft, false)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(ref m) if m.starts_with("Partner")));
}

#[tokio::test]
async fn test_partner_counterpart_roundtrips() {
    let t = setup().await;
    let l = ledger(&t).await;
    let partner = PartnerRepository::new(t.db.clone())
        .create(&t.admin, partner_input("P001", None))
        .await
        .unwrap();
    let mut draft = common::draft(&l, l.unit_a.id);
    draft.counterpart = Counterpart::Partner(PartnerId::from_uuid(partner.id));

    let created = TransactionRepository::new(t.db.clone())
        .create(&t.admin, draft, false)
        .await
        .unwrap();
    assert_eq!(created.partner_id, Some(partner.id));
    assert!(created.other_name.is_none());
    assert_eq!(
        counterpart_of(&created).unwrap(),
        Counterpart::Partner(PartnerId::from_uuid(partner.id))
    );
}

#[tokio::test]
async fn test_staff_cannot_create_in_other_unit() {
    let t = setup().await;
    let l = ledger(&t).await;
    let staff = common::insert_user(&t.db, Role::Staff, Some(BusinessUnitId::from_uuid(l.unit_a.id))).await;

    let err = TransactionRepository::new(t.db.clone())
        .create(&staff, common::draft(&l, l.unit_b.id), false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Access(AccessError::OutsideBusinessUnit(_))
    ));
}

#[tokio::test]
async fn test_staff_mutates_only_own_transactions() {
    let t = setup().await;
    let l = ledger(&t).await;
    let a = Some(BusinessUnitId::from_uuid(l.unit_a.id));
    let author = common::insert_user(&t.db, Role::Staff, a).await;
    let colleague = common::insert_user(&t.db, Role::Staff, a).await;
    let lead = common::insert_user(&t.db, Role::BuLead, a).await;
    let repo = TransactionRepository::new(t.db.clone());

    let created = repo
        .create(&author, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();

    // Colleagues can read but not edit
    repo.get(&colleague, created.id).await.unwrap();
    let err = repo
        .update(&colleague, created.id, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Access(AccessError::NotCreator(_))));

    // The unit lead can
    let mut draft = common::draft(&l, l.unit_a.id);
    draft.description = Some("Office rent, January".into());
    let updated = repo.update(&lead, created.id, draft, false).await.unwrap();
    assert_eq!(updated.description.as_deref(), Some("Office rent, January"));
    assert_eq!(updated.created_by, author.user_id.into_inner());
}

#[tokio::test]
async fn test_update_reissues_code_when_month_changes() {
    let t = setup().await;
    let l = ledger(&t).await;
    let repo = TransactionRepository::new(t.db.clone());
    let created = repo
        .create(&t.admin, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();

    let mut draft = common::draft(&l, l.unit_a.id);
    draft.date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let moved = repo.update(&t.admin, created.id, draft, false).await.unwrap();
    assert_eq!(moved.code, "EXP-202603-0001");

    let same_month = repo
        .update(&t.admin, created.id, {
            let mut d = common::draft(&l, l.unit_a.id);
            d.date = NaiveDate::from_ymd_opt(2026, 3, 28).unwrap();
            d
        }, false)
        .await
        .unwrap();
    assert_eq!(same_month.code, "EXP-202603-0001");
}

#[tokio::test]
async fn test_list_is_scoped_and_filtered() {
    let t = setup().await;
    let l = ledger(&t).await;
    let repo = TransactionRepository::new(t.db.clone());
    repo.create(&t.admin, common::draft(&l, l.unit_a.id), false).await.unwrap();
    repo.create(&t.admin, common::draft(&l, l.unit_a.id), true).await.unwrap();
    repo.create(&t.admin, common::draft(&l, l.unit_b.id), false).await.unwrap();

    let page = repo
        .list(&t.admin, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);

    let staff_a = common::insert_user(&t.db, Role::Staff, Some(BusinessUnitId::from_uuid(l.unit_a.id))).await;
    let page = repo
        .list(&staff_a, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|tx| tx.business_unit_id == l.unit_a.id));

    let pending = repo
        .list(
            &staff_a,
            TransactionFilter {
                approval_status: Some(holdco_core::workflow::ApprovalStatus::Pending),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.meta.total, 1);

    let by_code = repo
        .list(
            &t.admin,
            TransactionFilter {
                search: Some("0003".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_code.meta.total, 1);

    let small = repo
        .list(&t.admin, TransactionFilter::default(), PageRequest::new(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(small.data.len(), 1);
    assert_eq!(small.meta.total_pages, 2);

    let orphan = common::insert_user(&t.db, Role::Staff, None).await;
    let page = repo
        .list(&orphan, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_unreadable_attachments_column_reads_as_empty() {
    let t = setup().await;
    let l = ledger(&t).await;
    let mut created = TransactionRepository::new(t.db.clone())
        .create(&t.admin, common::draft(&l, l.unit_a.id), false)
        .await
        .unwrap();
    assert_eq!(attachments_of(&created).len(), 1);

    created.attachments = serde_json::json!({ "file": "/uploads/2026/01/rent.pdf" });
    assert!(attachments_of(&created).is_empty());
}
