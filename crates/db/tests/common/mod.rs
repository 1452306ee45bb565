//! Shared fixtures for repository integration tests.
//!
//! Each test gets its own in-memory SQLite database with all migrations
//! applied. The pool is capped at one connection so every query sees the
//! same database.

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use holdco_core::access::{Principal, Role};
use holdco_core::allocation::AllocationLine;
use holdco_core::auth::hash_password;
use holdco_core::transaction::{
    CostAllocation, Counterpart, PaymentStatus, TransactionDraft, TransactionType,
};
use holdco_db::entities::sea_orm_active_enums::{PartnerType, UserRole};
use holdco_db::entities::{business_units, categories, payment_methods, users};
use holdco_db::repositories::{
    AllocationRuleInput, AllocationRuleRepository, BusinessUnitInput, BusinessUnitRepository,
    CategoryInput, CategoryRepository, PartnerInput, PaymentMethodInput, PaymentMethodRepository,
    RuleWithLines,
};
use holdco_db::{Migrator, connect};
use holdco_shared::types::{
    Amount, BusinessUnitId, CategoryId, PaymentMethodId, UserId,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

pub struct TestDb {
    pub db: DatabaseConnection,
    pub admin: Principal,
}

pub async fn setup() -> TestDb {
    let db = connect("sqlite::memory:", 1, 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let admin = insert_user(&db, Role::Admin, None).await;
    TestDb { db, admin }
}

/// Inserts a user directly and returns the principal it acts as.
pub async fn insert_user(
    db: &DatabaseConnection,
    role: Role,
    business_unit_id: Option<BusinessUnitId>,
) -> Principal {
    let id = Uuid::now_v7();
    let now = Utc::now().into();
    users::ActiveModel {
        id: Set(id),
        email: Set(format!("{id}@holdco.test")),
        password_hash: Set(hash_password("correct-horse").unwrap()),
        full_name: Set(format!("{role} user")),
        role: Set(UserRole::from(role)),
        business_unit_id: Set(business_unit_id.map(BusinessUnitId::into_inner)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();
    Principal::new(UserId::from_uuid(id), role, business_unit_id)
}

pub async fn business_unit(t: &TestDb, code: &str) -> business_units::Model {
    BusinessUnitRepository::new(t.db.clone())
        .create(
            &t.admin,
            BusinessUnitInput {
                code: code.to_string(),
                name: format!("Unit {code}"),
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap()
}

pub async fn category(
    t: &TestDb,
    code: &str,
    transaction_type: TransactionType,
) -> categories::Model {
    CategoryRepository::new(t.db.clone())
        .create(
            &t.admin,
            CategoryInput {
                code: code.to_string(),
                name: format!("Category {code}"),
                transaction_type,
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap()
}

pub async fn payment_method(t: &TestDb, name: &str) -> payment_methods::Model {
    PaymentMethodRepository::new(t.db.clone())
        .create(
            &t.admin,
            PaymentMethodInput {
                name: name.to_string(),
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap()
}

pub async fn rule(t: &TestDb, name: &str, lines: &[(Uuid, Decimal)]) -> RuleWithLines {
    AllocationRuleRepository::new(t.db.clone())
        .create(&t.admin, rule_input(name, lines))
        .await
        .unwrap()
}

pub fn rule_input(name: &str, lines: &[(Uuid, Decimal)]) -> AllocationRuleInput {
    AllocationRuleInput {
        name: name.to_string(),
        description: None,
        is_active: true,
        lines: lines
            .iter()
            .map(|(bu, percentage)| AllocationLine {
                business_unit_id: BusinessUnitId::from_uuid(*bu),
                percentage: *percentage,
            })
            .collect(),
    }
}

pub fn partner_input(code: &str, business_unit_id: Option<Uuid>) -> PartnerInput {
    PartnerInput {
        code: code.to_string(),
        name: format!("Partner {code}"),
        partner_type: PartnerType::Supplier,
        tax_code: None,
        phone: None,
        email: None,
        address: None,
        bank_account: None,
        business_unit_id: business_unit_id.map(BusinessUnitId::from_uuid),
        payment_method_id: None,
        is_active: true,
    }
}

/// Master data every transaction test needs.
pub struct Ledger {
    pub unit_a: business_units::Model,
    pub unit_b: business_units::Model,
    pub expense: categories::Model,
    pub income: categories::Model,
    pub cash: payment_methods::Model,
}

pub async fn ledger(t: &TestDb) -> Ledger {
    Ledger {
        unit_a: business_unit(t, "A").await,
        unit_b: business_unit(t, "B").await,
        expense: category(t, "EXP-RENT", TransactionType::Expense).await,
        income: category(t, "INC-FEES", TransactionType::Income).await,
        cash: payment_method(t, "Cash").await,
    }
}

pub fn draft(ledger: &Ledger, business_unit_id: Uuid) -> TransactionDraft {
    TransactionDraft {
        date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        transaction_type: TransactionType::Expense,
        category_id: CategoryId::from_uuid(ledger.expense.id),
        counterpart: Counterpart::Other("Landlord".to_string()),
        business_unit_id: Some(BusinessUnitId::from_uuid(business_unit_id)),
        amount: Amount::new(1_000_000),
        cost_allocation: CostAllocation::Direct,
        allocation_rule_id: None,
        payment_method_id: PaymentMethodId::from_uuid(ledger.cash.id),
        payment_status: PaymentStatus::Unpaid,
        description: Some("Office rent".to_string()),
        attachments: vec!["/uploads/2026/01/rent.pdf".to_string()],
    }
}
