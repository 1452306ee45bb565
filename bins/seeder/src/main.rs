//! Development seed data.
//!
//! Creates an admin login, three business units, a handful of categories and
//! payment methods, and one allocation rule shared across the units. Running
//! it twice is a no-op.
//!
//! Usage: `cargo run --bin seeder` with `HOLDCO__DATABASE__URL` set.
//! `SEED_ADMIN_PASSWORD` overrides the default admin password.

use anyhow::Context;
use chrono::Utc;
use holdco_core::access::Role;
use holdco_core::allocation::AllocationLine;
use holdco_core::auth::hash_password;
use holdco_core::transaction::TransactionType;
use holdco_db::entities::{sea_orm_active_enums::UserRole, users};
use holdco_db::repositories::{
    AllocationRuleInput, BusinessUnitInput, CategoryInput, PaymentMethodInput, principal_of,
};
use holdco_db::{
    AllocationRuleRepository, BusinessUnitRepository, CategoryRepository, Migrator,
    PaymentMethodRepository, UserRepository, connect,
};
use holdco_shared::AppConfig;
use holdco_shared::types::BusinessUnitId;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@holdco.local";
const DEFAULT_ADMIN_PASSWORD: &str = "ChangeMe123!";

const BUSINESS_UNITS: [(&str, &str); 3] = [
    ("EDU", "Education Center"),
    ("TRV", "Travel Agency"),
    ("CNS", "Consulting"),
];

const CATEGORIES: [(&str, &str, TransactionType); 6] = [
    ("INC-TUITION", "Tuition fees", TransactionType::Income),
    ("INC-SERVICE", "Service revenue", TransactionType::Income),
    ("EXP-RENT", "Office rent", TransactionType::Expense),
    ("EXP-SALARY", "Salaries", TransactionType::Expense),
    ("EXP-UTILITY", "Utilities", TransactionType::Expense),
    ("LOAN-BANK", "Bank loan", TransactionType::Loan),
];

const PAYMENT_METHODS: [&str; 3] = ["Cash", "Bank transfer", "Card"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    println!("Connecting to database...");
    let db = connect(&config.database.url, 1, 1)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None).await?;

    if UserRepository::new(db.clone())
        .find_by_email(ADMIN_EMAIL)
        .await?
        .is_some()
    {
        println!("  Admin user already exists, skipping...");
        return Ok(());
    }

    println!("Seeding admin user...");
    let admin = seed_admin(&db).await?;
    let principal = principal_of(&admin);

    println!("Seeding business units...");
    let units = BusinessUnitRepository::new(db.clone());
    let mut unit_ids = Vec::new();
    for (code, name) in BUSINESS_UNITS {
        let unit = units
            .create(
                &principal,
                BusinessUnitInput {
                    code: code.to_string(),
                    name: name.to_string(),
                    description: None,
                    is_active: true,
                },
            )
            .await?;
        println!("  Created business unit: {code}");
        unit_ids.push(BusinessUnitId::from_uuid(unit.id));
    }

    println!("Seeding categories...");
    let categories = CategoryRepository::new(db.clone());
    for (code, name, transaction_type) in CATEGORIES {
        categories
            .create(
                &principal,
                CategoryInput {
                    code: code.to_string(),
                    name: name.to_string(),
                    transaction_type,
                    description: None,
                    is_active: true,
                },
            )
            .await?;
        println!("  Created category: {code}");
    }

    println!("Seeding payment methods...");
    let methods = PaymentMethodRepository::new(db.clone());
    for name in PAYMENT_METHODS {
        methods
            .create(
                &principal,
                PaymentMethodInput {
                    name: name.to_string(),
                    description: None,
                    is_active: true,
                },
            )
            .await?;
        println!("  Created payment method: {name}");
    }

    println!("Seeding allocation rule...");
    let percentages = [dec!(50), dec!(30), dec!(20)];
    AllocationRuleRepository::new(db.clone())
        .create(
            &principal,
            AllocationRuleInput {
                name: "Shared head office".to_string(),
                description: Some("Rent and utilities of the shared office".to_string()),
                is_active: true,
                lines: unit_ids
                    .iter()
                    .zip(percentages)
                    .map(|(&business_unit_id, percentage)| AllocationLine {
                        business_unit_id,
                        percentage,
                    })
                    .collect(),
            },
        )
        .await?;

    println!("Seeding complete! Log in as {ADMIN_EMAIL}");
    Ok(())
}

async fn seed_admin(db: &DatabaseConnection) -> anyhow::Result<users::Model> {
    let password = std::env::var("SEED_ADMIN_PASSWORD")
        .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    let now = Utc::now().into();

    let admin = users::ActiveModel {
        id: Set(Uuid::now_v7()),
        email: Set(ADMIN_EMAIL.to_string()),
        password_hash: Set(hash_password(&password)?),
        full_name: Set("System Administrator".to_string()),
        role: Set(UserRole::from(Role::Admin)),
        business_unit_id: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    println!("  Created admin user: {ADMIN_EMAIL}");
    Ok(admin)
}
