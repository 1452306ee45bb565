//! Master data: business units, users, categories, payment methods, partners,
//! employees and allocation rules.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn is_active<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .boolean()
        .not_null()
        .default(true)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessUnits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BusinessUnits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BusinessUnits::Code).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(BusinessUnits::Name).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(BusinessUnits::Description).text().null())
                    .col(is_active(BusinessUnits::IsActive))
                    .col(created_at(BusinessUnits::CreatedAt))
                    .col(created_at(BusinessUnits::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::BusinessUnitId).uuid().null())
                    .col(is_active(Users::IsActive))
                    .col(created_at(Users::CreatedAt))
                    .col(created_at(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_business_unit")
                            .from(Users::Table, Users::BusinessUnitId)
                            .to(BusinessUnits::Table, BusinessUnits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Code).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Categories::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Categories::TransactionType).string_len(16).not_null())
                    .col(ColumnDef::new(Categories::Description).text().null())
                    .col(is_active(Categories::IsActive))
                    .col(created_at(Categories::CreatedAt))
                    .col(created_at(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PaymentMethods::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PaymentMethods::Name).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(PaymentMethods::Description).text().null())
                    .col(is_active(PaymentMethods::IsActive))
                    .col(created_at(PaymentMethods::CreatedAt))
                    .col(created_at(PaymentMethods::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Partners::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Partners::Code).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Partners::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Partners::PartnerType).string_len(16).not_null())
                    .col(ColumnDef::new(Partners::TaxCode).string_len(32).null().unique_key())
                    .col(ColumnDef::new(Partners::Phone).string_len(32).null())
                    .col(ColumnDef::new(Partners::Email).string_len(255).null())
                    .col(ColumnDef::new(Partners::Address).text().null())
                    .col(ColumnDef::new(Partners::BankAccount).string_len(64).null())
                    .col(ColumnDef::new(Partners::BusinessUnitId).uuid().null())
                    .col(ColumnDef::new(Partners::PaymentMethodId).uuid().null())
                    .col(is_active(Partners::IsActive))
                    .col(created_at(Partners::CreatedAt))
                    .col(created_at(Partners::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_partners_business_unit")
                            .from(Partners::Table, Partners::BusinessUnitId)
                            .to(BusinessUnits::Table, BusinessUnits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_partners_payment_method")
                            .from(Partners::Table, Partners::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::Code).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Employees::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Employees::Email).string_len(255).null().unique_key())
                    .col(ColumnDef::new(Employees::Phone).string_len(32).null())
                    .col(ColumnDef::new(Employees::Position).string_len(128).null())
                    .col(ColumnDef::new(Employees::BusinessUnitId).uuid().not_null())
                    .col(is_active(Employees::IsActive))
                    .col(created_at(Employees::CreatedAt))
                    .col(created_at(Employees::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_business_unit")
                            .from(Employees::Table, Employees::BusinessUnitId)
                            .to(BusinessUnits::Table, BusinessUnits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AllocationRules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AllocationRules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AllocationRules::Name).string_len(255).not_null())
                    .col(ColumnDef::new(AllocationRules::Description).text().null())
                    .col(is_active(AllocationRules::IsActive))
                    .col(created_at(AllocationRules::CreatedAt))
                    .col(created_at(AllocationRules::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AllocationRuleLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AllocationRuleLines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AllocationRuleLines::RuleId).uuid().not_null())
                    .col(ColumnDef::new(AllocationRuleLines::BusinessUnitId).uuid().not_null())
                    .col(ColumnDef::new(AllocationRuleLines::PercentageBp).integer().not_null())
                    .col(ColumnDef::new(AllocationRuleLines::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocation_rule_lines_rule")
                            .from(AllocationRuleLines::Table, AllocationRuleLines::RuleId)
                            .to(AllocationRules::Table, AllocationRules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocation_rule_lines_business_unit")
                            .from(AllocationRuleLines::Table, AllocationRuleLines::BusinessUnitId)
                            .to(BusinessUnits::Table, BusinessUnits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One line per business unit within a rule
        manager
            .create_index(
                Index::create()
                    .name("uq_allocation_rule_lines_rule_bu")
                    .table(AllocationRuleLines::Table)
                    .col(AllocationRuleLines::RuleId)
                    .col(AllocationRuleLines::BusinessUnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_business_unit")
                    .table(Employees::Table)
                    .col(Employees::BusinessUnitId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_partners_business_unit")
                    .table(Partners::Table)
                    .col(Partners::BusinessUnitId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AllocationRuleLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AllocationRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessUnits::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(super) enum BusinessUnits {
    Table,
    Id,
    Code,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    Role,
    BusinessUnitId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Categories {
    Table,
    Id,
    Code,
    Name,
    TransactionType,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum PaymentMethods {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Partners {
    Table,
    Id,
    Code,
    Name,
    PartnerType,
    TaxCode,
    Phone,
    Email,
    Address,
    BankAccount,
    BusinessUnitId,
    PaymentMethodId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Employees {
    Table,
    Id,
    Code,
    FullName,
    Email,
    Phone,
    Position,
    BusinessUnitId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum AllocationRules {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AllocationRuleLines {
    Table,
    Id,
    RuleId,
    BusinessUnitId,
    PercentageBp,
    Position,
}
