//! Transactions and the activity log.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_master_data::{
    AllocationRules, BusinessUnits, Categories, Employees, Partners, PaymentMethods, Users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::Code).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                    .col(ColumnDef::new(Transactions::TransactionType).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::ObjectType).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::PartnerId).uuid().null())
                    .col(ColumnDef::new(Transactions::EmployeeId).uuid().null())
                    .col(ColumnDef::new(Transactions::StudentName).string_len(255).null())
                    .col(ColumnDef::new(Transactions::OtherName).string_len(255).null())
                    .col(ColumnDef::new(Transactions::BusinessUnitId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::CostAllocation).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::AllocationRuleId).uuid().null())
                    .col(ColumnDef::new(Transactions::PaymentMethodId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::PaymentStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::ApprovalStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::Description).text().null())
                    .col(ColumnDef::new(Transactions::Attachments).json().not_null())
                    .col(ColumnDef::new(Transactions::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Transactions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Transactions::ApprovedBy).uuid().null())
                    .col(
                        ColumnDef::new(Transactions::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Transactions::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(Transactions::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_partner")
                            .from(Transactions::Table, Transactions::PartnerId)
                            .to(Partners::Table, Partners::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_employee")
                            .from(Transactions::Table, Transactions::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_business_unit")
                            .from(Transactions::Table, Transactions::BusinessUnitId)
                            .to(BusinessUnits::Table, BusinessUnits::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_allocation_rule")
                            .from(Transactions::Table, Transactions::AllocationRuleId)
                            .to(AllocationRules::Table, AllocationRules::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_payment_method")
                            .from(Transactions::Table, Transactions::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_created_by")
                            .from(Transactions::Table, Transactions::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_business_unit_date")
                    .table(Transactions::Table)
                    .col(Transactions::BusinessUnitId)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_approval_status")
                    .table(Transactions::Table)
                    .col(Transactions::ApprovalStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ActivityLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ActivityLogs::ActorId).uuid().not_null())
                    .col(ColumnDef::new(ActivityLogs::Action).string_len(16).not_null())
                    .col(ColumnDef::new(ActivityLogs::EntityType).string_len(32).not_null())
                    .col(ColumnDef::new(ActivityLogs::EntityId).uuid().not_null())
                    .col(ColumnDef::new(ActivityLogs::Summary).text().not_null())
                    .col(ColumnDef::new(ActivityLogs::Details).json().null())
                    .col(
                        ColumnDef::new(ActivityLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_logs_actor")
                            .from(ActivityLogs::Table, ActivityLogs::ActorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookups by entity for the history panel
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_entity")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::EntityType)
                    .col(ActivityLogs::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Code,
    TransactionDate,
    TransactionType,
    CategoryId,
    ObjectType,
    PartnerId,
    EmployeeId,
    StudentName,
    OtherName,
    BusinessUnitId,
    Amount,
    CostAllocation,
    AllocationRuleId,
    PaymentMethodId,
    PaymentStatus,
    ApprovalStatus,
    Description,
    Attachments,
    CreatedBy,
    SubmittedAt,
    ApprovedBy,
    ApprovedAt,
    RejectionReason,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ActivityLogs {
    Table,
    Id,
    ActorId,
    Action,
    EntityType,
    EntityId,
    Summary,
    Details,
    CreatedAt,
}
