//! Business unit repository.

use chrono::Utc;
use holdco_core::access::{Action, MasterData, Principal, Resource, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::error::RepositoryError;
use crate::entities::{
    allocation_rule_lines, business_units, employees, partners, transactions, users,
};

const RESOURCE: Resource = Resource::MasterData(MasterData::BusinessUnit);

/// Input for creating or replacing a business unit.
#[derive(Debug, Clone)]
pub struct BusinessUnitInput {
    /// Short unique code.
    pub code: String,
    /// Unique display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the unit accepts new transactions.
    pub is_active: bool,
}

/// Business unit repository.
#[derive(Debug, Clone)]
pub struct BusinessUnitRepository {
    db: DatabaseConnection,
}

impl BusinessUnitRepository {
    /// Creates a new business unit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists business units ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        active: Option<bool>,
    ) -> Result<Vec<business_units::Model>, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;

        let mut query = business_units::Entity::find();
        if let Some(active) = active {
            query = query.filter(business_units::Column::IsActive.eq(active));
        }
        Ok(query
            .order_by_asc(business_units::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Gets a business unit by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<business_units::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;
        business_units::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Business unit", id))
    }

    /// Creates a business unit.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the code or name is taken.
    pub async fn create(
        &self,
        principal: &Principal,
        input: BusinessUnitInput,
    ) -> Result<business_units::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Create)?;

        let txn = self.db.begin().await?;
        ensure_unique(&txn, &input, None).await?;

        let now = Utc::now().into();
        let code = input.code.clone();
        let unit = business_units::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, || format!("Business unit code '{code}' already exists"))
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::BusinessUnit,
                unit.id,
                &unit.name,
            )
            .with_details(snapshot(&unit)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(business_unit_id = %unit.id, code = %unit.code, "business unit created");
        Ok(unit)
    }

    /// Replaces the editable fields of a business unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Duplicate`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: BusinessUnitInput,
    ) -> Result<business_units::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Update)?;

        let txn = self.db.begin().await?;
        let existing = business_units::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Business unit", id))?;
        ensure_unique(&txn, &input, Some(id)).await?;

        let before = snapshot(&existing);
        let mut active: business_units::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let unit = active.update(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Business unit code or name already exists".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::BusinessUnit,
                unit.id,
                &unit.name,
            )
            .with_changes(before, snapshot(&unit)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(business_unit_id = %unit.id, "business unit updated");
        Ok(unit)
    }

    /// Deletes a business unit nothing references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InUse` while employees, partners, users,
    /// transactions or allocation rule lines point at it.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        authorize(principal, &RESOURCE, Action::Delete)?;

        let txn = self.db.begin().await?;
        let existing = business_units::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Business unit", id))?;

        let references = [
            (
                "employees",
                employees::Entity::find()
                    .filter(employees::Column::BusinessUnitId.eq(id))
                    .count(&txn)
                    .await?,
            ),
            (
                "partners",
                partners::Entity::find()
                    .filter(partners::Column::BusinessUnitId.eq(id))
                    .count(&txn)
                    .await?,
            ),
            (
                "transactions",
                transactions::Entity::find()
                    .filter(transactions::Column::BusinessUnitId.eq(id))
                    .count(&txn)
                    .await?,
            ),
            (
                "users",
                users::Entity::find()
                    .filter(users::Column::BusinessUnitId.eq(id))
                    .count(&txn)
                    .await?,
            ),
            (
                "allocation rules",
                allocation_rule_lines::Entity::find()
                    .filter(allocation_rule_lines::Column::BusinessUnitId.eq(id))
                    .count(&txn)
                    .await?,
            ),
        ];
        let used_by: Vec<&str> = references
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, _)| *name)
            .collect();
        if !used_by.is_empty() {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete business unit '{}': in use by {}",
                existing.name,
                used_by.join(", ")
            )));
        }

        business_units::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_write(e, String::new))?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::BusinessUnit,
                id,
                &existing.name,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(business_unit_id = %id, "business unit deleted");
        Ok(())
    }
}

async fn ensure_unique(
    txn: &sea_orm::DatabaseTransaction,
    input: &BusinessUnitInput,
    exclude: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut code_query =
        business_units::Entity::find().filter(business_units::Column::Code.eq(input.code.as_str()));
    let mut name_query =
        business_units::Entity::find().filter(business_units::Column::Name.eq(input.name.as_str()));
    if let Some(id) = exclude {
        code_query = code_query.filter(business_units::Column::Id.ne(id));
        name_query = name_query.filter(business_units::Column::Id.ne(id));
    }

    if code_query.count(txn).await? > 0 {
        return Err(RepositoryError::Duplicate(format!(
            "Business unit code '{}' already exists",
            input.code
        )));
    }
    if name_query.count(txn).await? > 0 {
        return Err(RepositoryError::Duplicate(format!(
            "Business unit name '{}' already exists",
            input.name
        )));
    }
    Ok(())
}
