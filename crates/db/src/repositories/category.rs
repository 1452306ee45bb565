//! Category repository.

use chrono::Utc;
use holdco_core::access::{Action, MasterData, Principal, Resource, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_core::transaction::TransactionType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::TxType;
use crate::entities::{categories, transactions};

const RESOURCE: Resource = Resource::MasterData(MasterData::Category);

/// Input for creating or replacing a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Transaction type the category applies to.
    pub transaction_type: TransactionType,
    /// Optional description.
    pub description: Option<String>,
    /// Whether new transactions may use it.
    pub is_active: bool,
}

/// Filter options for listing categories.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryFilter {
    /// Only categories for this transaction type.
    pub transaction_type: Option<TransactionType>,
    /// Filter by active flag.
    pub active: Option<bool>,
}

/// Category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists categories ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: CategoryFilter,
    ) -> Result<Vec<categories::Model>, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;

        let mut query = categories::Entity::find();
        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(categories::Column::TransactionType.eq(TxType::from(transaction_type)));
        }
        if let Some(active) = filter.active {
            query = query.filter(categories::Column::IsActive.eq(active));
        }
        Ok(query
            .order_by_asc(categories::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Gets a category by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<categories::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;
        categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Category", id))
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the code is taken.
    pub async fn create(
        &self,
        principal: &Principal,
        input: CategoryInput,
    ) -> Result<categories::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Create)?;

        let txn = self.db.begin().await?;
        ensure_code_free(&txn, &input.code, None).await?;

        let now = Utc::now().into();
        let code = input.code.clone();
        let category = categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name: Set(input.name),
            transaction_type: Set(input.transaction_type.into()),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, || format!("Category code '{code}' already exists"))
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::Category,
                category.id,
                &category.name,
            )
            .with_details(snapshot(&category)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(category_id = %category.id, code = %category.code, "category created");
        Ok(category)
    }

    /// Replaces the editable fields of a category.
    ///
    /// The transaction type cannot change while transactions use the category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Duplicate` or `Validation`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<categories::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Update)?;

        let txn = self.db.begin().await?;
        let existing = categories::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Category", id))?;
        ensure_code_free(&txn, &input.code, Some(id)).await?;

        let new_type = TxType::from(input.transaction_type);
        if new_type != existing.transaction_type && usage_count(&txn, id).await? > 0 {
            return Err(RepositoryError::Validation(format!(
                "Cannot change the transaction type of category '{}' while transactions use it",
                existing.name
            )));
        }

        let before = snapshot(&existing);
        let mut active: categories::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.transaction_type = Set(new_type);
        active.description = Set(input.description);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let category = active.update(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Category code already exists".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::Category,
                category.id,
                &category.name,
            )
            .with_changes(before, snapshot(&category)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(category_id = %category.id, "category updated");
        Ok(category)
    }

    /// Deletes a category no transaction uses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InUse`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        authorize(principal, &RESOURCE, Action::Delete)?;

        let txn = self.db.begin().await?;
        let existing = categories::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Category", id))?;

        if usage_count(&txn, id).await? > 0 {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete category '{}': in use by transactions",
                existing.name
            )));
        }

        categories::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_write(e, String::new))?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::Category,
                id,
                &existing.name,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}

async fn usage_count(txn: &sea_orm::DatabaseTransaction, id: Uuid) -> Result<u64, RepositoryError> {
    Ok(transactions::Entity::find()
        .filter(transactions::Column::CategoryId.eq(id))
        .count(txn)
        .await?)
}

async fn ensure_code_free(
    txn: &sea_orm::DatabaseTransaction,
    code: &str,
    exclude: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut query = categories::Entity::find().filter(categories::Column::Code.eq(code));
    if let Some(id) = exclude {
        query = query.filter(categories::Column::Id.ne(id));
    }
    if query.count(txn).await? > 0 {
        return Err(RepositoryError::Duplicate(format!(
            "Category code '{code}' already exists"
        )));
    }
    Ok(())
}
