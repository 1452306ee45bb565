//! Payment method repository.

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
use crate::entities::{partners, payment_methods, transactions};

const RESOURCE: Resource = Resource::MasterData(MasterData::PaymentMethod);

/// Input for creating or replacing a payment method.
#[derive(Debug, Clone)]
pub struct PaymentMethodInput {
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether new transactions may use it.
    pub is_active: bool,
}

/// Payment method repository.
#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    db: DatabaseConnection,
}

impl PaymentMethodRepository {
    /// Creates a new payment method repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists payment methods ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        active: Option<bool>,
    ) -> Result<Vec<payment_methods::Model>, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;

        let mut query = payment_methods::Entity::find();
        if let Some(active) = active {
            query = query.filter(payment_methods::Column::IsActive.eq(active));
        }
        Ok(query
            .order_by_asc(payment_methods::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Gets a payment method by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<payment_methods::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;
        payment_methods::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Payment method", id))
    }

    /// Creates a payment method.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken.
    pub async fn create(
        &self,
        principal: &Principal,
        input: PaymentMethodInput,
    ) -> Result<payment_methods::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Create)?;

        let txn = self.db.begin().await?;
        ensure_name_free(&txn, &input.name, None).await?;

        let now = Utc::now().into();
        let name = input.name.clone();
        let method = payment_methods::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, || format!("Payment method '{name}' already exists"))
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::PaymentMethod,
                method.id,
                &method.name,
            )
            .with_details(snapshot(&method)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(payment_method_id = %method.id, "payment method created");
        Ok(method)
    }

    /// Replaces the editable fields of a payment method.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Duplicate`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: PaymentMethodInput,
    ) -> Result<payment_methods::Model, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Update)?;

        let txn = self.db.begin().await?;
        let existing = payment_methods::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Payment method", id))?;
        ensure_name_free(&txn, &input.name, Some(id)).await?;

        let before = snapshot(&existing);
        let mut active: payment_methods::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let method = active.update(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Payment method name already exists".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::PaymentMethod,
                method.id,
                &method.name,
            )
            .with_changes(before, snapshot(&method)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(payment_method_id = %method.id, "payment method updated");
        Ok(method)
    }

    /// Deletes a payment method no transaction or partner uses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InUse`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        authorize(principal, &RESOURCE, Action::Delete)?;

        let txn = self.db.begin().await?;
        let existing = payment_methods::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Payment method", id))?;

        let transaction_count = transactions::Entity::find()
            .filter(transactions::Column::PaymentMethodId.eq(id))
            .count(&txn)
            .await?;
        let partner_count = partners::Entity::find()
            .filter(partners::Column::PaymentMethodId.eq(id))
            .count(&txn)
            .await?;
        if transaction_count > 0 || partner_count > 0 {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete payment method '{}': in use by {transaction_count} transaction(s) and {partner_count} partner(s)",
                existing.name
            )));
        }

        payment_methods::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_write(e, String::new))?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::PaymentMethod,
                id,
                &existing.name,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(payment_method_id = %id, "payment method deleted");
        Ok(())
    }
}

async fn ensure_name_free(
    txn: &sea_orm::DatabaseTransaction,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut query = payment_methods::Entity::find().filter(payment_methods::Column::Name.eq(name));
    if let Some(id) = exclude {
        query = query.filter(payment_methods::Column::Id.ne(id));
    }
    if query.count(txn).await? > 0 {
        return Err(RepositoryError::Duplicate(format!(
            "Payment method '{name}' already exists"
        )));
    }
    Ok(())
}
