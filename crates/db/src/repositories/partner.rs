//! Partner repository.
//!
//! Partners may belong to a business unit or be shared. Scoped roles see
//! their own unit's partners plus the shared ones.

use chrono::Utc;
use holdco_core::access::{Action, BuScope, Principal, Resource, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_shared::types::{BusinessUnitId, PaymentMethodId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::PartnerType;
use crate::entities::{business_units, partners, payment_methods, transactions};

/// Input for creating or replacing a partner.
#[derive(Debug, Clone)]
pub struct PartnerInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Supplier, customer or both.
    pub partner_type: PartnerType,
    /// Tax code, unique when present.
    pub tax_code: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Bank account details.
    pub bank_account: Option<String>,
    /// Owning unit; `None` for a shared partner.
    pub business_unit_id: Option<BusinessUnitId>,
    /// Default payment method.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Whether new transactions may use it.
    pub is_active: bool,
}

/// Filter options for listing partners.
#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    /// Substring of code or name.
    pub search: Option<String>,
    /// Filter by partner type.
    pub partner_type: Option<PartnerType>,
    /// Filter by owning unit.
    pub business_unit_id: Option<BusinessUnitId>,
    /// Filter by active flag.
    pub active: Option<bool>,
}

/// Partner repository.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    db: DatabaseConnection,
}

fn resource(business_unit_id: Option<Uuid>) -> Resource {
    Resource::Partner {
        business_unit_id: business_unit_id.map(BusinessUnitId::from_uuid),
    }
}

impl PartnerRepository {
    /// Creates a new partner repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the partners visible to `principal`, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: PartnerFilter,
    ) -> Result<Vec<partners::Model>, RepositoryError> {
        let visible = match principal.visibility() {
            BuScope::All => Condition::all(),
            BuScope::Unit(id) => Condition::any()
                .add(partners::Column::BusinessUnitId.eq(id.into_inner()))
                .add(partners::Column::BusinessUnitId.is_null()),
            BuScope::Empty => Condition::all().add(partners::Column::BusinessUnitId.is_null()),
        };

        let mut query = partners::Entity::find().filter(visible);
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(partners::Column::Code.contains(search))
                    .add(partners::Column::Name.contains(search))
                    .add(partners::Column::TaxCode.contains(search)),
            );
        }
        if let Some(partner_type) = filter.partner_type {
            query = query.filter(partners::Column::PartnerType.eq(partner_type));
        }
        if let Some(bu) = filter.business_unit_id {
            query = query.filter(partners::Column::BusinessUnitId.eq(bu.into_inner()));
        }
        if let Some(active) = filter.active {
            query = query.filter(partners::Column::IsActive.eq(active));
        }

        Ok(query
            .order_by_asc(partners::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Gets a partner by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Access` if it belongs to another unit.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<partners::Model, RepositoryError> {
        let partner = partners::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Partner", id))?;
        authorize(principal, &resource(partner.business_unit_id), Action::Read)?;
        Ok(partner)
    }

    /// Creates a partner.
    ///
    /// # Errors
    ///
    /// Returns `Access`, `Validation` for unknown references, or `Duplicate`
    /// for a taken code or tax code.
    pub async fn create(
        &self,
        principal: &Principal,
        input: PartnerInput,
    ) -> Result<partners::Model, RepositoryError> {
        authorize(
            principal,
            &resource(input.business_unit_id.map(BusinessUnitId::into_inner)),
            Action::Create,
        )?;

        let txn = self.db.begin().await?;
        check_references(&txn, &input).await?;
        ensure_unique(&txn, &input, None).await?;

        let now = Utc::now().into();
        let partner = partners::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name: Set(input.name),
            partner_type: Set(input.partner_type),
            tax_code: Set(input.tax_code),
            phone: Set(input.phone),
            email: Set(input.email),
            address: Set(input.address),
            bank_account: Set(input.bank_account),
            business_unit_id: Set(input.business_unit_id.map(BusinessUnitId::into_inner)),
            payment_method_id: Set(input.payment_method_id.map(PaymentMethodId::into_inner)),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_write(e, || "Partner code or tax code already exists".into()))?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::Partner,
                partner.id,
                &partner.name,
            )
            .with_details(snapshot(&partner)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(partner_id = %partner.id, code = %partner.code, "partner created");
        Ok(partner)
    }

    /// Replaces the editable fields of a partner.
    ///
    /// The caller must be allowed to write both the current and the new owner unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access`, `Validation` or `Duplicate`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: PartnerInput,
    ) -> Result<partners::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = partners::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Partner", id))?;
        authorize(principal, &resource(existing.business_unit_id), Action::Update)?;
        authorize(
            principal,
            &resource(input.business_unit_id.map(BusinessUnitId::into_inner)),
            Action::Update,
        )?;
        check_references(&txn, &input).await?;
        ensure_unique(&txn, &input, Some(id)).await?;

        let before = snapshot(&existing);
        let mut active: partners::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.name = Set(input.name);
        active.partner_type = Set(input.partner_type);
        active.tax_code = Set(input.tax_code);
        active.phone = Set(input.phone);
        active.email = Set(input.email);
        active.address = Set(input.address);
        active.bank_account = Set(input.bank_account);
        active.business_unit_id = Set(input.business_unit_id.map(BusinessUnitId::into_inner));
        active.payment_method_id = Set(input.payment_method_id.map(PaymentMethodId::into_inner));
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let partner = active.update(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Partner code or tax code already exists".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::Partner,
                partner.id,
                &partner.name,
            )
            .with_changes(before, snapshot(&partner)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(partner_id = %partner.id, "partner updated");
        Ok(partner)
    }

    /// Deletes a partner no transaction references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `InUse`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = partners::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Partner", id))?;
        authorize(principal, &resource(existing.business_unit_id), Action::Delete)?;

        let used = transactions::Entity::find()
            .filter(transactions::Column::PartnerId.eq(id))
            .count(&txn)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete partner '{}': in use by transactions",
                existing.name
            )));
        }

        partners::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_write(e, String::new))?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::Partner,
                id,
                &existing.name,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(partner_id = %id, "partner deleted");
        Ok(())
    }
}

async fn check_references(
    txn: &DatabaseTransaction,
    input: &PartnerInput,
) -> Result<(), RepositoryError> {
    if let Some(bu) = input.business_unit_id {
        if business_units::Entity::find_by_id(bu.into_inner())
            .one(txn)
            .await?
            .is_none()
        {
            return Err(RepositoryError::Validation(format!(
                "Business unit {bu} does not exist"
            )));
        }
    }
    if let Some(method) = input.payment_method_id {
        if payment_methods::Entity::find_by_id(method.into_inner())
            .one(txn)
            .await?
            .is_none()
        {
            return Err(RepositoryError::Validation(format!(
                "Payment method {method} does not exist"
            )));
        }
    }
    Ok(())
}

async fn ensure_unique(
    txn: &DatabaseTransaction,
    input: &PartnerInput,
    exclude: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut code_query =
        partners::Entity::find().filter(partners::Column::Code.eq(input.code.as_str()));
    if let Some(id) = exclude {
        code_query = code_query.filter(partners::Column::Id.ne(id));
    }
    if code_query.count(txn).await? > 0 {
        return Err(RepositoryError::Duplicate(format!(
            "Partner code '{}' already exists",
            input.code
        )));
    }

    if let Some(tax_code) = input.tax_code.as_deref() {
        let mut tax_query =
            partners::Entity::find().filter(partners::Column::TaxCode.eq(tax_code));
        if let Some(id) = exclude {
            tax_query = tax_query.filter(partners::Column::Id.ne(id));
        }
        if tax_query.count(txn).await? > 0 {
            return Err(RepositoryError::Duplicate(format!(
                "Partner tax code '{tax_code}' already exists"
            )));
        }
    }
    Ok(())
}
