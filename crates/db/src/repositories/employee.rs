//! Employee repository.

use chrono::Utc;
use holdco_core::access::{Action, BuScope, Principal, Resource, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_shared::types::BusinessUnitId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::error::RepositoryError;
use crate::entities::{business_units, employees, transactions};

/// Input for creating or replacing an employee.
#[derive(Debug, Clone)]
pub struct EmployeeInput {
    /// Unique employee code.
    pub code: String,
    /// Full name.
    pub full_name: String,
    /// Work email, unique when present.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Unit the employee works for.
    pub business_unit_id: BusinessUnitId,
    /// Whether the employee is current.
    pub is_active: bool,
}

/// Filter options for listing employees.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Substring of code or name.
    pub search: Option<String>,
    /// Filter by unit.
    pub business_unit_id: Option<BusinessUnitId>,
    /// Filter by active flag.
    pub active: Option<bool>,
}

fn resource(business_unit_id: Uuid) -> Resource {
    Resource::Employee {
        business_unit_id: BusinessUnitId::from_uuid(business_unit_id),
    }
}

/// Employee repository.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    db: DatabaseConnection,
}

impl EmployeeRepository {
    /// Creates a new employee repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the employees visible to `principal`, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: EmployeeFilter,
    ) -> Result<Vec<employees::Model>, RepositoryError> {
        let mut query = match principal.visibility() {
            BuScope::All => employees::Entity::find(),
            BuScope::Unit(id) => employees::Entity::find()
                .filter(employees::Column::BusinessUnitId.eq(id.into_inner())),
            BuScope::Empty => return Ok(Vec::new()),
        };

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(employees::Column::Code.contains(search))
                    .add(employees::Column::FullName.contains(search))
                    .add(employees::Column::Email.contains(search)),
            );
        }
        if let Some(bu) = filter.business_unit_id {
            query = query.filter(employees::Column::BusinessUnitId.eq(bu.into_inner()));
        }
        if let Some(active) = filter.active {
            query = query.filter(employees::Column::IsActive.eq(active));
        }

        Ok(query
            .order_by_asc(employees::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Gets an employee by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Access` if the employee is in another unit.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<employees::Model, RepositoryError> {
        let employee = employees::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Employee", id))?;
        authorize(principal, &resource(employee.business_unit_id), Action::Read)?;
        Ok(employee)
    }

    /// Creates an employee.
    ///
    /// # Errors
    ///
    /// Returns `Access`, `Validation` for an unknown unit, or `Duplicate`.
    pub async fn create(
        &self,
        principal: &Principal,
        input: EmployeeInput,
    ) -> Result<employees::Model, RepositoryError> {
        authorize(
            principal,
            &resource(input.business_unit_id.into_inner()),
            Action::Create,
        )?;

        let txn = self.db.begin().await?;
        check_business_unit(&txn, input.business_unit_id).await?;
        ensure_unique(&txn, &input, None).await?;

        let now = Utc::now().into();
        let employee = employees::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            full_name: Set(input.full_name),
            email: Set(input.email),
            phone: Set(input.phone),
            position: Set(input.position),
            business_unit_id: Set(input.business_unit_id.into_inner()),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_write(e, || "Employee code or email already exists".into()))?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::Employee,
                employee.id,
                &employee.full_name,
            )
            .with_details(snapshot(&employee)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(employee_id = %employee.id, code = %employee.code, "employee created");
        Ok(employee)
    }

    /// Replaces the editable fields of an employee.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access`, `Validation` or `Duplicate`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: EmployeeInput,
    ) -> Result<employees::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = employees::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Employee", id))?;
        authorize(principal, &resource(existing.business_unit_id), Action::Update)?;
        authorize(
            principal,
            &resource(input.business_unit_id.into_inner()),
            Action::Update,
        )?;
        check_business_unit(&txn, input.business_unit_id).await?;
        ensure_unique(&txn, &input, Some(id)).await?;

        let before = snapshot(&existing);
        let mut active: employees::ActiveModel = existing.into();
        active.code = Set(input.code);
        active.full_name = Set(input.full_name);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.position = Set(input.position);
        active.business_unit_id = Set(input.business_unit_id.into_inner());
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let employee = active.update(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Employee code or email already exists".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::Employee,
                employee.id,
                &employee.full_name,
            )
            .with_changes(before, snapshot(&employee)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(employee_id = %employee.id, "employee updated");
        Ok(employee)
    }

    /// Deletes an employee no transaction references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `InUse`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = employees::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Employee", id))?;
        authorize(principal, &resource(existing.business_unit_id), Action::Delete)?;

        let used = transactions::Entity::find()
            .filter(transactions::Column::EmployeeId.eq(id))
            .count(&txn)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete employee '{}': in use by transactions",
                existing.full_name
            )));
        }

        employees::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_write(e, String::new))?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::Employee,
                id,
                &existing.full_name,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(employee_id = %id, "employee deleted");
        Ok(())
    }
}

async fn check_business_unit(
    txn: &DatabaseTransaction,
    id: BusinessUnitId,
) -> Result<(), RepositoryError> {
    match business_units::Entity::find_by_id(id.into_inner()).one(txn).await? {
        Some(_) => Ok(()),
        None => Err(RepositoryError::Validation(format!(
            "Business unit {id} does not exist"
        ))),
    }
}

async fn ensure_unique(
    txn: &DatabaseTransaction,
    input: &EmployeeInput,
    exclude: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut code_query =
        employees::Entity::find().filter(employees::Column::Code.eq(input.code.as_str()));
    if let Some(id) = exclude {
        code_query = code_query.filter(employees::Column::Id.ne(id));
    }
    if code_query.count(txn).await? > 0 {
        return Err(RepositoryError::Duplicate(format!(
            "Employee code '{}' already exists",
            input.code
        )));
    }

    if let Some(email) = input.email.as_deref() {
        let mut email_query = employees::Entity::find().filter(employees::Column::Email.eq(email));
        if let Some(id) = exclude {
            email_query = email_query.filter(employees::Column::Id.ne(id));
        }
        if email_query.count(txn).await? > 0 {
            return Err(RepositoryError::Duplicate(format!(
                "Employee email '{email}' already exists"
            )));
        }
    }
    Ok(())
}
