//! User repository for database operations.

use chrono::Utc;
use holdco_core::access::{Action, Principal, Resource, Role, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_core::auth::{PasswordError, check_password_policy, hash_password, verify_password};
use holdco_shared::types::{BusinessUnitId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::entities::{activity_logs, business_units, transactions, users};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed before storing.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Access role.
    pub role: Role,
    /// Home business unit.
    pub business_unit_id: Option<BusinessUnitId>,
}

/// Input for updating a user. A `password` resets the credentials.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    /// Display name.
    pub full_name: String,
    /// Access role.
    pub role: Role,
    /// Home business unit.
    pub business_unit_id: Option<BusinessUnitId>,
    /// Whether the user may log in.
    pub is_active: bool,
    /// New password.
    pub password: Option<String>,
}

/// The principal a stored user acts as.
#[must_use]
pub fn principal_of(user: &users::Model) -> Principal {
    Principal::new(
        UserId::from_uuid(user.id),
        user.role.into(),
        user.business_unit_id.map(BusinessUnitId::from_uuid),
    )
}

fn hash(password: &str) -> Result<String, RepositoryError> {
    check_password_policy(password).map_err(|e| RepositoryError::Validation(e.to_string()))?;
    hash_password(password).map_err(|e| RepositoryError::Database(DbErr::Custom(e.to_string())))
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Returns the active user matching the credentials.
    ///
    /// Unknown emails, wrong passwords and inactive users all yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored hash is unreadable.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>, RepositoryError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }
        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(PasswordError::InvalidHash) => {
                tracing::error!(user_id = %user.id, "stored password hash is unreadable");
                Ok(None)
            }
            Err(e) => Err(RepositoryError::Database(DbErr::Custom(e.to_string()))),
        }
    }

    /// Lists users ordered by email. CEO/Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Access` or a database error.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<users::Model>, RepositoryError> {
        authorize(principal, &Resource::User, Action::Read)?;
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Email)
            .all(&self.db)
            .await?)
    }

    /// Gets a user by id. CEO/Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Access` or `NotFound`.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<users::Model, RepositoryError> {
        authorize(principal, &Resource::User, Action::Read)?;
        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::not_found("User", id))
    }

    /// Creates a user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `Access`, `Validation` for a weak password or unknown unit, or
    /// `Duplicate` for a taken email.
    pub async fn create(
        &self,
        principal: &Principal,
        input: CreateUserInput,
    ) -> Result<users::Model, RepositoryError> {
        authorize(principal, &Resource::User, Action::Create)?;
        let password_hash = hash(&input.password)?;
        let email = input.email.trim().to_lowercase();

        let txn = self.db.begin().await?;
        check_business_unit(&txn, input.business_unit_id).await?;
        let taken = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .count(&txn)
            .await?;
        if taken > 0 {
            return Err(RepositoryError::Duplicate(format!(
                "Email '{email}' is already registered"
            )));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            full_name: Set(input.full_name),
            role: Set(UserRole::from(input.role)),
            business_unit_id: Set(input.business_unit_id.map(BusinessUnitId::into_inner)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, || format!("Email '{email}' is already registered"))
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::User,
                user.id,
                &user.email,
            )
            .with_details(snapshot(&user)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.id, role = %input.role, "user created");
        Ok(user)
    }

    /// Updates a user's profile, role, unit and optionally password.
    ///
    /// # Errors
    ///
    /// Returns `Access`, `NotFound` or `Validation`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<users::Model, RepositoryError> {
        authorize(principal, &Resource::User, Action::Update)?;
        let password_hash = input.password.as_deref().map(hash).transpose()?;

        let txn = self.db.begin().await?;
        let existing = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("User", id))?;
        check_business_unit(&txn, input.business_unit_id).await?;

        let before = snapshot(&existing);
        let mut active: users::ActiveModel = existing.into();
        active.full_name = Set(input.full_name);
        active.role = Set(UserRole::from(input.role));
        active.business_unit_id = Set(input.business_unit_id.map(BusinessUnitId::into_inner));
        active.is_active = Set(input.is_active);
        if let Some(password_hash) = password_hash {
            active.password_hash = Set(password_hash);
        }
        active.updated_at = Set(Utc::now().into());
        let user = active.update(&txn).await?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::User,
                user.id,
                &user.email,
            )
            .with_changes(before, snapshot(&user)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Deletes a user with no history. Users with history should be deactivated.
    ///
    /// # Errors
    ///
    /// Returns `Access`, `NotFound`, `Validation` for self-deletion, or `InUse`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        authorize(principal, &Resource::User, Action::Delete)?;
        if principal.user_id.into_inner() == id {
            return Err(RepositoryError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let existing = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("User", id))?;

        let created = transactions::Entity::find()
            .filter(transactions::Column::CreatedBy.eq(id))
            .count(&txn)
            .await?;
        let acted = activity_logs::Entity::find()
            .filter(activity_logs::Column::ActorId.eq(id))
            .count(&txn)
            .await?;
        if created > 0 || acted > 0 {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete user '{}': it has recorded activity, deactivate it instead",
                existing.email
            )));
        }

        users::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| RepositoryError::from_write(e, String::new))?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::User,
                id,
                &existing.email,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

async fn check_business_unit(
    txn: &DatabaseTransaction,
    id: Option<BusinessUnitId>,
) -> Result<(), RepositoryError> {
    let Some(id) = id else {
        return Ok(());
    };
    match business_units::Entity::find_by_id(id.into_inner()).one(txn).await? {
        Some(_) => Ok(()),
        None => Err(RepositoryError::Validation(format!(
            "Business unit {id} does not exist"
        ))),
    }
}
