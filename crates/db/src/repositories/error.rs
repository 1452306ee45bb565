//! Repository error type and its mapping onto `AppError`.

use holdco_core::access::AccessError;
use holdco_core::allocation::AllocationError;
use holdco_core::transaction::TransactionValidationError;
use holdco_core::workflow::WorkflowError;
use holdco_shared::AppError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by every repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Human-readable entity name.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },

    /// Unique key already taken.
    #[error("{0}")]
    Duplicate(String),

    /// Delete refused because other rows still reference the row.
    #[error("{0}")]
    InUse(String),

    /// Input failed a check that needs the database, such as a missing reference.
    #[error("{0}")]
    Validation(String),

    /// Illegal approval transition.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Caller may not perform the action.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Invalid allocation rule or split.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Invalid transaction request.
    #[error(transparent)]
    Transaction(#[from] TransactionValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    pub(crate) const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Maps a failed write, turning unique violations into `Duplicate` and
    /// foreign key violations into `InUse`.
    pub(crate) fn from_write(err: DbErr, duplicate: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Duplicate(duplicate()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::InUse("Record is referenced by other records".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

fn classify(status: u16, message: String) -> AppError {
    match status {
        400 => AppError::Validation(message),
        403 => AppError::Forbidden(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        422 => AppError::BusinessRule(message),
        _ => AppError::Internal(message),
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(message),
            RepositoryError::Duplicate(_) | RepositoryError::InUse(_) => Self::Conflict(message),
            RepositoryError::Validation(_) => Self::Validation(message),
            RepositoryError::Workflow(e) => classify(e.status_code(), message),
            RepositoryError::Access(e) => classify(e.status_code(), message),
            RepositoryError::Allocation(e) => classify(e.status_code(), message),
            RepositoryError::Transaction(e) => classify(e.status_code(), message),
            RepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdco_core::workflow::ApprovalStatus;

    #[test]
    fn test_maps_to_app_error() {
        let err: AppError = RepositoryError::not_found("Transaction", Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            err.public_message(),
            "Transaction not found: 00000000-0000-0000-0000-000000000000"
        );

        let err: AppError = RepositoryError::InUse("Payment method is in use".into()).into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = RepositoryError::from(WorkflowError::NotDeletable(
            ApprovalStatus::Approved,
        ))
        .into();
        assert_eq!(err.status_code(), 422);

        let err: AppError = RepositoryError::from(WorkflowError::RejectionReasonRequired).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = RepositoryError::from(AccessError::NoBusinessUnit).into();
        assert_eq!(err.status_code(), 403);

        let err: AppError = RepositoryError::from(AllocationError::RuleNotFound(Uuid::nil())).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError =
            RepositoryError::from(TransactionValidationError::AllocationRuleRequired).into();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_database_error_stays_internal() {
        let err: AppError = RepositoryError::Database(DbErr::Custom("boom".into())).into();
        assert!(err.is_server_error());
        assert_eq!(err.public_message(), "An internal error occurred");
    }

    #[test]
    fn test_non_constraint_write_error_is_database() {
        let err = RepositoryError::from_write(DbErr::Custom("boom".into()), || "dup".into());
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
