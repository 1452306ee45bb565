//! Access error types.

use thiserror::Error;

use super::types::{Action, Role};

/// Why a request was refused by the access policy.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The role never allows this action on this resource.
    #[error("Role {role} may not {action} {resource}")]
    Forbidden {
        /// Caller's role.
        role: Role,
        /// Refused action.
        action: Action,
        /// Resource name.
        resource: &'static str,
    },

    /// The resource belongs to a unit the caller cannot see.
    #[error("Access to {0} of another business unit is not allowed")]
    OutsideBusinessUnit(&'static str),

    /// Staff may only change what they created.
    #[error("Only the creator may {0} this transaction")]
    NotCreator(Action),

    /// Non-privileged user without a home unit.
    #[error("User is not assigned to a business unit")]
    NoBusinessUnit,
}

impl AccessError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        403
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::OutsideBusinessUnit(_) => "OUTSIDE_BUSINESS_UNIT",
            Self::NotCreator(_) => "NOT_CREATOR",
            Self::NoBusinessUnit => "NO_BUSINESS_UNIT",
        }
    }
}
