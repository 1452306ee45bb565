//! Role-based access control.
//!
//! One policy function decides every permission question, and
//! [`Principal::visibility`] narrows list queries to what a caller may see.
//!
//! # Modules
//!
//! - `types` - Roles, principals, resources and actions
//! - `error` - Access error types
//! - `policy` - The `authorize` function

pub mod error;
pub mod policy;
pub mod types;

#[cfg(test)]
mod policy_props;

pub use error::AccessError;
pub use policy::authorize;
pub use types::{Action, BuScope, MasterData, Principal, Resource, Role};
