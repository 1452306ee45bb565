//! Request middleware.

pub mod auth;

pub use auth::{RequestContext, auth_middleware};
