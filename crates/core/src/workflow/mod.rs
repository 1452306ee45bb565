//! Transaction approval workflow.
//!
//! This module implements the approval state machine:
//! DRAFT → PENDING → APPROVED / REJECTED, with CANCELLED reachable from any
//! state that is not yet approved.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (ApprovalStatus, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{ApprovalStatus, WorkflowAction};
