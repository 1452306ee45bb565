//! Core business rules for the holdco back-office.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every rule that decides whether a write is allowed lives here, so the
//! repositories and handlers only orchestrate.
//!
//! # Modules
//!
//! - `allocation` - Allocation rules and the largest-remainder split
//! - `transaction` - Transaction domain types, counterpart union, request validation
//! - `workflow` - Approval state machine
//! - `access` - Role policy and business unit visibility
//! - `audit` - Activity log vocabulary
//! - `auth` - Password hashing

pub mod access;
pub mod allocation;
pub mod audit;
pub mod auth;
pub mod transaction;
pub mod workflow;
