//! Repository abstractions for data access.
//!
//! Repositories take the caller's [`Principal`](holdco_core::access::Principal),
//! check the access policy, and narrow list queries to the caller's business
//! unit scope. Every mutation writes its activity log entry in the same
//! database transaction.

pub mod activity_log;
pub mod allocation_rule;
pub mod business_unit;
pub mod category;
pub mod employee;
pub mod error;
pub mod partner;
pub mod payment_method;
pub mod transaction;
pub mod user;
mod workflow;

pub use activity_log::{ActivityLogFilter, ActivityLogRepository};
pub use allocation_rule::{AllocationRuleInput, AllocationRuleRepository, RuleWithLines};
pub use business_unit::{BusinessUnitInput, BusinessUnitRepository};
pub use category::{CategoryFilter, CategoryInput, CategoryRepository};
pub use employee::{EmployeeFilter, EmployeeInput, EmployeeRepository};
pub use error::RepositoryError;
pub use partner::{PartnerFilter, PartnerInput, PartnerRepository};
pub use payment_method::{PaymentMethodInput, PaymentMethodRepository};
pub use transaction::{TransactionFilter, TransactionRepository, attachments_of, counterpart_of};
pub use user::{CreateUserInput, UpdateUserInput, UserRepository, principal_of};
