//! Transaction domain types and request validation.
//!
//! # Modules
//!
//! - `types` - Transaction enums and the tagged counterpart
//! - `error` - Validation error types
//! - `validation` - Rules checked before a transaction is persisted
//! - `code` - Transaction code formatting

pub mod code;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use code::{code_prefix, format_code, next_sequence};
pub use error::TransactionValidationError;
pub use types::{
    CostAllocation, Counterpart, CounterpartFields, ObjectType, PaymentStatus, TransactionType,
};
pub use validation::{
    MAX_ATTACHMENTS, TransactionDraft, ensure_category_matches, validate_attachments,
};
