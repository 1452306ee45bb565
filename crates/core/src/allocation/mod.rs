//! Cost allocation rules.
//!
//! An allocation rule maps business units to percentages. INDIRECT
//! transactions spread their amount across those units.
//!
//! # Modules
//!
//! - `types` - Rule, line and share types
//! - `error` - Allocation error types
//! - `split` - Largest Remainder split on integer currency units

pub mod error;
pub mod split;
pub mod types;

#[cfg(test)]
mod split_props;

pub use error::AllocationError;
pub use split::{direct_share, split_amount};
pub use types::{
    AllocationLine, AllocationRule, AllocationShare, basis_points_to_percentage,
    percentage_to_basis_points, primary_business_unit, validate_lines,
};
