//! `SeaORM` entity definitions.

pub mod prelude;

pub mod activity_logs;
pub mod allocation_rule_lines;
pub mod allocation_rules;
pub mod business_units;
pub mod categories;
pub mod employees;
pub mod partners;
pub mod payment_methods;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
