//! Entity re-exports.

pub use super::activity_logs::Entity as ActivityLogs;
pub use super::allocation_rule_lines::Entity as AllocationRuleLines;
pub use super::allocation_rules::Entity as AllocationRules;
pub use super::business_units::Entity as BusinessUnits;
pub use super::categories::Entity as Categories;
pub use super::employees::Entity as Employees;
pub use super::partners::Entity as Partners;
pub use super::payment_methods::Entity as PaymentMethods;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
