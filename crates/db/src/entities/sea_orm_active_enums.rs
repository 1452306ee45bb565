//! String-backed enums stored in VARCHAR columns.
//!
//! Each mirrors a `holdco-core` type; the `From` impls convert both ways.

use holdco_core::access::Role;
use holdco_core::transaction::{CostAllocation, ObjectType, PaymentStatus, TransactionType};
use holdco_core::workflow::ApprovalStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

macro_rules! mirror_enum {
    ($name:ident <=> $core:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
        #[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
        pub enum $name {
            $(
                #[sea_orm(string_value = $value)]
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl From<$name> for $core {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Self::$variant),+
                }
            }
        }

        impl From<$core> for $name {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant),+
                }
            }
        }
    };
}

mirror_enum!(UserRole <=> Role {
    Ceo = "CEO",
    Admin = "ADMIN",
    BuLead = "BU_LEAD",
    Staff = "STAFF",
});

mirror_enum!(TxType <=> TransactionType {
    Income = "INCOME",
    Expense = "EXPENSE",
    Loan = "LOAN",
});

mirror_enum!(CounterpartType <=> ObjectType {
    Partner = "PARTNER",
    Employee = "EMPLOYEE",
    Student = "STUDENT",
    Other = "OTHER",
});

mirror_enum!(AllocationKind <=> CostAllocation {
    Direct = "DIRECT",
    Indirect = "INDIRECT",
});

mirror_enum!(PaymentState <=> PaymentStatus {
    Paid = "PAID",
    Unpaid = "UNPAID",
});

mirror_enum!(ApprovalState <=> ApprovalStatus {
    Draft = "DRAFT",
    Pending = "PENDING",
    Approved = "APPROVED",
    Rejected = "REJECTED",
    Cancelled = "CANCELLED",
});

/// Partner relationship kind. Only master data uses it, so it has no core mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerType {
    /// We buy from them.
    #[sea_orm(string_value = "SUPPLIER")]
    Supplier,
    /// We sell to them.
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    /// Both.
    #[sea_orm(string_value = "BOTH")]
    Both,
}
