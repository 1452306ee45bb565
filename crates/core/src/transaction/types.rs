//! Transaction domain types.

use holdco_shared::types::{EmployeeId, PartnerId};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TransactionValidationError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// Parses the wire representation, case-insensitively.
            pub fn parse(s: &str) -> Option<Self> {
                match s.to_ascii_uppercase().as_str() {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Kind of money movement.
    TransactionType {
        /// Money received.
        Income => "INCOME",
        /// Money spent.
        Expense => "EXPENSE",
        /// Money lent or borrowed.
        Loan => "LOAN",
    }
}

wire_enum! {
    /// Which kind of counterpart a transaction refers to.
    ObjectType {
        /// A partner from master data.
        Partner => "PARTNER",
        /// An employee from master data.
        Employee => "EMPLOYEE",
        /// A student, referenced by name only.
        Student => "STUDENT",
        /// Anyone else, referenced by name only.
        Other => "OTHER",
    }
}

wire_enum! {
    /// How a transaction's cost lands on business units.
    CostAllocation {
        /// Entirely on the transaction's own business unit.
        Direct => "DIRECT",
        /// Spread by an allocation rule.
        Indirect => "INDIRECT",
    }
}

wire_enum! {
    /// Settlement state, independent of approval.
    PaymentStatus {
        /// Settled.
        Paid => "PAID",
        /// Outstanding.
        Unpaid => "UNPAID",
    }
}

impl TransactionType {
    /// Prefix used in transaction codes.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Income => "INC",
            Self::Expense => "EXP",
            Self::Loan => "LOAN",
        }
    }
}

/// The other party of a transaction. Exactly one reference per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "objectType", content = "ref", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Counterpart {
    /// Partner master data row.
    Partner(PartnerId),
    /// Employee master data row.
    Employee(EmployeeId),
    /// Student name.
    Student(String),
    /// Free-form name.
    Other(String),
}

/// The four flat counterpart columns as stored and sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartFields {
    /// Set for `PARTNER`.
    pub partner_id: Option<PartnerId>,
    /// Set for `EMPLOYEE`.
    pub employee_id: Option<EmployeeId>,
    /// Set for `STUDENT`.
    pub student_name: Option<String>,
    /// Set for `OTHER`.
    pub other_name: Option<String>,
}

impl Counterpart {
    /// Builds the tagged counterpart from `objectType` and the flat fields.
    ///
    /// Blank names count as absent.
    ///
    /// # Errors
    ///
    /// Fails if the field matching `object_type` is missing, or if any other
    /// counterpart field is populated.
    pub fn from_fields(
        object_type: ObjectType,
        fields: CounterpartFields,
    ) -> Result<Self, TransactionValidationError> {
        let CounterpartFields {
            partner_id,
            employee_id,
            student_name,
            other_name,
        } = fields;
        let student_name = non_blank(student_name);
        let other_name = non_blank(other_name);

        let others_present = match object_type {
            ObjectType::Partner => {
                employee_id.is_some() || student_name.is_some() || other_name.is_some()
            }
            ObjectType::Employee => {
                partner_id.is_some() || student_name.is_some() || other_name.is_some()
            }
            ObjectType::Student => {
                partner_id.is_some() || employee_id.is_some() || other_name.is_some()
            }
            ObjectType::Other => {
                partner_id.is_some() || employee_id.is_some() || student_name.is_some()
            }
        };
        if others_present {
            return Err(TransactionValidationError::ConflictingCounterpart(object_type));
        }

        let counterpart = match object_type {
            ObjectType::Partner => partner_id.map(Self::Partner),
            ObjectType::Employee => employee_id.map(Self::Employee),
            ObjectType::Student => student_name.map(Self::Student),
            ObjectType::Other => other_name.map(Self::Other),
        };
        counterpart.ok_or(TransactionValidationError::MissingCounterpart(object_type))
    }

    /// The `objectType` tag of this counterpart.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        match self {
            Self::Partner(_) => ObjectType::Partner,
            Self::Employee(_) => ObjectType::Employee,
            Self::Student(_) => ObjectType::Student,
            Self::Other(_) => ObjectType::Other,
        }
    }

    /// Flattens back into the four columns, exactly one populated.
    #[must_use]
    pub fn to_fields(&self) -> CounterpartFields {
        let mut fields = CounterpartFields::default();
        match self {
            Self::Partner(id) => fields.partner_id = Some(*id),
            Self::Employee(id) => fields.employee_id = Some(*id),
            Self::Student(name) => fields.student_name = Some(name.clone()),
            Self::Other(name) => fields.other_name = Some(name.clone()),
        }
        fields
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
