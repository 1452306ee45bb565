//! Access control domain types.

use holdco_shared::types::{BusinessUnitId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User roles, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Chief executive: unrestricted.
    Ceo,
    /// Administrator: unrestricted.
    Admin,
    /// Business unit lead: manages their own unit.
    BuLead,
    /// Staff: reads and creates in their own unit, edits only their own work.
    Staff,
}

impl Role {
    /// All roles.
    pub const ALL: [Self; 4] = [Self::Ceo, Self::Admin, Self::BuLead, Self::Staff];

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ceo => "CEO",
            Self::Admin => "ADMIN",
            Self::BuLead => "BU_LEAD",
            Self::Staff => "STAFF",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CEO" => Some(Self::Ceo),
            "ADMIN" => Some(Self::Admin),
            "BU_LEAD" => Some(Self::BuLead),
            "STAFF" => Some(Self::Staff),
            _ => None,
        }
    }

    /// CEO and Admin are not limited to a business unit.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Ceo | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// User ID.
    pub user_id: UserId,
    /// Role.
    pub role: Role,
    /// Home business unit, if any.
    pub business_unit_id: Option<BusinessUnitId>,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role, business_unit_id: Option<BusinessUnitId>) -> Self {
        Self {
            user_id,
            role,
            business_unit_id,
        }
    }

    /// Which business units this caller may see.
    #[must_use]
    pub const fn visibility(&self) -> BuScope {
        if self.role.is_privileged() {
            return BuScope::All;
        }
        match self.business_unit_id {
            Some(id) => BuScope::Unit(id),
            None => BuScope::Empty,
        }
    }
}

/// Business unit visibility applied to list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuScope {
    /// Every unit.
    All,
    /// One unit.
    Unit(BusinessUnitId),
    /// No unit at all.
    Empty,
}

impl BuScope {
    /// Returns true if rows of `business_unit_id` are visible.
    #[must_use]
    pub fn contains(&self, business_unit_id: BusinessUnitId) -> bool {
        match self {
            Self::All => true,
            Self::Unit(id) => *id == business_unit_id,
            Self::Empty => false,
        }
    }
}

/// Master data tables that are readable by everyone and writable by CEO/Admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterData {
    /// Business units.
    BusinessUnit,
    /// Categories.
    Category,
    /// Payment methods.
    PaymentMethod,
    /// Allocation rules.
    AllocationRule,
}

/// What an action is performed on, with the fields the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A transaction, existing or about to be created.
    Transaction {
        /// Owning unit.
        business_unit_id: BusinessUnitId,
        /// Creator.
        created_by: UserId,
    },
    /// A partner. Unassigned partners are shared.
    Partner {
        /// Owning unit, if any.
        business_unit_id: Option<BusinessUnitId>,
    },
    /// An employee.
    Employee {
        /// Unit the employee works in.
        business_unit_id: BusinessUnitId,
    },
    /// One of the shared master data tables.
    MasterData(MasterData),
    /// User accounts.
    User,
    /// The activity log.
    ActivityLog,
}

impl Resource {
    /// Human-readable resource name for messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transaction { .. } => "transactions",
            Self::Partner { .. } => "partners",
            Self::Employee { .. } => "employees",
            Self::MasterData(MasterData::BusinessUnit) => "business units",
            Self::MasterData(MasterData::Category) => "categories",
            Self::MasterData(MasterData::PaymentMethod) => "payment methods",
            Self::MasterData(MasterData::AllocationRule) => "allocation rules",
            Self::User => "users",
            Self::ActivityLog => "activity logs",
        }
    }
}

/// Operations the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Get or list.
    Read,
    /// Insert.
    Create,
    /// Edit fields.
    Update,
    /// Remove.
    Delete,
    /// Send for approval.
    Submit,
    /// Approve.
    Approve,
    /// Reject.
    Reject,
    /// Cancel.
    Cancel,
    /// Mark paid or unpaid.
    UpdatePaymentStatus,
}

impl Action {
    /// Returns true for actions that only CEO/Admin may take on transactions.
    #[must_use]
    pub const fn is_decision(&self) -> bool {
        matches!(self, Self::Approve | Self::Reject)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::UpdatePaymentStatus => "update payment status of",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_and_serde() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(serde_json::to_string(&Role::BuLead).unwrap(), "\"BU_LEAD\"");
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_visibility() {
        let bu = BusinessUnitId::new();
        let user = UserId::new();
        assert_eq!(Principal::new(user, Role::Ceo, Some(bu)).visibility(), BuScope::All);
        assert_eq!(Principal::new(user, Role::Admin, None).visibility(), BuScope::All);
        assert_eq!(
            Principal::new(user, Role::BuLead, Some(bu)).visibility(),
            BuScope::Unit(bu)
        );
        assert_eq!(Principal::new(user, Role::Staff, None).visibility(), BuScope::Empty);
    }

    #[test]
    fn test_scope_contains() {
        let bu = BusinessUnitId::new();
        assert!(BuScope::All.contains(bu));
        assert!(BuScope::Unit(bu).contains(bu));
        assert!(!BuScope::Unit(BusinessUnitId::new()).contains(bu));
        assert!(!BuScope::Empty.contains(bu));
    }
}
