use holdco_shared::types::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// Row inserted.
    Create,
    /// Row edited.
    Update,
    /// Row removed.
    Delete,
    /// Transaction submitted for approval.
    Submit,
    /// Transaction approved.
    Approve,
    /// Transaction rejected.
    Reject,
    /// Transaction cancelled.
    Cancel,
}

impl ActivityAction {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Submit => "SUBMIT",
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Cancel => "CANCEL",
        }
    }

    /// Parses the stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "SUBMIT" => Some(Self::Submit),
            "APPROVE" => Some(Self::Approve),
            "REJECT" => Some(Self::Reject),
            "CANCEL" => Some(Self::Cancel),
            _ => None,
        }
    }

    const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "Created",
            Self::Update => "Updated",
            Self::Delete => "Deleted",
            Self::Submit => "Submitted",
            Self::Approve => "Approved",
            Self::Reject => "Rejected",
            Self::Cancel => "Cancelled",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which table the entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// Transactions.
    Transaction,
    /// Allocation rules.
    AllocationRule,
    /// Business units.
    BusinessUnit,
    /// Categories.
    Category,
    /// Payment methods.
    PaymentMethod,
    /// Partners.
    Partner,
    /// Employees.
    Employee,
    /// User accounts.
    User,
}

impl EntityKind {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transaction => "TRANSACTION",
            Self::AllocationRule => "ALLOCATION_RULE",
            Self::BusinessUnit => "BUSINESS_UNIT",
            Self::Category => "CATEGORY",
            Self::PaymentMethod => "PAYMENT_METHOD",
            Self::Partner => "PARTNER",
            Self::Employee => "EMPLOYEE",
            Self::User => "USER",
        }
    }

    /// Parses the stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TRANSACTION" => Some(Self::Transaction),
            "ALLOCATION_RULE" => Some(Self::AllocationRule),
            "BUSINESS_UNIT" => Some(Self::BusinessUnit),
            "CATEGORY" => Some(Self::Category),
            "PAYMENT_METHOD" => Some(Self::PaymentMethod),
            "PARTNER" => Some(Self::Partner),
            "EMPLOYEE" => Some(Self::Employee),
            "USER" => Some(Self::User),
            _ => None,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::AllocationRule => "allocation rule",
            Self::BusinessUnit => "business unit",
            Self::Category => "category",
            Self::PaymentMethod => "payment method",
            Self::Partner => "partner",
            Self::Employee => "employee",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One activity log row, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    /// Who did it.
    pub actor_id: UserId,
    /// What they did.
    pub action: ActivityAction,
    /// Table of the affected row.
    pub entity_type: EntityKind,
    /// ID of the affected row.
    pub entity_id: Uuid,
    /// One-line description, e.g. `Approved transaction EXP-202601-0001`.
    pub summary: String,
    /// Optional structured payload, such as a before/after snapshot.
    pub details: Option<Value>,
}

impl ActivityEntry {
    /// Creates an entry whose summary names the row by `label` (code or name).
    #[must_use]
    pub fn new(
        actor_id: UserId,
        action: ActivityAction,
        entity_type: EntityKind,
        entity_id: impl Into<Uuid>,
        label: &str,
    ) -> Self {
        Self {
            actor_id,
            action,
            entity_type,
            entity_id: entity_id.into(),
            summary: format!("{} {} {label}", action.past_tense(), entity_type.label()),
            details: None,
        }
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches a `{ "before": .., "after": .. }` snapshot.
    #[must_use]
    pub fn with_changes(self, before: Value, after: Value) -> Self {
        self.with_details(serde_json::json!({ "before": before, "after": after }))
    }
}
