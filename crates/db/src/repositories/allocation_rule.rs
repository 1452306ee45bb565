//! Allocation rule repository.
//!
//! A rule row owns its lines; both are always written in the same database
//! transaction. Line percentages are stored as basis points.

use chrono::Utc;
use holdco_core::access::{Action, MasterData, Principal, Resource, authorize};
use holdco_core::allocation::{
    AllocationError, AllocationLine, AllocationRule, AllocationShare, basis_points_to_percentage,
    percentage_to_basis_points, split_amount, validate_lines,
};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_shared::types::{AllocationRuleId, BusinessUnitId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::error::RepositoryError;
use crate::entities::{allocation_rule_lines, allocation_rules, business_units, transactions};

const RESOURCE: Resource = Resource::MasterData(MasterData::AllocationRule);

/// Input for creating or replacing an allocation rule.
#[derive(Debug, Clone)]
pub struct AllocationRuleInput {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether new transactions may use it.
    pub is_active: bool,
    /// Business unit percentages, in display order.
    pub lines: Vec<AllocationLine>,
}

/// A rule row with its lines ordered by position.
#[derive(Debug, Clone, Serialize)]
pub struct RuleWithLines {
    /// Rule header.
    #[serde(flatten)]
    pub rule: allocation_rules::Model,
    /// Lines in rule order.
    pub lines: Vec<allocation_rule_lines::Model>,
}

impl RuleWithLines {
    fn new(rule: allocation_rules::Model, mut lines: Vec<allocation_rule_lines::Model>) -> Self {
        lines.sort_by_key(|line| line.position);
        Self { rule, lines }
    }

    /// Converts into the domain rule used by the split.
    #[must_use]
    pub fn to_domain(&self) -> AllocationRule {
        AllocationRule {
            id: AllocationRuleId::from_uuid(self.rule.id),
            name: self.rule.name.clone(),
            description: self.rule.description.clone(),
            lines: self
                .lines
                .iter()
                .map(|line| AllocationLine {
                    business_unit_id: BusinessUnitId::from_uuid(line.business_unit_id),
                    percentage: basis_points_to_percentage(line.percentage_bp),
                })
                .collect(),
        }
    }

    fn details(&self) -> serde_json::Value {
        json!({ "rule": snapshot(&self.rule), "lines": snapshot(&self.lines) })
    }
}

/// Loads a rule and its lines.
pub(crate) async fn load<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<RuleWithLines>, RepositoryError> {
    let Some(rule) = allocation_rules::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let lines = allocation_rule_lines::Entity::find()
        .filter(allocation_rule_lines::Column::RuleId.eq(id))
        .order_by_asc(allocation_rule_lines::Column::Position)
        .all(conn)
        .await?;
    Ok(Some(RuleWithLines::new(rule, lines)))
}

/// Allocation rule repository.
#[derive(Debug, Clone)]
pub struct AllocationRuleRepository {
    db: DatabaseConnection,
}

impl AllocationRuleRepository {
    /// Creates a new allocation rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists rules with their lines, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        active: Option<bool>,
    ) -> Result<Vec<RuleWithLines>, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;

        let mut query = allocation_rules::Entity::find();
        if let Some(active) = active {
            query = query.filter(allocation_rules::Column::IsActive.eq(active));
        }
        let rows = query
            .order_by_asc(allocation_rules::Column::Name)
            .order_by_asc(allocation_rules::Column::Id)
            .find_with_related(allocation_rule_lines::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(rule, lines)| RuleWithLines::new(rule, lines))
            .collect())
    }

    /// Gets a rule with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<RuleWithLines, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;
        load(&self.db, id)
            .await?
            .ok_or(RepositoryError::not_found("Allocation rule", id))
    }

    /// Previews how `amount` would be split by the rule.
    ///
    /// # Errors
    ///
    /// Returns `Allocation(RuleNotFound)` if the rule does not exist, or the
    /// split error for a non-positive amount.
    pub async fn split(
        &self,
        principal: &Principal,
        id: Uuid,
        amount: i64,
    ) -> Result<Vec<AllocationShare>, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Read)?;
        let rule = load(&self.db, id)
            .await?
            .ok_or(AllocationError::RuleNotFound(id))?;
        Ok(split_amount(amount, &rule.to_domain().lines)?)
    }

    /// Creates a rule and its lines.
    ///
    /// # Errors
    ///
    /// Returns `Allocation` if the lines are invalid, or `Validation` for an
    /// unknown business unit.
    pub async fn create(
        &self,
        principal: &Principal,
        input: AllocationRuleInput,
    ) -> Result<RuleWithLines, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Create)?;
        validate_lines(&input.lines)?;

        let txn = self.db.begin().await?;
        check_business_units(&txn, &input.lines).await?;

        let now = Utc::now().into();
        let rule = allocation_rules::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        let lines = insert_lines(&txn, rule.id, &input.lines).await?;
        let created = RuleWithLines::new(rule, lines);

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::AllocationRule,
                created.rule.id,
                &created.rule.name,
            )
            .with_details(created.details()),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(
            allocation_rule_id = %created.rule.id,
            lines = created.lines.len(),
            "allocation rule created"
        );
        Ok(created)
    }

    /// Replaces a rule and all of its lines.
    ///
    /// Existing transactions keep pointing at the rule, so their split
    /// follows the new percentages.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Allocation` or `Validation`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: AllocationRuleInput,
    ) -> Result<RuleWithLines, RepositoryError> {
        authorize(principal, &RESOURCE, Action::Update)?;
        validate_lines(&input.lines)?;

        let txn = self.db.begin().await?;
        let existing = load(&txn, id)
            .await?
            .ok_or(RepositoryError::not_found("Allocation rule", id))?;
        check_business_units(&txn, &input.lines).await?;

        let before = existing.details();
        let mut active: allocation_rules::ActiveModel = existing.rule.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let rule = active.update(&txn).await?;

        allocation_rule_lines::Entity::delete_many()
            .filter(allocation_rule_lines::Column::RuleId.eq(id))
            .exec(&txn)
            .await?;
        let lines = insert_lines(&txn, id, &input.lines).await?;
        let updated = RuleWithLines::new(rule, lines);

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::AllocationRule,
                id,
                &updated.rule.name,
            )
            .with_changes(before, updated.details()),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(allocation_rule_id = %id, "allocation rule updated");
        Ok(updated)
    }

    /// Deletes a rule no transaction uses. Lines go with it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InUse`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        authorize(principal, &RESOURCE, Action::Delete)?;

        let txn = self.db.begin().await?;
        let existing = load(&txn, id)
            .await?
            .ok_or(RepositoryError::not_found("Allocation rule", id))?;

        let used = transactions::Entity::find()
            .filter(transactions::Column::AllocationRuleId.eq(id))
            .count(&txn)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Cannot delete allocation rule '{}': in use by {used} transaction(s)",
                existing.rule.name
            )));
        }

        allocation_rule_lines::Entity::delete_many()
            .filter(allocation_rule_lines::Column::RuleId.eq(id))
            .exec(&txn)
            .await?;
        allocation_rules::Entity::delete_by_id(id).exec(&txn).await?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::AllocationRule,
                id,
                &existing.rule.name,
            )
            .with_details(existing.details()),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(allocation_rule_id = %id, "allocation rule deleted");
        Ok(())
    }
}

async fn check_business_units(
    txn: &DatabaseTransaction,
    lines: &[AllocationLine],
) -> Result<(), RepositoryError> {
    let ids: Vec<Uuid> = lines
        .iter()
        .map(|line| line.business_unit_id.into_inner())
        .collect();
    let found = business_units::Entity::find()
        .filter(business_units::Column::Id.is_in(ids.clone()))
        .all(txn)
        .await?;

    match ids.iter().find(|id| !found.iter().any(|bu| bu.id == **id)) {
        Some(missing) => Err(RepositoryError::Validation(format!(
            "Business unit {missing} does not exist"
        ))),
        None => Ok(()),
    }
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    rule_id: Uuid,
    lines: &[AllocationLine],
) -> Result<Vec<allocation_rule_lines::Model>, RepositoryError> {
    let mut inserted = Vec::with_capacity(lines.len());
    for (position, line) in (0i32..).zip(lines) {
        let row = allocation_rule_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            rule_id: Set(rule_id),
            business_unit_id: Set(line.business_unit_id.into_inner()),
            percentage_bp: Set(percentage_to_basis_points(line.percentage)?),
            position: Set(position),
        }
        .insert(txn)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, || {
                format!(
                    "Business unit {} appears more than once in the allocation rule",
                    line.business_unit_id
                )
            })
        })?;
        inserted.push(row);
    }
    Ok(inserted)
}
