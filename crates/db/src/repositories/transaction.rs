//! Transaction repository.
//!
//! Every write validates the typed draft, resolves its references inside the
//! same database transaction, checks the access policy, and records an
//! activity log entry before committing.

use chrono::{NaiveDate, Utc};
use holdco_core::access::{Action, BuScope, Principal, Resource, authorize};
use holdco_core::allocation::{AllocationError, AllocationShare, direct_share, split_amount};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_core::transaction::{
    CostAllocation, Counterpart, CounterpartFields, PaymentStatus, TransactionDraft,
    TransactionType, TransactionValidationError, code_prefix, ensure_category_matches,
    format_code, next_sequence,
};
use holdco_core::workflow::{ApprovalStatus, WorkflowAction, WorkflowService};
use holdco_shared::types::{
    AllocationRuleId, Amount, BusinessUnitId, CategoryId, EmployeeId, PageRequest, PageResponse, PartnerId, UserId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

use super::activity_log::{record, snapshot};
use super::allocation_rule;
use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::{
    AllocationKind, ApprovalState, PaymentState, TxType,
};
use crate::entities::{business_units, categories, employees, partners, payment_methods, transactions};

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by transaction type.
    pub transaction_type: Option<TransactionType>,
    /// Filter by approval status.
    pub approval_status: Option<ApprovalStatus>,
    /// Filter by payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Filter by cost allocation kind.
    pub cost_allocation: Option<CostAllocation>,
    /// Filter by owning unit.
    pub business_unit_id: Option<BusinessUnitId>,
    /// Filter by category.
    pub category_id: Option<CategoryId>,
    /// Filter by partner counterpart.
    pub partner_id: Option<PartnerId>,
    /// Filter by employee counterpart.
    pub employee_id: Option<EmployeeId>,
    /// Inclusive start date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive end date.
    pub date_to: Option<NaiveDate>,
    /// Substring of the code or description.
    pub search: Option<String>,
}

/// The access resource a stored transaction represents.
pub(crate) fn resource_of(model: &transactions::Model) -> Resource {
    Resource::Transaction {
        business_unit_id: BusinessUnitId::from_uuid(model.business_unit_id),
        created_by: UserId::from_uuid(model.created_by),
    }
}

/// Attachment references stored on a transaction.
///
/// An unreadable column yields an empty list and a warning.
#[must_use]
pub fn attachments_of(model: &transactions::Model) -> Vec<String> {
    serde_json::from_value(model.attachments.clone()).unwrap_or_else(|e| {
        tracing::warn!(
            transaction_id = %model.id,
            error = %e,
            "attachments column is not a list of strings"
        );
        Vec::new()
    })
}

/// Rebuilds the tagged counterpart from the stored columns.
///
/// # Errors
///
/// Fails only if the row violates the one-counterpart invariant.
pub fn counterpart_of(model: &transactions::Model) -> Result<Counterpart, TransactionValidationError> {
    Counterpart::from_fields(
        model.object_type.into(),
        CounterpartFields {
            partner_id: model.partner_id.map(PartnerId::from_uuid),
            employee_id: model.employee_id.map(EmployeeId::from_uuid),
            student_name: model.student_name.clone(),
            other_name: model.other_name.clone(),
        },
    )
}

/// Writes the status columns a workflow action changes.
pub(crate) fn apply_action(active: &mut transactions::ActiveModel, action: &WorkflowAction) {
    active.approval_status = Set(action.new_status().into());
    match action {
        WorkflowAction::Save { submitted_at, .. } => {
            active.rejection_reason = Set(None);
            if let Some(at) = submitted_at {
                active.submitted_at = Set(Some((*at).into()));
            }
        }
        WorkflowAction::Submit { submitted_at, .. } => {
            active.rejection_reason = Set(None);
            active.submitted_at = Set(Some((*submitted_at).into()));
        }
        WorkflowAction::Approve {
            approved_by,
            approved_at,
            ..
        } => {
            active.approved_by = Set(Some(approved_by.into_inner()));
            active.approved_at = Set(Some((*approved_at).into()));
        }
        WorkflowAction::Reject {
            rejection_reason, ..
        } => {
            active.rejection_reason = Set(Some(rejection_reason.clone()));
        }
        WorkflowAction::Cancel { cancelled_at, .. } => {
            active.cancelled_at = Set(Some((*cancelled_at).into()));
        }
    }
    active.updated_at = Set(Utc::now().into());
}

/// A draft whose references have been checked against the database.
struct Resolved {
    business_unit_id: BusinessUnitId,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pub(crate) db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction as DRAFT, or PENDING when `submit` is set.
    ///
    /// INDIRECT transactions without a business unit get the caller's own
    /// unit, or the rule's primary unit for CEO/Admin.
    ///
    /// # Errors
    ///
    /// Returns `Transaction` for an invalid draft, `Validation` for unknown
    /// or inactive references, or `Access`.
    pub async fn create(
        &self,
        principal: &Principal,
        draft: TransactionDraft,
        submit: bool,
    ) -> Result<transactions::Model, RepositoryError> {
        draft.validate()?;

        let txn = self.db.begin().await?;
        let resolved = resolve(&txn, principal, &draft, true).await?;
        authorize(
            principal,
            &Resource::Transaction {
                business_unit_id: resolved.business_unit_id,
                created_by: principal.user_id,
            },
            Action::Create,
        )?;

        let action = WorkflowService::save(ApprovalStatus::Draft, submit)?;
        let code = next_code(&txn, draft.transaction_type, draft.date).await?;
        let fields = draft.counterpart.to_fields();
        let now = Utc::now().into();

        let mut active = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code),
            transaction_date: Set(draft.date),
            transaction_type: Set(draft.transaction_type.into()),
            category_id: Set(draft.category_id.into_inner()),
            object_type: Set(draft.counterpart.object_type().into()),
            partner_id: Set(fields.partner_id.map(PartnerId::into_inner)),
            employee_id: Set(fields.employee_id.map(EmployeeId::into_inner)),
            student_name: Set(fields.student_name),
            other_name: Set(fields.other_name),
            business_unit_id: Set(resolved.business_unit_id.into_inner()),
            amount: Set(draft.amount.units()),
            cost_allocation: Set(draft.cost_allocation.into()),
            allocation_rule_id: Set(draft.allocation_rule_id.map(AllocationRuleId::into_inner)),
            payment_method_id: Set(draft.payment_method_id.into_inner()),
            payment_status: Set(draft.payment_status.into()),
            approval_status: Set(ApprovalState::Draft),
            description: Set(draft.description),
            attachments: Set(Value::from(draft.attachments)),
            created_by: Set(principal.user_id.into_inner()),
            submitted_at: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            rejection_reason: Set(None),
            cancelled_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        apply_action(&mut active, &action);
        let created = active.insert(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Transaction code already exists, please retry".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Create,
                EntityKind::Transaction,
                created.id,
                &created.code,
            )
            .with_details(snapshot(&created)),
        )
        .await?;
        if submit {
            record(
                &txn,
                ActivityEntry::new(
                    principal.user_id,
                    ActivityAction::Submit,
                    EntityKind::Transaction,
                    created.id,
                    &created.code,
                ),
            )
            .await?;
        }
        txn.commit().await?;

        tracing::info!(
            transaction_id = %created.id,
            code = %created.code,
            status = %ApprovalStatus::from(created.approval_status),
            "transaction created"
        );
        Ok(created)
    }

    /// Replaces the editable fields of a transaction.
    ///
    /// Allowed from DRAFT, PENDING and REJECTED. The result is DRAFT, or
    /// PENDING when `submit` is set; any rejection reason is cleared. The code
    /// is reissued when the type or month changes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Workflow`, `Transaction`, `Validation` or `Access`.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        draft: TransactionDraft,
        submit: bool,
    ) -> Result<transactions::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find(&txn, id).await?;
        authorize(principal, &resource_of(&existing), Action::Update)?;

        let previous_status = ApprovalStatus::from(existing.approval_status);
        let action = WorkflowService::save(previous_status, submit)?;
        draft.validate()?;

        let resolved = resolve(&txn, principal, &draft, false).await?;
        authorize(
            principal,
            &Resource::Transaction {
                business_unit_id: resolved.business_unit_id,
                created_by: UserId::from_uuid(existing.created_by),
            },
            Action::Update,
        )?;

        let prefix = code_prefix(draft.transaction_type, draft.date);
        let code = if existing.code.starts_with(&prefix) {
            existing.code.clone()
        } else {
            next_code(&txn, draft.transaction_type, draft.date).await?
        };

        let before = snapshot(&existing);
        let fields = draft.counterpart.to_fields();
        let mut active: transactions::ActiveModel = existing.into();
        active.code = Set(code);
        active.transaction_date = Set(draft.date);
        active.transaction_type = Set(draft.transaction_type.into());
        active.category_id = Set(draft.category_id.into_inner());
        active.object_type = Set(draft.counterpart.object_type().into());
        active.partner_id = Set(fields.partner_id.map(PartnerId::into_inner));
        active.employee_id = Set(fields.employee_id.map(EmployeeId::into_inner));
        active.student_name = Set(fields.student_name);
        active.other_name = Set(fields.other_name);
        active.business_unit_id = Set(resolved.business_unit_id.into_inner());
        active.amount = Set(draft.amount.units());
        active.cost_allocation = Set(draft.cost_allocation.into());
        active.allocation_rule_id = Set(draft.allocation_rule_id.map(AllocationRuleId::into_inner));
        active.payment_method_id = Set(draft.payment_method_id.into_inner());
        active.payment_status = Set(draft.payment_status.into());
        active.description = Set(draft.description);
        active.attachments = Set(Value::from(draft.attachments));
        apply_action(&mut active, &action);
        let updated = active.update(&txn).await.map_err(|e| {
            RepositoryError::from_write(e, || "Transaction code already exists, please retry".into())
        })?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::Transaction,
                updated.id,
                &updated.code,
            )
            .with_changes(before, snapshot(&updated)),
        )
        .await?;
        if submit && previous_status != ApprovalStatus::Pending {
            record(
                &txn,
                ActivityEntry::new(
                    principal.user_id,
                    ActivityAction::Submit,
                    EntityKind::Transaction,
                    updated.id,
                    &updated.code,
                ),
            )
            .await?;
        }
        txn.commit().await?;

        tracing::info!(transaction_id = %updated.id, code = %updated.code, "transaction updated");
        Ok(updated)
    }

    /// Deletes a transaction that is not APPROVED.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `Workflow`.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find(&txn, id).await?;
        authorize(principal, &resource_of(&existing), Action::Delete)?;
        WorkflowService::ensure_deletable(existing.approval_status.into())?;

        transactions::Entity::delete_by_id(id).exec(&txn).await?;
        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Delete,
                EntityKind::Transaction,
                id,
                &existing.code,
            )
            .with_details(snapshot(&existing)),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(transaction_id = %id, code = %existing.code, "transaction deleted");
        Ok(())
    }

    /// Gets a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Access` if it belongs to another unit.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<transactions::Model, RepositoryError> {
        let transaction = find(&self.db, id).await?;
        authorize(principal, &resource_of(&transaction), Action::Read)?;
        Ok(transaction)
    }

    /// Lists transactions visible to `principal`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<transactions::Model>, RepositoryError> {
        let mut query = match principal.visibility() {
            BuScope::All => transactions::Entity::find(),
            BuScope::Unit(id) => transactions::Entity::find()
                .filter(transactions::Column::BusinessUnitId.eq(id.into_inner())),
            BuScope::Empty => return Ok(PageResponse::new(Vec::new(), page, 0)),
        };

        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(transactions::Column::TransactionType.eq(TxType::from(transaction_type)));
        }
        if let Some(status) = filter.approval_status {
            query = query.filter(transactions::Column::ApprovalStatus.eq(ApprovalState::from(status)));
        }
        if let Some(status) = filter.payment_status {
            query = query.filter(transactions::Column::PaymentStatus.eq(PaymentState::from(status)));
        }
        if let Some(kind) = filter.cost_allocation {
            query = query.filter(transactions::Column::CostAllocation.eq(AllocationKind::from(kind)));
        }
        if let Some(bu) = filter.business_unit_id {
            query = query.filter(transactions::Column::BusinessUnitId.eq(bu.into_inner()));
        }
        if let Some(category) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category.into_inner()));
        }
        if let Some(partner) = filter.partner_id {
            query = query.filter(transactions::Column::PartnerId.eq(partner.into_inner()));
        }
        if let Some(employee) = filter.employee_id {
            query = query.filter(transactions::Column::EmployeeId.eq(employee.into_inner()));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::TransactionDate.lte(date_to));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::Code.contains(search))
                    .add(transactions::Column::Description.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Per-unit shares of a transaction.
    ///
    /// DIRECT transactions give a single 100% share to their own unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access`, or `Allocation(RuleNotFound)` if the rule
    /// of an INDIRECT transaction is gone.
    pub async fn allocations(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Vec<AllocationShare>, RepositoryError> {
        let transaction = self.get(principal, id).await?;
        let amount = Amount::new(transaction.amount);

        match (transaction.cost_allocation, transaction.allocation_rule_id) {
            (AllocationKind::Indirect, Some(rule_id)) => {
                let rule = allocation_rule::load(&self.db, rule_id)
                    .await?
                    .ok_or(AllocationError::RuleNotFound(rule_id))?;
                Ok(split_amount(amount.units(), &rule.to_domain().lines)?)
            }
            (AllocationKind::Indirect, None) => Err(AllocationError::RuleRequired.into()),
            (AllocationKind::Direct, _) => Ok(vec![direct_share(
                BusinessUnitId::from_uuid(transaction.business_unit_id),
                amount,
            )]),
        }
    }
}

pub(crate) async fn find<C: sea_orm::ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<transactions::Model, RepositoryError> {
    transactions::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(RepositoryError::not_found("Transaction", id))
}

async fn next_code(
    txn: &DatabaseTransaction,
    transaction_type: TransactionType,
    date: NaiveDate,
) -> Result<String, RepositoryError> {
    let prefix = code_prefix(transaction_type, date);
    let existing: Vec<String> = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::Code)
        .filter(transactions::Column::Code.starts_with(prefix.as_str()))
        .into_tuple()
        .all(txn)
        .await?;
    let sequence = next_sequence(&prefix, existing.iter().map(String::as_str));
    Ok(format_code(transaction_type, date, sequence))
}

/// Checks every reference of `draft` and picks the owning business unit.
///
/// `for_create` additionally requires the references to be active.
async fn resolve(
    txn: &DatabaseTransaction,
    principal: &Principal,
    draft: &TransactionDraft,
    for_create: bool,
) -> Result<Resolved, RepositoryError> {
    let inactive = |what: &str| RepositoryError::Validation(format!("{what} is inactive"));

    let category = categories::Entity::find_by_id(draft.category_id.into_inner())
        .one(txn)
        .await?
        .ok_or_else(|| {
            RepositoryError::Validation(format!("Category {} does not exist", draft.category_id))
        })?;
    if for_create && !category.is_active {
        return Err(inactive("Category"));
    }
    ensure_category_matches(category.transaction_type.into(), draft.transaction_type)?;

    let method = payment_methods::Entity::find_by_id(draft.payment_method_id.into_inner())
        .one(txn)
        .await?
        .ok_or_else(|| {
            RepositoryError::Validation(format!(
                "Payment method {} does not exist",
                draft.payment_method_id
            ))
        })?;
    if for_create && !method.is_active {
        return Err(inactive("Payment method"));
    }

    let rule = match draft.allocation_rule_id {
        Some(rule_id) => {
            let rule = allocation_rule::load(txn, rule_id.into_inner())
                .await?
                .ok_or_else(|| {
                    RepositoryError::Validation(format!("Allocation rule {rule_id} does not exist"))
                })?;
            if for_create && !rule.rule.is_active {
                return Err(inactive("Allocation rule"));
            }
            Some(rule)
        }
        None => None,
    };

    let business_unit_id = match draft.business_unit_id {
        Some(id) => id,
        None => match principal.visibility() {
            BuScope::Unit(own) => own,
            BuScope::All | BuScope::Empty => rule
                .as_ref()
                .and_then(|rule| rule.to_domain().primary_business_unit())
                .ok_or(TransactionValidationError::BusinessUnitRequired)?,
        },
    };
    let unit = business_units::Entity::find_by_id(business_unit_id.into_inner())
        .one(txn)
        .await?
        .ok_or_else(|| {
            RepositoryError::Validation(format!("Business unit {business_unit_id} does not exist"))
        })?;
    if for_create && !unit.is_active {
        return Err(inactive("Business unit"));
    }

    match &draft.counterpart {
        Counterpart::Partner(partner_id) => {
            let partner = partners::Entity::find_by_id(partner_id.into_inner())
                .one(txn)
                .await?
                .ok_or_else(|| {
                    RepositoryError::Validation(format!("Partner {partner_id} does not exist"))
                })?;
            authorize(
                principal,
                &Resource::Partner {
                    business_unit_id: partner.business_unit_id.map(BusinessUnitId::from_uuid),
                },
                Action::Read,
            )?;
        }
        Counterpart::Employee(employee_id) => {
            let employee = employees::Entity::find_by_id(employee_id.into_inner())
                .one(txn)
                .await?
                .ok_or_else(|| {
                    RepositoryError::Validation(format!("Employee {employee_id} does not exist"))
                })?;
            authorize(
                principal,
                &Resource::Employee {
                    business_unit_id: BusinessUnitId::from_uuid(employee.business_unit_id),
                },
                Action::Read,
            )?;
        }
        Counterpart::Student(_) | Counterpart::Other(_) => {}
    }

    Ok(Resolved { business_unit_id })
}
