//! Transaction routes: CRUD, the approval workflow, payment status and the
//! per-unit allocation breakdown.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use holdco_core::allocation::AllocationShare;
use holdco_core::transaction::{
    CostAllocation, Counterpart, CounterpartFields, ObjectType, PaymentStatus, TransactionDraft,
    TransactionType, TransactionValidationError,
};
use holdco_core::workflow::ApprovalStatus;
use holdco_db::entities::transactions;
use holdco_db::repositories::TransactionFilter;
use holdco_shared::types::{
    AllocationRuleId, Amount, BusinessUnitId, CategoryId, EmployeeId, PageRequest, PageResponse,
    PartnerId, PaymentMethodId,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::non_blank;
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{id}/submit", post(submit_transaction))
        .route("/transactions/{id}/approve", post(approve_transaction))
        .route("/transactions/{id}/reject", post(reject_transaction))
        .route("/transactions/{id}/cancel", post(cancel_transaction))
        .route(
            "/transactions/{id}/payment-status",
            post(update_payment_status).patch(update_payment_status),
        )
        .route("/transactions/{id}/allocations", get(get_allocations))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Income, expense or loan.
    #[serde(alias = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Approval status.
    pub approval_status: Option<ApprovalStatus>,
    /// Payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Direct or indirect.
    pub cost_allocation: Option<CostAllocation>,
    /// Owning unit.
    pub business_unit_id: Option<Uuid>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Partner counterpart.
    pub partner_id: Option<Uuid>,
    /// Employee counterpart.
    pub employee_id: Option<Uuid>,
    /// Inclusive start date (YYYY-MM-DD).
    pub date_from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD).
    pub date_to: Option<NaiveDate>,
    /// Substring of the code or description.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListTransactionsQuery {
    fn into_parts(self) -> (TransactionFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.per_page);
        let filter = TransactionFilter {
            transaction_type: self.transaction_type,
            approval_status: self.approval_status,
            payment_status: self.payment_status,
            cost_allocation: self.cost_allocation,
            business_unit_id: self.business_unit_id.map(BusinessUnitId::from_uuid),
            category_id: self.category_id.map(CategoryId::from_uuid),
            partner_id: self.partner_id.map(PartnerId::from_uuid),
            employee_id: self.employee_id.map(EmployeeId::from_uuid),
            date_from: self.date_from,
            date_to: self.date_to,
            search: non_blank(self.search),
        };
        (filter, page)
    }
}

/// Request body for creating or replacing a transaction.
///
/// The counterpart arrives as `objectType` plus the one matching field.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Business date; defaults to today in the business timezone.
    #[serde(alias = "date")]
    pub transaction_date: Option<NaiveDate>,
    /// Income, expense or loan.
    #[serde(alias = "type")]
    pub transaction_type: TransactionType,
    /// Category, matching `transaction_type`.
    pub category_id: Uuid,
    /// Which counterpart field is used.
    pub object_type: ObjectType,
    /// Set for `PARTNER`.
    pub partner_id: Option<Uuid>,
    /// Set for `EMPLOYEE`.
    pub employee_id: Option<Uuid>,
    /// Set for `STUDENT`.
    pub student_name: Option<String>,
    /// Set for `OTHER`.
    pub other_name: Option<String>,
    /// Owning unit. May be omitted for INDIRECT.
    pub business_unit_id: Option<Uuid>,
    /// Whole currency units.
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub amount: i64,
    /// Direct or indirect.
    pub cost_allocation: CostAllocation,
    /// Required for INDIRECT.
    pub allocation_rule_id: Option<Uuid>,
    /// Payment method.
    pub payment_method_id: Uuid,
    /// Defaults to UNPAID.
    pub payment_status: Option<PaymentStatus>,
    /// Free text.
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
    /// File references under `/uploads/` or absolute URLs.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Submit for approval instead of saving as draft.
    #[serde(default)]
    pub submit: bool,
}

impl TransactionRequest {
    /// Builds the typed draft, defaulting the date to `today`.
    ///
    /// # Errors
    ///
    /// Returns the counterpart error if `objectType` and the populated
    /// fields disagree.
    pub fn into_draft(self, today: NaiveDate) -> Result<TransactionDraft, TransactionValidationError> {
        let counterpart = Counterpart::from_fields(
            self.object_type,
            CounterpartFields {
                partner_id: self.partner_id.map(PartnerId::from_uuid),
                employee_id: self.employee_id.map(EmployeeId::from_uuid),
                student_name: self.student_name,
                other_name: self.other_name,
            },
        )?;

        Ok(TransactionDraft {
            date: self.transaction_date.unwrap_or(today),
            transaction_type: self.transaction_type,
            category_id: CategoryId::from_uuid(self.category_id),
            counterpart,
            business_unit_id: self.business_unit_id.map(BusinessUnitId::from_uuid),
            amount: Amount::new(self.amount),
            cost_allocation: self.cost_allocation,
            allocation_rule_id: self.allocation_rule_id.map(AllocationRuleId::from_uuid),
            payment_method_id: PaymentMethodId::from_uuid(self.payment_method_id),
            payment_status: self.payment_status.unwrap_or(PaymentStatus::Unpaid),
            description: non_blank(self.description),
            attachments: self
                .attachments
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        })
    }
}

/// Request body for rejecting a transaction.
#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    /// Why the transaction was rejected.
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub reason: String,
}

/// Request body for marking a transaction paid or unpaid.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    /// New payment status.
    pub payment_status: PaymentStatus,
}

fn today(state: &AppState) -> NaiveDate {
    Utc::now().with_timezone(&state.timezone).date_naive()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List transactions visible to the caller.
async fn list_transactions(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Json<PageResponse<transactions::Model>>> {
    let (filter, page) = query.into_parts();
    Ok(Json(
        state
            .transactions()
            .list(ctx.principal(), filter, page)
            .await?,
    ))
}

/// GET `/transactions/{id}`
async fn get_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<transactions::Model>> {
    Ok(Json(state.transactions().get(ctx.principal(), id).await?))
}

/// POST `/transactions` - Create as DRAFT, or PENDING with `submit: true`.
async fn create_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<transactions::Model>)> {
    let submit = payload.submit;
    let draft = payload.into_draft(today(&state))?;
    let created = state
        .transactions()
        .create(ctx.principal(), draft, submit)
        .await?;

    info!(
        transaction_id = %created.id,
        user_id = %ctx.principal().user_id,
        "transaction created via API"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT `/transactions/{id}` - Replace the editable fields.
async fn update_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<TransactionRequest>,
) -> ApiResult<Json<transactions::Model>> {
    let submit = payload.submit;
    let draft = payload.into_draft(today(&state))?;
    Ok(Json(
        state
            .transactions()
            .update(ctx.principal(), id, draft, submit)
            .await?,
    ))
}

/// DELETE `/transactions/{id}` - Refused once APPROVED.
async fn delete_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.transactions().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/transactions/{id}/submit`
async fn submit_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<transactions::Model>> {
    Ok(Json(state.transactions().submit(ctx.principal(), id).await?))
}

/// POST `/transactions/{id}/approve`
async fn approve_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<transactions::Model>> {
    Ok(Json(state.transactions().approve(ctx.principal(), id).await?))
}

/// POST `/transactions/{id}/reject`
async fn reject_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RejectRequest>,
) -> ApiResult<Json<transactions::Model>> {
    Ok(Json(
        state
            .transactions()
            .reject(ctx.principal(), id, &payload.reason)
            .await?,
    ))
}

/// POST `/transactions/{id}/cancel`
async fn cancel_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<transactions::Model>> {
    Ok(Json(state.transactions().cancel(ctx.principal(), id).await?))
}

/// POST or PATCH `/transactions/{id}/payment-status`
async fn update_payment_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PaymentStatusRequest>,
) -> ApiResult<Json<transactions::Model>> {
    Ok(Json(
        state
            .transactions()
            .update_payment_status(ctx.principal(), id, payload.payment_status)
            .await?,
    ))
}

/// GET `/transactions/{id}/allocations` - Per-unit shares of the amount.
async fn get_allocations(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<AllocationShare>>> {
    Ok(Json(
        state
            .transactions()
            .allocations(ctx.principal(), id)
            .await?,
    ))
}
