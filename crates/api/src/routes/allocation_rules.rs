//! Allocation rule routes, including the split preview.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use holdco_core::allocation::{AllocationLine, AllocationShare};
use holdco_db::repositories::{AllocationRuleInput, RuleWithLines};
use holdco_shared::types::BusinessUnitId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::business_units::ActiveQuery;
use super::{default_true, non_blank};
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the allocation rule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/allocation-rules", get(list_rules).post(create_rule))
        .route(
            "/allocation-rules/{id}",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
        .route("/allocation-rules/{id}/split", get(preview_split))
}

/// One business unit's share of a rule.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleLineRequest {
    /// Receiving unit.
    pub business_unit_id: Uuid,
    /// Percentage, up to two decimal places.
    pub percentage: Decimal,
}

/// Request body for creating or replacing a rule.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRuleRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Percentages per unit, which must add up to 100.
    #[validate(length(min = 1, message = "must contain at least one business unit"))]
    pub lines: Vec<RuleLineRequest>,
}

impl From<AllocationRuleRequest> for AllocationRuleInput {
    fn from(req: AllocationRuleRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: non_blank(req.description),
            is_active: req.is_active,
            lines: req
                .lines
                .into_iter()
                .map(|line| AllocationLine {
                    business_unit_id: BusinessUnitId::from_uuid(line.business_unit_id),
                    percentage: line.percentage,
                })
                .collect(),
        }
    }
}

/// An allocation rule with percentages in display form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRuleResponse {
    /// Rule ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether new transactions may use it.
    pub is_active: bool,
    /// Lines in rule order.
    pub lines: Vec<AllocationLine>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last change.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<RuleWithLines> for AllocationRuleResponse {
    fn from(rule: RuleWithLines) -> Self {
        let lines = rule.to_domain().lines;
        let RuleWithLines { rule, .. } = rule;
        Self {
            id: rule.id,
            name: rule.name,
            description: rule.description,
            is_active: rule.is_active,
            lines,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

/// Query parameters for the split preview.
#[derive(Debug, Deserialize)]
pub struct SplitQuery {
    /// Amount to split, in whole currency units.
    pub amount: i64,
}

/// GET `/allocation-rules`
async fn list_rules(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<AllocationRuleResponse>>> {
    let rules = state
        .allocation_rules()
        .list(ctx.principal(), query.active)
        .await?;
    Ok(Json(rules.into_iter().map(Into::into).collect()))
}

/// GET `/allocation-rules/{id}`
async fn get_rule(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AllocationRuleResponse>> {
    let rule = state.allocation_rules().get(ctx.principal(), id).await?;
    Ok(Json(rule.into()))
}

/// POST `/allocation-rules`
async fn create_rule(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<AllocationRuleRequest>,
) -> ApiResult<(StatusCode, Json<AllocationRuleResponse>)> {
    let rule = state
        .allocation_rules()
        .create(ctx.principal(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(rule.into())))
}

/// PUT `/allocation-rules/{id}` - Replaces the rule and all its lines.
async fn update_rule(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AllocationRuleRequest>,
) -> ApiResult<Json<AllocationRuleResponse>> {
    let rule = state
        .allocation_rules()
        .update(ctx.principal(), id, payload.into())
        .await?;
    Ok(Json(rule.into()))
}

/// DELETE `/allocation-rules/{id}`
async fn delete_rule(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.allocation_rules().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/allocation-rules/{id}/split?amount=` - How an amount would be split.
async fn preview_split(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Query(query): Query<SplitQuery>,
) -> ApiResult<Json<Vec<AllocationShare>>> {
    Ok(Json(
        state
            .allocation_rules()
            .split(ctx.principal(), id, query.amount)
            .await?,
    ))
}
