//! Employee routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use holdco_db::entities::employees;
use holdco_db::repositories::{EmployeeFilter, EmployeeInput};
use holdco_shared::types::BusinessUnitId;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{default_true, non_blank};
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the employee routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

/// Query parameters for listing employees.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmployeesQuery {
    /// Matches code, name or email.
    pub search: Option<String>,
    /// Only this unit.
    pub business_unit_id: Option<Uuid>,
    /// Only active or inactive employees.
    pub active: Option<bool>,
}

/// Request body for creating or updating an employee.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    /// Unique code.
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub code: String,
    /// Full name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub full_name: String,
    /// Work email, unique when present.
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    /// Phone number.
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub phone: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Unit the employee works for.
    pub business_unit_id: Uuid,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<EmployeeRequest> for EmployeeInput {
    fn from(req: EmployeeRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            full_name: req.full_name.trim().to_string(),
            email: non_blank(req.email).map(|e| e.to_lowercase()),
            phone: non_blank(req.phone),
            position: non_blank(req.position),
            business_unit_id: BusinessUnitId::from_uuid(req.business_unit_id),
            is_active: req.is_active,
        }
    }
}

/// GET `/employees`
async fn list_employees(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListEmployeesQuery>,
) -> ApiResult<Json<Vec<employees::Model>>> {
    let filter = EmployeeFilter {
        search: non_blank(query.search),
        business_unit_id: query.business_unit_id.map(BusinessUnitId::from_uuid),
        active: query.active,
    };
    Ok(Json(state.employees().list(ctx.principal(), filter).await?))
}

/// GET `/employees/{id}`
async fn get_employee(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<employees::Model>> {
    Ok(Json(state.employees().get(ctx.principal(), id).await?))
}

/// POST `/employees`
async fn create_employee(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<EmployeeRequest>,
) -> ApiResult<(StatusCode, Json<employees::Model>)> {
    let employee = state
        .employees()
        .create(ctx.principal(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT `/employees/{id}`
async fn update_employee(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<EmployeeRequest>,
) -> ApiResult<Json<employees::Model>> {
    Ok(Json(
        state
            .employees()
            .update(ctx.principal(), id, payload.into())
            .await?,
    ))
}

/// DELETE `/employees/{id}`
async fn delete_employee(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.employees().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
