//! Business unit routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use holdco_db::entities::business_units;
use holdco_db::repositories::BusinessUnitInput;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{default_true, non_blank};
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the business unit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/business-units", get(list_units).post(create_unit))
        .route(
            "/business-units/{id}",
            get(get_unit).put(update_unit).delete(delete_unit),
        )
}

/// Query parameters shared by the simple master data lists.
#[derive(Debug, Default, Deserialize)]
pub struct ActiveQuery {
    /// Only active (`true`) or inactive (`false`) rows.
    pub active: Option<bool>,
}

/// Request body for creating or updating a business unit.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnitRequest {
    /// Short unique code.
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub code: String,
    /// Unique display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<BusinessUnitRequest> for BusinessUnitInput {
    fn from(req: BusinessUnitRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            name: req.name.trim().to_string(),
            description: non_blank(req.description),
            is_active: req.is_active,
        }
    }
}

/// GET `/business-units`
async fn list_units(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<business_units::Model>>> {
    Ok(Json(
        state
            .business_units()
            .list(ctx.principal(), query.active)
            .await?,
    ))
}

/// GET `/business-units/{id}`
async fn get_unit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<business_units::Model>> {
    Ok(Json(state.business_units().get(ctx.principal(), id).await?))
}

/// POST `/business-units`
async fn create_unit(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<BusinessUnitRequest>,
) -> ApiResult<(StatusCode, Json<business_units::Model>)> {
    let unit = state
        .business_units()
        .create(ctx.principal(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// PUT `/business-units/{id}`
async fn update_unit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<BusinessUnitRequest>,
) -> ApiResult<Json<business_units::Model>> {
    Ok(Json(
        state
            .business_units()
            .update(ctx.principal(), id, payload.into())
            .await?,
    ))
}

/// DELETE `/business-units/{id}`
async fn delete_unit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.business_units().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
