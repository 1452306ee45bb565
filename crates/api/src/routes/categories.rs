//! Transaction category routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use holdco_core::transaction::TransactionType;
use holdco_db::entities::categories;
use holdco_db::repositories::{CategoryFilter, CategoryInput};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{default_true, non_blank};
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// Query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    /// Only categories for this transaction type.
    pub transaction_type: Option<TransactionType>,
    /// Only active or inactive categories.
    pub active: Option<bool>,
}

/// Request body for creating or updating a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    /// Unique code, e.g. `EXP-RENT`.
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Transaction type the category is used for.
    pub transaction_type: TransactionType,
    /// Optional description.
    pub description: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            name: req.name.trim().to_string(),
            transaction_type: req.transaction_type,
            description: non_blank(req.description),
            is_active: req.is_active,
        }
    }
}

/// GET `/categories`
async fn list_categories(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListCategoriesQuery>,
) -> ApiResult<Json<Vec<categories::Model>>> {
    let filter = CategoryFilter {
        transaction_type: query.transaction_type,
        active: query.active,
    };
    Ok(Json(state.categories().list(ctx.principal(), filter).await?))
}

/// GET `/categories/{id}`
async fn get_category(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<categories::Model>> {
    Ok(Json(state.categories().get(ctx.principal(), id).await?))
}

/// POST `/categories`
async fn create_category(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<categories::Model>)> {
    let category = state
        .categories()
        .create(ctx.principal(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT `/categories/{id}`
async fn update_category(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> ApiResult<Json<categories::Model>> {
    Ok(Json(
        state
            .categories()
            .update(ctx.principal(), id, payload.into())
            .await?,
    ))
}

/// DELETE `/categories/{id}`
async fn delete_category(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.categories().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
