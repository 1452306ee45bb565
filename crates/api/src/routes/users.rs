//! User management routes. CEO/Admin only.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use holdco_core::access::Role;
use holdco_db::entities::users;
use holdco_db::repositories::{CreateUserInput, UpdateUserInput};
use holdco_shared::types::BusinessUnitId;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::default_true;
use crate::extractors::{Path, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Request body for creating a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Login email.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 8, max = 128, message = "must be 8 to 128 characters"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub full_name: String,
    /// Role.
    pub role: Role,
    /// Home unit, required in practice for BU_LEAD and STAFF.
    pub business_unit_id: Option<Uuid>,
}

/// Request body for updating a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub full_name: String,
    /// Role.
    pub role: Role,
    /// Home unit.
    pub business_unit_id: Option<Uuid>,
    /// Whether the user may log in.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// New password, if changing it.
    #[validate(length(min = 8, max = 128, message = "must be 8 to 128 characters"))]
    pub password: Option<String>,
}

/// GET `/users`
async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> ApiResult<Json<Vec<users::Model>>> {
    Ok(Json(state.users().list(ctx.principal()).await?))
}

/// GET `/users/{id}`
async fn get_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<users::Model>> {
    Ok(Json(state.users().get(ctx.principal(), id).await?))
}

/// POST `/users`
async fn create_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    let input = CreateUserInput {
        email: payload.email,
        password: payload.password,
        full_name: payload.full_name.trim().to_string(),
        role: payload.role,
        business_unit_id: payload.business_unit_id.map(BusinessUnitId::from_uuid),
    };
    let user = state.users().create(ctx.principal(), input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT `/users/{id}`
async fn update_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<users::Model>> {
    let input = UpdateUserInput {
        full_name: payload.full_name.trim().to_string(),
        role: payload.role,
        business_unit_id: payload.business_unit_id.map(BusinessUnitId::from_uuid),
        is_active: payload.is_active,
        password: payload.password,
    };
    Ok(Json(state.users().update(ctx.principal(), id, input).await?))
}

/// DELETE `/users/{id}`
async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.users().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
