//! Authentication routes: login and the current user.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use holdco_core::access::Role;
use holdco_db::entities::users;
use holdco_shared::{LoginResponse, UserInfo};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{ApiError, ApiResult, AppState, RequestContext, extractors::ValidatedJson};

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Auth routes that need a token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User email.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// User password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role: Role::from(user.role).to_string(),
        business_unit_id: user.business_unit_id,
    }
}

/// POST `/auth/login` - Authenticate and return an access token.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let Some(user) = state
        .users()
        .verify_credentials(&payload.email, &payload.password)
        .await?
    else {
        info!(email = %payload.email, "failed login attempt");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let role = Role::from(user.role);
    let access_token =
        state
            .jwt_service
            .generate_access_token(user.id, role.as_str(), user.business_unit_id)?;

    info!(user_id = %user.id, %role, "user logged in");

    Ok(Json(LoginResponse {
        user: user_info(user),
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}

/// GET `/auth/me` - The user behind the token.
async fn me(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Json<UserInfo>> {
    let user = state
        .users()
        .find_by_id(ctx.principal().user_id.into_inner())
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::unauthorized("User no longer exists or is inactive"))?;
    Ok(Json(user_info(user)))
}
