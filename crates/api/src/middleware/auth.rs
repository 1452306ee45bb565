//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use holdco_core::access::Principal;
use holdco_db::entities::users;
use holdco_db::repositories::principal_of;
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// The token only identifies the user: role, business unit and the active
/// flag are read from the stored user on every request. The resulting
/// [`RequestContext`] and the claims are stored in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized("Authorization header with Bearer token is required")
            .into_response();
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let user = match state.users().find_by_id(claims.user_id()).await {
        Ok(user) => user,
        Err(e) => return ApiError::from(e).into_response(),
    };
    let Some(ctx) = user.as_ref().and_then(RequestContext::for_user) else {
        warn!(user_id = %claims.user_id(), "token presented for missing or inactive user");
        return ApiError::unauthorized("User no longer exists or is inactive").into_response();
    };

    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// The caller of the current request, as currently stored.
///
/// ```ignore
/// async fn handler(ctx: RequestContext) -> ApiResult<Json<...>> {
///     repo.list(ctx.principal(), ...).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: Principal,
}

impl RequestContext {
    /// Builds the context for a stored user, or `None` if they may not log in.
    #[must_use]
    pub fn for_user(user: &users::Model) -> Option<Self> {
        user.is_active.then(|| Self {
            principal: principal_of(user),
        })
    }

    /// The authenticated principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
