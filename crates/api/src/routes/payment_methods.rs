//! Payment method routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use holdco_db::entities::payment_methods;
use holdco_db::repositories::PaymentMethodInput;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::business_units::ActiveQuery;
use super::{default_true, non_blank};
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the payment method routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-methods", get(list_methods).post(create_method))
        .route(
            "/payment-methods/{id}",
            get(get_method).put(update_method).delete(delete_method),
        )
}

/// Request body for creating or updating a payment method.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRequest {
    /// Unique name, e.g. `Cash`.
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<PaymentMethodRequest> for PaymentMethodInput {
    fn from(req: PaymentMethodRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: non_blank(req.description),
            is_active: req.is_active,
        }
    }
}

/// GET `/payment-methods`
async fn list_methods(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<payment_methods::Model>>> {
    Ok(Json(
        state
            .payment_methods()
            .list(ctx.principal(), query.active)
            .await?,
    ))
}

/// GET `/payment-methods/{id}`
async fn get_method(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<payment_methods::Model>> {
    Ok(Json(state.payment_methods().get(ctx.principal(), id).await?))
}

/// POST `/payment-methods`
async fn create_method(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<PaymentMethodRequest>,
) -> ApiResult<(StatusCode, Json<payment_methods::Model>)> {
    let method = state
        .payment_methods()
        .create(ctx.principal(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(method)))
}

/// PUT `/payment-methods/{id}`
async fn update_method(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PaymentMethodRequest>,
) -> ApiResult<Json<payment_methods::Model>> {
    Ok(Json(
        state
            .payment_methods()
            .update(ctx.principal(), id, payload.into())
            .await?,
    ))
}

/// DELETE `/payment-methods/{id}`
async fn delete_method(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.payment_methods().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
