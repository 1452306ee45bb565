//! Partner routes.
//!
//! Partners without a business unit are shared by every unit.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use holdco_db::entities::partners;
use holdco_db::entities::sea_orm_active_enums::PartnerType;
use holdco_db::repositories::{PartnerFilter, PartnerInput};
use holdco_shared::types::{BusinessUnitId, PaymentMethodId};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{default_true, non_blank};
use crate::extractors::{Path, Query, ValidatedJson};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the partner routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/partners", get(list_partners).post(create_partner))
        .route(
            "/partners/{id}",
            get(get_partner).put(update_partner).delete(delete_partner),
        )
}

/// Query parameters for listing partners.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPartnersQuery {
    /// Matches code, name or tax code.
    pub search: Option<String>,
    /// Supplier, customer or both.
    pub partner_type: Option<PartnerType>,
    /// Owning unit.
    pub business_unit_id: Option<Uuid>,
    /// Only active or inactive partners.
    pub active: Option<bool>,
}

/// Request body for creating or updating a partner.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRequest {
    /// Unique code.
    #[validate(length(min = 1, max = 32, message = "must be 1 to 32 characters"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    /// Supplier, customer or both.
    pub partner_type: PartnerType,
    /// Tax code, unique when present.
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub tax_code: Option<String>,
    /// Phone number.
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub phone: Option<String>,
    /// Contact email.
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Bank account details.
    pub bank_account: Option<String>,
    /// Owning unit; `None` shares the partner with every unit.
    pub business_unit_id: Option<Uuid>,
    /// Default payment method.
    pub payment_method_id: Option<Uuid>,
    /// Defaults to `true`.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<PartnerRequest> for PartnerInput {
    fn from(req: PartnerRequest) -> Self {
        Self {
            code: req.code.trim().to_string(),
            name: req.name.trim().to_string(),
            partner_type: req.partner_type,
            tax_code: non_blank(req.tax_code),
            phone: non_blank(req.phone),
            email: non_blank(req.email),
            address: non_blank(req.address),
            bank_account: non_blank(req.bank_account),
            business_unit_id: req.business_unit_id.map(BusinessUnitId::from_uuid),
            payment_method_id: req.payment_method_id.map(PaymentMethodId::from_uuid),
            is_active: req.is_active,
        }
    }
}

/// GET `/partners`
async fn list_partners(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListPartnersQuery>,
) -> ApiResult<Json<Vec<partners::Model>>> {
    let filter = PartnerFilter {
        search: non_blank(query.search),
        partner_type: query.partner_type,
        business_unit_id: query.business_unit_id.map(BusinessUnitId::from_uuid),
        active: query.active,
    };
    Ok(Json(state.partners().list(ctx.principal(), filter).await?))
}

/// GET `/partners/{id}`
async fn get_partner(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<partners::Model>> {
    Ok(Json(state.partners().get(ctx.principal(), id).await?))
}

/// POST `/partners`
async fn create_partner(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(payload): ValidatedJson<PartnerRequest>,
) -> ApiResult<(StatusCode, Json<partners::Model>)> {
    let partner = state
        .partners()
        .create(ctx.principal(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(partner)))
}

/// PUT `/partners/{id}`
async fn update_partner(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PartnerRequest>,
) -> ApiResult<Json<partners::Model>> {
    Ok(Json(
        state
            .partners()
            .update(ctx.principal(), id, payload.into())
            .await?,
    ))
}

/// DELETE `/partners/{id}`
async fn delete_partner(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.partners().delete(ctx.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
