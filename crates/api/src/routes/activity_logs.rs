//! Activity log routes. CEO/Admin only.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use holdco_core::audit::{ActivityAction, EntityKind};
use holdco_db::entities::activity_logs;
use holdco_db::repositories::ActivityLogFilter;
use holdco_shared::types::{PageRequest, PageResponse, UserId};
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::{Path, Query};
use crate::{ApiResult, AppState, RequestContext};

/// Creates the activity log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activity-logs", get(list_activity))
        .route("/activity-logs/{entity_type}/{entity_id}", get(entity_history))
}

/// Query parameters for listing activity.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActivityQuery {
    /// e.g. `TRANSACTION`, `PARTNER`.
    pub entity_type: Option<EntityKind>,
    /// One record.
    pub entity_id: Option<Uuid>,
    /// Who acted.
    pub actor_id: Option<Uuid>,
    /// e.g. `APPROVE`.
    pub action: Option<ActivityAction>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// GET `/activity-logs` - Newest first.
async fn list_activity(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListActivityQuery>,
) -> ApiResult<Json<PageResponse<activity_logs::Model>>> {
    let filter = ActivityLogFilter {
        entity_type: query.entity_type,
        entity_id: query.entity_id,
        actor_id: query.actor_id.map(UserId::from_uuid),
        action: query.action,
    };
    let page = PageRequest::new(query.page, query.per_page);
    Ok(Json(
        state
            .activity_logs()
            .list(ctx.principal(), filter, page)
            .await?,
    ))
}

/// GET `/activity-logs/{entityType}/{entityId}` - One record's history, oldest first.
async fn entity_history(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((entity_type, entity_id)): Path<(EntityKind, Uuid)>,
) -> ApiResult<Json<Vec<activity_logs::Model>>> {
    Ok(Json(
        state
            .activity_logs()
            .history(ctx.principal(), entity_type, entity_id)
            .await?,
    ))
}
