//! Activity log writes and queries.
//!
//! Writes go through [`record`], which takes the open database transaction of
//! the mutation it describes.

use chrono::Utc;
use holdco_core::access::{Action, Principal, Resource, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_shared::types::{PageRequest, PageResponse, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::activity_logs;

/// Filter options for listing activity logs.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    /// Filter by entity type.
    pub entity_type: Option<EntityKind>,
    /// Filter by entity id.
    pub entity_id: Option<Uuid>,
    /// Filter by actor.
    pub actor_id: Option<UserId>,
    /// Filter by action.
    pub action: Option<ActivityAction>,
}

/// Inserts one activity log row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    entry: ActivityEntry,
) -> Result<activity_logs::Model, DbErr> {
    activity_logs::ActiveModel {
        id: Set(Uuid::now_v7()),
        actor_id: Set(entry.actor_id.into_inner()),
        action: Set(entry.action.as_str().to_string()),
        entity_type: Set(entry.entity_type.as_str().to_string()),
        entity_id: Set(entry.entity_id),
        summary: Set(entry.summary),
        details: Set(entry.details),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// JSON snapshot of a model for before/after details.
pub(crate) fn snapshot<T: Serialize>(model: &T) -> Value {
    serde_json::to_value(model).unwrap_or(Value::Null)
}

/// Activity log repository.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    db: DatabaseConnection,
}

impl ActivityLogRepository {
    /// Creates a new activity log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists activity, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Access` for roles other than CEO/Admin, or a database error.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: ActivityLogFilter,
        page: PageRequest,
    ) -> Result<PageResponse<activity_logs::Model>, RepositoryError> {
        authorize(principal, &Resource::ActivityLog, Action::Read)?;

        let mut query = activity_logs::Entity::find();
        if let Some(entity_type) = filter.entity_type {
            query = query.filter(activity_logs::Column::EntityType.eq(entity_type.as_str()));
        }
        if let Some(entity_id) = filter.entity_id {
            query = query.filter(activity_logs::Column::EntityId.eq(entity_id));
        }
        if let Some(actor_id) = filter.actor_id {
            query = query.filter(activity_logs::Column::ActorId.eq(actor_id.into_inner()));
        }
        if let Some(action) = filter.action {
            query = query.filter(activity_logs::Column::Action.eq(action.as_str()));
        }

        let paginator = query
            .order_by_desc(activity_logs::Column::CreatedAt)
            .order_by_desc(activity_logs::Column::Id)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// History of one entity, oldest first. Same access rule as [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns `Access` for roles other than CEO/Admin, or a database error.
    pub async fn history(
        &self,
        principal: &Principal,
        entity_type: EntityKind,
        entity_id: Uuid,
    ) -> Result<Vec<activity_logs::Model>, RepositoryError> {
        authorize(principal, &Resource::ActivityLog, Action::Read)?;

        Ok(activity_logs::Entity::find()
            .filter(activity_logs::Column::EntityType.eq(entity_type.as_str()))
            .filter(activity_logs::Column::EntityId.eq(entity_id))
            .order_by_asc(activity_logs::Column::CreatedAt)
            .order_by_asc(activity_logs::Column::Id)
            .all(&self.db)
            .await?)
    }
}
