//! Activity event repository.

use std::sync::Arc;

use crate::entities::{activity_event, ActivityEvent};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Activity event repository for database operations.
#[derive(Clone)]
pub struct ActivityEventRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityEventRepository {
    /// Create a new activity event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record an activity event.
    pub async fn create(
        &self,
        model: activity_event::ActiveModel,
    ) -> AppResult<activity_event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recent events for a user's feed, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<activity_event::Model>> {
        let mut query = ActivityEvent::find()
            .filter(activity_event::Column::UserId.eq(user_id))
            .order_by_desc(activity_event::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(activity_event::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events newer than a given ID (best-effort notification badge).
    pub async fn count_since(&self, user_id: &str, since_id: &str) -> AppResult<u64> {
        ActivityEvent::find()
            .filter(activity_event::Column::UserId.eq(user_id))
            .filter(activity_event::Column::Id.gt(since_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
