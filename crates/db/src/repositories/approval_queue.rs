//! Approval queue repository.

use std::sync::Arc;

use crate::entities::{approval_queue, approval_queue::ApprovalStatus, ApprovalQueue};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Approval queue repository for database operations.
#[derive(Clone)]
pub struct ApprovalQueueRepository {
    db: Arc<DatabaseConnection>,
}

impl ApprovalQueueRepository {
    /// Create a new approval queue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Access the underlying connection (for service-level transactions).
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find a queue entry by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<approval_queue::Model>> {
        ApprovalQueue::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a queue entry by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<approval_queue::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ApprovalQueue: {id}")))
    }

    /// Find the queue entry for a listing (at most one exists).
    pub async fn find_by_listing(
        &self,
        listing_id: &str,
    ) -> AppResult<Option<approval_queue::Model>> {
        ApprovalQueue::find()
            .filter(approval_queue::Column::ListingId.eq(listing_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the queue entry for a listing using a caller-owned connection.
    pub async fn find_by_listing_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        listing_id: &str,
    ) -> AppResult<Option<approval_queue::Model>> {
        ApprovalQueue::find()
            .filter(approval_queue::Column::ListingId.eq(listing_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a queue entry on a caller-owned connection.
    pub async fn create_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: approval_queue::ActiveModel,
    ) -> AppResult<approval_queue::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a queue entry on a caller-owned connection.
    pub async fn update_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: approval_queue::ActiveModel,
    ) -> AppResult<approval_queue::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a queue entry.
    pub async fn update(
        &self,
        model: approval_queue::ActiveModel,
    ) -> AppResult<approval_queue::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List queue entries, newest submissions first, optionally by status.
    pub async fn list(
        &self,
        status: Option<ApprovalStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<approval_queue::Model>> {
        let mut query =
            ApprovalQueue::find().order_by_desc(approval_queue::Column::SubmittedAt);

        if let Some(s) = status {
            query = query.filter(approval_queue::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count entries awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        ApprovalQueue::find()
            .filter(approval_queue::Column::Status.eq(ApprovalStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_entry(id: &str, listing_id: &str, status: ApprovalStatus) -> approval_queue::Model {
        approval_queue::Model {
            id: id.to_string(),
            listing_id: listing_id.to_string(),
            status,
            submission_count: 1,
            compliance_results: serde_json::json!([]),
            reviewed_by: None,
            review_notes: None,
            submitted_at: Utc::now().into(),
            reviewed_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_pending() {
        let e1 = create_test_entry("queue1", "listing1", ApprovalStatus::Pending);
        let e2 = create_test_entry("queue2", "listing2", ApprovalStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1, e2]])
                .into_connection(),
        );

        let repo = ApprovalQueueRepository::new(db);
        let result = repo.list(Some(ApprovalStatus::Pending), 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_listing_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<approval_queue::Model>::new()])
                .into_connection(),
        );

        let repo = ApprovalQueueRepository::new(db);
        let result = repo.find_by_listing("listing1").await.unwrap();

        assert!(result.is_none());
    }
}
