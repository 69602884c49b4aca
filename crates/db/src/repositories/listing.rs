//! Listing repository.

use std::sync::Arc;

use crate::entities::{
    listing,
    listing::{ListingStatus, PropertyType},
    Listing,
};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Listing repository for database operations.
#[derive(Clone)]
pub struct ListingRepository {
    db: Arc<DatabaseConnection>,
}

impl ListingRepository {
    /// Create a new listing repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a listing by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<listing::Model>> {
        Listing::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a listing by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<listing::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ListingNotFound(id.to_string()))
    }

    /// Create a new listing.
    pub async fn create(&self, model: listing::ActiveModel) -> AppResult<listing::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a listing.
    pub async fn update(&self, model: listing::ActiveModel) -> AppResult<listing::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a listing (media and queue entries cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let listing = self.find_by_id(id).await?;
        if let Some(l) = listing {
            l.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get listings for an owner (paginated, newest first).
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<listing::Model>> {
        let mut query = Listing::find()
            .filter(listing::Column::OwnerId.eq(owner_id))
            .order_by_desc(listing::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(listing::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get published listings for the public browse surface.
    pub async fn find_published(
        &self,
        property_type: Option<PropertyType>,
        city: Option<&str>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<listing::Model>> {
        let mut query = Listing::find()
            .filter(listing::Column::IsPublished.eq(true))
            .order_by_desc(listing::Column::Id);

        if let Some(pt) = property_type {
            query = query.filter(listing::Column::PropertyType.eq(pt));
        }

        if let Some(c) = city {
            query = query.filter(listing::Column::City.eq(c));
        }

        if let Some(id) = until_id {
            query = query.filter(listing::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count an owner's listings with a given status.
    pub async fn count_by_status(&self, owner_id: &str, status: ListingStatus) -> AppResult<u64> {
        Listing::find()
            .filter(listing::Column::OwnerId.eq(owner_id))
            .filter(listing::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all listings an owner has.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Listing::find()
            .filter(listing::Column::OwnerId.eq(owner_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of detail-page views across an owner's listings.
    pub async fn total_views(&self, owner_id: &str) -> AppResult<i64> {
        use sea_orm::FromQueryResult;

        #[derive(FromQueryResult)]
        struct SumResult {
            total: Option<i64>,
        }

        let result = Listing::find()
            .filter(listing::Column::OwnerId.eq(owner_id))
            .select_only()
            .column_as(listing::Column::ViewCount.sum(), "total")
            .into_model::<SumResult>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.and_then(|r| r.total).unwrap_or(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::listing::{ApprovalStatus, ListingAction};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_listing(id: &str, owner_id: &str) -> listing::Model {
        listing::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            brand_id: None,
            action: ListingAction::Sell,
            property_type: PropertyType::House,
            title: "Three-bed family home".to_string(),
            description: "Sunny corner plot".to_string(),
            badges: serde_json::json!([]),
            details: serde_json::json!({"type": "house"}),
            pricing: serde_json::json!({"action": "sell", "price": 2_500_000}),
            draft_state: None,
            address: "12 Oak Lane".to_string(),
            city: "Cape Town".to_string(),
            province: None,
            postal_code: None,
            latitude: None,
            longitude: None,
            status: ListingStatus::Draft,
            approval_status: None::<ApprovalStatus>,
            rejection_reason: None,
            is_published: false,
            published_at: None,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_owner() {
        let l1 = create_test_listing("listing1", "dev1");
        let l2 = create_test_listing("listing2", "dev1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[l1, l2]])
                .into_connection(),
        );

        let repo = ListingRepository::new(db);
        let result = repo.find_by_owner("dev1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<listing::Model>::new()])
                .into_connection(),
        );

        let repo = ListingRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ListingNotFound(_))));
    }
}
