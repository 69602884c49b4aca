//! Listing media repository.

use std::sync::Arc;

use crate::entities::{listing_media, ListingMedia};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// Listing media repository for database operations.
#[derive(Clone)]
pub struct ListingMediaRepository {
    db: Arc<DatabaseConnection>,
}

impl ListingMediaRepository {
    /// Create a new listing media repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Access the underlying connection (for service-level transactions).
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find a media item by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<listing_media::Model>> {
        ListingMedia::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a media item by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<listing_media::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ListingMedia: {id}")))
    }

    /// All media for a listing, in gallery order.
    pub async fn find_by_listing(&self, listing_id: &str) -> AppResult<Vec<listing_media::Model>> {
        ListingMedia::find()
            .filter(listing_media::Column::ListingId.eq(listing_id))
            .order_by_asc(listing_media::Column::SortOrder)
            .order_by_asc(listing_media::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count media rows for a listing.
    pub async fn count_by_listing(&self, listing_id: &str) -> AppResult<u64> {
        ListingMedia::find()
            .filter(listing_media::Column::ListingId.eq(listing_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new media row.
    pub async fn create(
        &self,
        model: listing_media::ActiveModel,
    ) -> AppResult<listing_media::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a media row.
    pub async fn update(
        &self,
        model: listing_media::ActiveModel,
    ) -> AppResult<listing_media::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a media row.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let media = self.find_by_id(id).await?;
        if let Some(m) = media {
            m.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Clear the primary flag on every media row of a listing, inside a
    /// caller-owned transaction.
    pub async fn clear_primary(
        &self,
        txn: &DatabaseTransaction,
        listing_id: &str,
    ) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        ListingMedia::update_many()
            .col_expr(listing_media::Column::IsPrimary, Expr::value(false))
            .filter(listing_media::Column::ListingId.eq(listing_id))
            .filter(listing_media::Column::IsPrimary.eq(true))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Rewrite the sort order for a listing's media, inside a caller-owned
    /// transaction. `ordered_ids` index becomes the new `sort_order`.
    pub async fn apply_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        ordered_ids: &[String],
    ) -> AppResult<()> {
        for (position, id) in ordered_ids.iter().enumerate() {
            let model = listing_media::ActiveModel {
                id: Set(id.clone()),
                sort_order: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                ..Default::default()
            };
            model
                .update(conn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_media(id: &str, listing_id: &str, sort_order: i32) -> listing_media::Model {
        listing_media::Model {
            id: id.to_string(),
            listing_id: listing_id.to_string(),
            file_name: "photo.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size: 1024,
            storage_key: format!("2026/01/01/{id}.jpg"),
            url: format!("https://media.example.com/{id}.jpg"),
            sort_order,
            is_primary: sort_order == 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_listing_ordered() {
        let m1 = create_test_media("media1", "listing1", 0);
        let m2 = create_test_media("media2", "listing1", 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[m1, m2]])
                .into_connection(),
        );

        let repo = ListingMediaRepository::new(db);
        let result = repo.find_by_listing("listing1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result[0].is_primary);
    }
}
