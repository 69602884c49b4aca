//! Brand profile repository.

use std::sync::Arc;

use crate::entities::{brand_profile, BrandProfile};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

/// Brand profile repository for database operations.
#[derive(Clone)]
pub struct BrandProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl BrandProfileRepository {
    /// Create a new brand profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a brand by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<brand_profile::Model>> {
        BrandProfile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a brand by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<brand_profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("BrandProfile: {id}")))
    }

    /// Find a brand by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<brand_profile::Model>> {
        BrandProfile::find()
            .filter(brand_profile::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All brands, name order.
    pub async fn list(&self) -> AppResult<Vec<brand_profile::Model>> {
        BrandProfile::find()
            .order_by_asc(brand_profile::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a brand.
    pub async fn create(&self, model: brand_profile::ActiveModel) -> AppResult<brand_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a brand.
    pub async fn update(&self, model: brand_profile::ActiveModel) -> AppResult<brand_profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a brand (listings keep a null brand reference).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let brand = self.find_by_id(id).await?;
        if let Some(b) = brand {
            b.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
