//! Listing media: presigned uploads, gallery order, primary flag.
//!
//! Upload bytes go straight from the client to storage via a presigned PUT;
//! the server only issues the target and records the result. The at-most-one
//! primary invariant is kept by clearing and setting the flag inside one
//! transaction.

use std::sync::Arc;

use hestia_common::{
    generate_storage_key, AppError, AppResult, IdGenerator, PresignedUpload, StorageBackend,
};
use hestia_db::{
    entities::{activity_event::ActivityKind, listing_media},
    repositories::{ActivityEventRepository, ListingMediaRepository, ListingRepository},
};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};

/// Maximum media items per listing.
pub const MAX_MEDIA_PER_LISTING: u64 = 30;

/// Maximum upload size accepted at presign time (25MB).
pub const MAX_MEDIA_SIZE: i64 = 25 * 1024 * 1024;

/// Accepted upload content types.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// Input for recording a completed upload.
#[derive(Debug)]
pub struct AttachMediaInput {
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
}

/// Media service.
#[derive(Clone)]
pub struct MediaService {
    media: ListingMediaRepository,
    listings: ListingRepository,
    activity: ActivityEventRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(
        media: ListingMediaRepository,
        listings: ListingRepository,
        activity: ActivityEventRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            media,
            listings,
            activity,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    async fn owned_listing(
        &self,
        owner_id: &str,
        listing_id: &str,
    ) -> AppResult<hestia_db::entities::listing::Model> {
        let listing = self.listings.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Listing belongs to another account".to_string(),
            ));
        }
        Ok(listing)
    }

    /// Issue a presigned PUT target for a new media file.
    pub async fn presign(
        &self,
        owner_id: &str,
        listing_id: &str,
        file_name: &str,
        content_type: &str,
        size: i64,
    ) -> AppResult<PresignedUpload> {
        self.owned_listing(owner_id, listing_id).await?;

        if size <= 0 {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }
        if size > MAX_MEDIA_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {MAX_MEDIA_SIZE} bytes"
            )));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(AppError::BadRequest(format!(
                "Unsupported content type: {content_type}"
            )));
        }

        let count = self.media.count_by_listing(listing_id).await?;
        if count >= MAX_MEDIA_PER_LISTING {
            return Err(AppError::BadRequest(format!(
                "A listing can have at most {MAX_MEDIA_PER_LISTING} media items"
            )));
        }

        let key = generate_storage_key(listing_id, file_name);
        self.storage.presign_put(&key, content_type).await
    }

    /// Record an upload the client finished PUTting to storage.
    ///
    /// The first media item on a listing becomes its primary image.
    pub async fn attach(
        &self,
        owner_id: &str,
        listing_id: &str,
        input: AttachMediaInput,
    ) -> AppResult<listing_media::Model> {
        self.owned_listing(owner_id, listing_id).await?;

        let existing = self.media.count_by_listing(listing_id).await?;
        if existing >= MAX_MEDIA_PER_LISTING {
            return Err(AppError::BadRequest(format!(
                "A listing can have at most {MAX_MEDIA_PER_LISTING} media items"
            )));
        }

        let model = listing_media::ActiveModel {
            id: Set(self.id_gen.generate()),
            listing_id: Set(listing_id.to_string()),
            file_name: Set(input.file_name),
            content_type: Set(input.content_type),
            size: Set(input.size),
            storage_key: Set(input.storage_key.clone()),
            url: Set(self.storage.public_url(&input.storage_key)),
            sort_order: Set(i32::try_from(existing).unwrap_or(i32::MAX)),
            is_primary: Set(existing == 0),
            created_at: Set(chrono::Utc::now().into()),
        };

        let media = self.media.create(model).await?;

        let activity = hestia_db::entities::activity_event::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(owner_id.to_string()),
            listing_id: Set(Some(listing_id.to_string())),
            kind: Set(ActivityKind::MediaUploaded),
            message: Set(format!("Uploaded {}", media.file_name)),
            created_at: Set(chrono::Utc::now().into()),
        };
        if let Err(e) = self.activity.create(activity).await {
            tracing::warn!(error = %e, "Failed to record activity event");
        }

        Ok(media)
    }

    /// All media for a listing, gallery order.
    pub async fn list(&self, listing_id: &str) -> AppResult<Vec<listing_media::Model>> {
        self.media.find_by_listing(listing_id).await
    }

    /// Make one media item the primary image, clearing any other flag in the
    /// same transaction.
    pub async fn set_primary(
        &self,
        owner_id: &str,
        media_id: &str,
    ) -> AppResult<listing_media::Model> {
        let media = self.media.get_by_id(media_id).await?;
        self.owned_listing(owner_id, &media.listing_id).await?;

        let txn = self
            .media
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.media.clear_primary(&txn, &media.listing_id).await?;

        let mut model: listing_media::ActiveModel = media.into();
        model.is_primary = Set(true);
        let media = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(media)
    }

    /// Rewrite the gallery order. `ordered_ids` must be a permutation of the
    /// listing's media IDs.
    pub async fn reorder(
        &self,
        owner_id: &str,
        listing_id: &str,
        ordered_ids: &[String],
    ) -> AppResult<Vec<listing_media::Model>> {
        self.owned_listing(owner_id, listing_id).await?;

        let current = self.media.find_by_listing(listing_id).await?;

        let mut expected: Vec<&str> = current.iter().map(|m| m.id.as_str()).collect();
        expected.sort_unstable();
        let mut given: Vec<&str> = ordered_ids.iter().map(String::as_str).collect();
        given.sort_unstable();
        if expected != given {
            return Err(AppError::BadRequest(
                "Order must contain exactly the listing's media IDs".to_string(),
            ));
        }

        let txn = self
            .media
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        self.media.apply_order(&txn, ordered_ids).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.media.find_by_listing(listing_id).await
    }

    /// Delete a media item; the stored object is removed best-effort.
    pub async fn delete(&self, owner_id: &str, media_id: &str) -> AppResult<()> {
        let media = self.media.get_by_id(media_id).await?;
        self.owned_listing(owner_id, &media.listing_id).await?;

        self.media.delete(media_id).await?;

        if let Err(e) = self.storage.delete(&media.storage_key).await {
            tracing::warn!(
                storage_key = %media.storage_key,
                error = %e,
                "Failed to delete stored object"
            );
        }

        // Keep a primary image around if other media remain.
        if media.is_primary {
            let remaining = self.media.find_by_listing(&media.listing_id).await?;
            if let Some(first) = remaining.into_iter().next() {
                let mut model: listing_media::ActiveModel = first.into();
                model.is_primary = Set(true);
                self.media.update(model).await?;
            }
        }

        Ok(())
    }

    /// Store bytes for a local direct upload (the dev-mode stand-in for S3).
    pub async fn store_direct(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<String> {
        if key.contains("..") || key.starts_with('/') {
            return Err(AppError::BadRequest("Invalid storage key".to_string()));
        }

        let stored = self.storage.store(key, data, content_type).await?;
        Ok(stored.url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_content_types_cover_images() {
        assert!(ALLOWED_CONTENT_TYPES.contains(&"image/jpeg"));
        assert!(!ALLOWED_CONTENT_TYPES.contains(&"video/mp4"));
    }
}
