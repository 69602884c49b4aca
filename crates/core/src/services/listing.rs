//! Listing service: draft persistence and public browse.
//!
//! Draft edits are last-write-wins; there is no version column. Concurrent
//! saves of the same draft overwrite each other silently.

use hestia_common::{AppError, AppResult};
use hestia_db::{
    entities::listing::{self, ApprovalStatus, ListingStatus, PropertyType},
    repositories::ListingRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::services::geocoding::GeocodingService;
use crate::services::wizard::DraftSnapshot;

/// Listing service.
#[derive(Clone)]
pub struct ListingService {
    listings: ListingRepository,
    geocoding: Option<GeocodingService>,
}

/// Response shape for a listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    pub action: listing::ListingAction,
    pub property_type: PropertyType,
    pub title: String,
    pub description: String,
    pub badges: serde_json::Value,
    pub details: serde_json::Value,
    pub pricing: serde_json::Value,
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub status: ListingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub view_count: i64,
    pub created_at: String,
}

impl From<listing::Model> for ListingResponse {
    fn from(l: listing::Model) -> Self {
        Self {
            id: l.id,
            owner_id: l.owner_id,
            brand_id: l.brand_id,
            action: l.action,
            property_type: l.property_type,
            title: l.title,
            description: l.description,
            badges: l.badges,
            details: l.details,
            pricing: l.pricing,
            address: l.address,
            city: l.city,
            province: l.province,
            postal_code: l.postal_code,
            latitude: l.latitude,
            longitude: l.longitude,
            status: l.status,
            approval_status: l.approval_status,
            rejection_reason: l.rejection_reason,
            is_published: l.is_published,
            published_at: l.published_at.map(|t| t.to_rfc3339()),
            view_count: l.view_count,
            created_at: l.created_at.to_rfc3339(),
        }
    }
}

/// Filters for the public browse surface.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseFilter {
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub limit: Option<u64>,
    pub until_id: Option<String>,
}

impl ListingService {
    /// Create a new listing service.
    #[must_use]
    pub const fn new(listings: ListingRepository, geocoding: Option<GeocodingService>) -> Self {
        Self {
            listings,
            geocoding,
        }
    }

    /// Persist a wizard draft, creating the row on first save.
    ///
    /// The draft must have at least the action and property type chosen; the
    /// remaining columns are denormalized from whatever the draft holds so
    /// dashboards can render in-progress listings.
    pub async fn save_draft(
        &self,
        owner_id: &str,
        listing_id: Option<&str>,
        snapshot: DraftSnapshot,
    ) -> AppResult<listing::Model> {
        let (Some(action), Some(property_type)) =
            (snapshot.draft.action, snapshot.draft.property_type)
        else {
            return Err(AppError::Validation(
                "Choose an action and property type before saving".to_string(),
            ));
        };

        let snapshot_json = serde_json::to_value(&snapshot)
            .map_err(|e| AppError::Internal(format!("Failed to serialize draft: {e}")))?;

        let details = snapshot
            .draft
            .details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to serialize details: {e}")))?
            .unwrap_or_else(|| serde_json::json!({}));
        let pricing = snapshot
            .draft
            .pricing
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Failed to serialize pricing: {e}")))?
            .unwrap_or_else(|| serde_json::json!({}));
        let badges = serde_json::to_value(&snapshot.draft.badges)
            .map_err(|e| AppError::Internal(format!("Failed to serialize badges: {e}")))?;

        let now = chrono::Utc::now();

        match listing_id {
            Some(id) => {
                let existing = self.listings.get_by_id(id).await?;
                if existing.owner_id != owner_id {
                    return Err(AppError::Forbidden(
                        "Listing belongs to another account".to_string(),
                    ));
                }
                if !matches!(
                    existing.status,
                    ListingStatus::Draft | ListingStatus::Rejected
                ) {
                    return Err(AppError::Conflict(
                        "Only drafts and rejected listings can be edited".to_string(),
                    ));
                }

                let mut model: listing::ActiveModel = existing.into();
                model.action = Set(action);
                model.property_type = Set(property_type);
                model.title = Set(snapshot.draft.title.clone());
                model.description = Set(snapshot.draft.description.clone());
                model.badges = Set(badges);
                model.details = Set(details);
                model.pricing = Set(pricing);
                model.draft_state = Set(Some(snapshot_json));
                model.address = Set(snapshot.draft.location.address.clone());
                model.city = Set(snapshot.draft.location.city.clone());
                model.province = Set(snapshot.draft.location.province.clone());
                model.postal_code = Set(snapshot.draft.location.postal_code.clone());
                model.latitude = Set(snapshot.draft.location.latitude);
                model.longitude = Set(snapshot.draft.location.longitude);
                model.updated_at = Set(Some(now.into()));

                self.listings.update(model).await
            }
            None => {
                let model = listing::ActiveModel {
                    id: Set(crate::generate_id()),
                    owner_id: Set(owner_id.to_string()),
                    brand_id: Set(None),
                    action: Set(action),
                    property_type: Set(property_type),
                    title: Set(snapshot.draft.title.clone()),
                    description: Set(snapshot.draft.description.clone()),
                    badges: Set(badges),
                    details: Set(details),
                    pricing: Set(pricing),
                    draft_state: Set(Some(snapshot_json)),
                    address: Set(snapshot.draft.location.address.clone()),
                    city: Set(snapshot.draft.location.city.clone()),
                    province: Set(snapshot.draft.location.province.clone()),
                    postal_code: Set(snapshot.draft.location.postal_code.clone()),
                    latitude: Set(snapshot.draft.location.latitude),
                    longitude: Set(snapshot.draft.location.longitude),
                    status: Set(ListingStatus::Draft),
                    approval_status: Set(None),
                    rejection_reason: Set(None),
                    is_published: Set(false),
                    published_at: Set(None),
                    view_count: Set(0),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };

                self.listings.create(model).await
            }
        }
    }

    /// Load the saved wizard snapshot for a draft.
    pub async fn load_draft(&self, owner_id: &str, listing_id: &str) -> AppResult<DraftSnapshot> {
        let listing = self.listings.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Listing belongs to another account".to_string(),
            ));
        }

        let state = listing.draft_state.ok_or_else(|| {
            AppError::NotFound(format!("No draft state for listing {listing_id}"))
        })?;

        serde_json::from_value(state)
            .map_err(|e| AppError::Internal(format!("Corrupt draft state: {e}")))
    }

    /// Fetch a listing, enforcing visibility.
    ///
    /// Unpublished listings are visible to their owner and to staff only.
    pub async fn get(
        &self,
        listing_id: &str,
        viewer: Option<&hestia_db::entities::user::Model>,
    ) -> AppResult<listing::Model> {
        let listing = self.listings.get_by_id(listing_id).await?;

        if listing.is_published {
            return Ok(listing);
        }

        let allowed = viewer.is_some_and(|u| {
            u.id == listing.owner_id || u.is_moderator || u.is_admin
        });
        if allowed {
            Ok(listing)
        } else {
            Err(AppError::ListingNotFound(listing_id.to_string()))
        }
    }

    /// Record a detail-page view.
    pub async fn record_view(&self, listing_id: &str) -> AppResult<()> {
        let listing = self.listings.get_by_id(listing_id).await?;
        let count = listing.view_count + 1;
        let mut model: listing::ActiveModel = listing.into();
        model.view_count = Set(count);
        self.listings.update(model).await?;
        Ok(())
    }

    /// Browse published listings.
    pub async fn browse(&self, filter: BrowseFilter) -> AppResult<Vec<listing::Model>> {
        let limit = filter.limit.unwrap_or(20).min(100);
        self.listings
            .find_published(
                filter.property_type,
                filter.city.as_deref(),
                limit,
                filter.until_id.as_deref(),
            )
            .await
    }

    /// Fill missing coordinates from the address, when geocoding is enabled.
    /// Failures are logged, never surfaced; coordinates are a nicety.
    pub async fn backfill_coordinates(&self, listing: &listing::Model) -> AppResult<()> {
        let Some(geocoding) = &self.geocoding else {
            return Ok(());
        };
        if listing.latitude.is_some() && listing.longitude.is_some() {
            return Ok(());
        }

        let query = format!("{}, {}", listing.address, listing.city);
        match geocoding.geocode(&query).await {
            Ok(Some(point)) => {
                let mut model: listing::ActiveModel = listing.clone().into();
                model.latitude = Set(Some(point.latitude));
                model.longitude = Set(Some(point.longitude));
                self.listings.update(model).await?;
            }
            Ok(None) => {
                tracing::debug!(listing_id = %listing.id, "Address did not geocode");
            }
            Err(e) => {
                tracing::warn!(listing_id = %listing.id, error = %e, "Geocoding failed");
            }
        }
        Ok(())
    }
}
