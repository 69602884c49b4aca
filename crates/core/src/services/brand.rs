//! Brand emulation: platform-owned marketing identities and seeded demo
//! listings. Super-admin only; role checks happen at the API layer and are
//! re-asserted here.

use hestia_common::{AppError, AppResult, IdGenerator};
use hestia_db::{
    entities::{
        brand_profile,
        listing::{self, ApprovalStatus, ListingStatus},
        user,
    },
    repositories::{BrandProfileRepository, ListingRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::services::wizard::SubmitListingInput;

/// Input for creating a brand profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrandInput {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub accent_color: Option<String>,
}

/// Input for updating a brand profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrandInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub accent_color: Option<String>,
    pub is_active: Option<bool>,
}

/// Response shape for a brand profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<brand_profile::Model> for BrandResponse {
    fn from(b: brand_profile::Model) -> Self {
        Self {
            id: b.id,
            name: b.name,
            slug: b.slug,
            description: b.description,
            logo_url: b.logo_url,
            website: b.website,
            accent_color: b.accent_color,
            is_active: b.is_active,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Turn a brand name into a URL slug.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn require_admin(actor: &user::Model) -> AppResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Brand emulation requires an admin account".to_string(),
        ))
    }
}

/// Brand emulation service.
#[derive(Clone)]
pub struct BrandService {
    brands: BrandProfileRepository,
    listings: ListingRepository,
    id_gen: IdGenerator,
}

impl BrandService {
    /// Create a new brand service.
    #[must_use]
    pub fn new(brands: BrandProfileRepository, listings: ListingRepository) -> Self {
        Self {
            brands,
            listings,
            id_gen: IdGenerator::new(),
        }
    }

    /// All brand profiles.
    pub async fn list(&self, actor: &user::Model) -> AppResult<Vec<brand_profile::Model>> {
        require_admin(actor)?;
        self.brands.list().await
    }

    /// Create a brand profile.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateBrandInput,
    ) -> AppResult<brand_profile::Model> {
        require_admin(actor)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Brand name is required".to_string()));
        }

        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Brand name must contain letters or digits".to_string(),
            ));
        }
        if self.brands.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A brand with slug '{slug}' exists"
            )));
        }

        let model = brand_profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            slug: Set(slug),
            description: Set(input.description),
            logo_url: Set(input.logo_url),
            website: Set(input.website),
            accent_color: Set(input.accent_color),
            is_active: Set(true),
            created_by: Set(actor.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.brands.create(model).await
    }

    /// Update a brand profile.
    pub async fn update(
        &self,
        actor: &user::Model,
        brand_id: &str,
        input: UpdateBrandInput,
    ) -> AppResult<brand_profile::Model> {
        require_admin(actor)?;

        let brand = self.brands.get_by_id(brand_id).await?;
        let mut model: brand_profile::ActiveModel = brand.into();

        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(logo_url) = input.logo_url {
            model.logo_url = Set(Some(logo_url));
        }
        if let Some(website) = input.website {
            model.website = Set(Some(website));
        }
        if let Some(accent_color) = input.accent_color {
            model.accent_color = Set(Some(accent_color));
        }
        if let Some(is_active) = input.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.brands.update(model).await
    }

    /// Delete a brand profile. Seeded listings keep running with a null brand.
    pub async fn delete(&self, actor: &user::Model, brand_id: &str) -> AppResult<()> {
        require_admin(actor)?;
        self.brands.delete(brand_id).await
    }

    /// Seed a demo listing while emulating a brand.
    ///
    /// Platform-owned demo content skips the review queue: it is created
    /// approved and live, attributed to the brand and owned by the acting
    /// admin.
    pub async fn seed_listing(
        &self,
        actor: &user::Model,
        brand_id: &str,
        input: SubmitListingInput,
    ) -> AppResult<listing::Model> {
        require_admin(actor)?;

        let brand = self.brands.get_by_id(brand_id).await?;
        if !brand.is_active {
            return Err(AppError::BadRequest(format!(
                "Brand '{}' is inactive",
                brand.name
            )));
        }

        let details = serde_json::to_value(&input.details)
            .map_err(|e| AppError::Internal(format!("Failed to serialize details: {e}")))?;
        let pricing = serde_json::to_value(&input.pricing)
            .map_err(|e| AppError::Internal(format!("Failed to serialize pricing: {e}")))?;
        let badges = serde_json::to_value(&input.badges)
            .map_err(|e| AppError::Internal(format!("Failed to serialize badges: {e}")))?;

        let now = chrono::Utc::now();
        let model = listing::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(actor.id.clone()),
            brand_id: Set(Some(brand.id)),
            action: Set(input.action),
            property_type: Set(input.property_type),
            title: Set(input.title),
            description: Set(input.description),
            badges: Set(badges),
            details: Set(details),
            pricing: Set(pricing),
            draft_state: Set(None),
            address: Set(input.location.address),
            city: Set(input.location.city),
            province: Set(input.location.province),
            postal_code: Set(input.location.postal_code),
            latitude: Set(input.location.latitude),
            longitude: Set(input.location.longitude),
            status: Set(ListingStatus::Published),
            approval_status: Set(Some(ApprovalStatus::Approved)),
            rejection_reason: Set(None),
            is_published: Set(true),
            published_at: Set(Some(now.into())),
            view_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let listing = self.listings.create(model).await?;
        tracing::info!(
            listing_id = %listing.id,
            brand_id = %brand_id,
            admin_id = %actor.id,
            "Seeded brand listing"
        );

        Ok(listing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn actor(is_admin: bool) -> user::Model {
        user::Model {
            id: "admin1".to_string(),
            username: "root".to_string(),
            username_lower: "root".to_string(),
            email: "root@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            token: None,
            name: None,
            phone: None,
            agency_name: None,
            agency_activated_at: None,
            stripe_customer_id: None,
            is_developer: false,
            is_moderator: true,
            is_admin,
            is_suspended: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Oak & Stone Living"), "oak-stone-living");
        assert_eq!(slugify("  Brand  42 "), "brand-42");
        assert_eq!(slugify("!!!"), "");
    }

    #[tokio::test]
    async fn test_moderator_cannot_emulate() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = BrandService::new(
            BrandProfileRepository::new(Arc::clone(&db)),
            ListingRepository::new(db),
        );

        let result = service.list(&actor(false)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
