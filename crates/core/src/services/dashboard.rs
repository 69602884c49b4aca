//! Developer mission control: developments, KPIs, activity feed.

use hestia_common::{AppError, AppResult};
use hestia_db::{
    entities::{activity_event, listing, listing::ListingStatus},
    repositories::{ActivityEventRepository, ListingRepository, SubscriptionRepository},
};
use serde::Serialize;

/// Dashboard KPI block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_listings: u64,
    pub draft_count: u64,
    pub pending_review_count: u64,
    pub published_count: u64,
    pub rejected_count: u64,
    pub total_views: i64,
    pub has_active_subscription: bool,
}

/// Activity feed entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    pub kind: activity_event::ActivityKind,
    pub message: String,
    pub created_at: String,
}

impl From<activity_event::Model> for ActivityEntry {
    fn from(e: activity_event::Model) -> Self {
        Self {
            id: e.id,
            listing_id: e.listing_id,
            kind: e.kind,
            message: e.message,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Dashboard service.
#[derive(Clone)]
pub struct DashboardService {
    listings: ListingRepository,
    activity: ActivityEventRepository,
    subscriptions: SubscriptionRepository,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(
        listings: ListingRepository,
        activity: ActivityEventRepository,
        subscriptions: SubscriptionRepository,
    ) -> Self {
        Self {
            listings,
            activity,
            subscriptions,
        }
    }

    /// A developer's listings, every status, newest first.
    pub async fn developments(
        &self,
        owner_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<listing::Model>> {
        self.listings
            .find_by_owner(owner_id, limit.min(100), until_id)
            .await
    }

    /// Delete one of the developer's own listings. Media and the queue entry
    /// cascade with the row.
    pub async fn delete_development(&self, owner_id: &str, listing_id: &str) -> AppResult<()> {
        let listing = self.listings.get_by_id(listing_id).await?;
        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Listing belongs to another account".to_string(),
            ));
        }

        self.listings.delete(listing_id).await
    }

    /// KPI block for mission control.
    pub async fn kpis(&self, owner_id: &str) -> AppResult<DashboardKpis> {
        let total_listings = self.listings.count_by_owner(owner_id).await?;
        let draft_count = self
            .listings
            .count_by_status(owner_id, ListingStatus::Draft)
            .await?;
        let pending_review_count = self
            .listings
            .count_by_status(owner_id, ListingStatus::PendingReview)
            .await?;
        let published_count = self
            .listings
            .count_by_status(owner_id, ListingStatus::Published)
            .await?;
        let rejected_count = self
            .listings
            .count_by_status(owner_id, ListingStatus::Rejected)
            .await?;
        let total_views = self.listings.total_views(owner_id).await?;

        let has_active_subscription = self
            .subscriptions
            .find_by_user(owner_id)
            .await?
            .is_some_and(|s| {
                matches!(
                    s.status,
                    hestia_db::entities::subscription::SubscriptionStatus::Active
                        | hestia_db::entities::subscription::SubscriptionStatus::Trialing
                )
            });

        Ok(DashboardKpis {
            total_listings,
            draft_count,
            pending_review_count,
            published_count,
            rejected_count,
            total_views,
            has_active_subscription,
        })
    }

    /// Recent activity feed.
    pub async fn activity_feed(
        &self,
        owner_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<ActivityEntry>> {
        Ok(self
            .activity
            .find_by_user(owner_id, limit.min(50), until_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Unseen-activity badge count. Best-effort: a failed lookup renders as
    /// zero rather than an error.
    pub async fn notification_count(&self, owner_id: &str, since_id: Option<&str>) -> u64 {
        let Some(since_id) = since_id else {
            return 0;
        };

        match self.activity.count_since(owner_id, since_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!(error = %e, "Notification count failed; showing zero");
                0
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_notification_count_degrades_to_zero() {
        // No appended results: the mock connection errors on query, which the
        // badge count must swallow.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = DashboardService::new(
            ListingRepository::new(Arc::clone(&db)),
            ActivityEventRepository::new(Arc::clone(&db)),
            SubscriptionRepository::new(db),
        );

        assert_eq!(service.notification_count("dev1", Some("act0")).await, 0);
        assert_eq!(service.notification_count("dev1", None).await, 0);
    }
}
