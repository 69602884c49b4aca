//! Listing approval workflow: submit, review, publish.
//!
//! The queue keeps one row per listing. A resubmission after rejection
//! re-opens that row (pending again, reviewer fields cleared) instead of
//! inserting a second one, so there is never more than one open entry for a
//! listing. Submit and review each run as a single transaction across the
//! listing and its queue row.

use std::sync::Arc;

use hestia_common::{AppError, AppResult};
use hestia_db::{
    entities::{
        activity_event::ActivityKind,
        approval_queue,
        listing::{self, ApprovalStatus, ListingStatus},
    },
    repositories::{
        ActivityEventRepository, ApprovalQueueRepository, ListingRepository, UserRepository,
    },
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::services::email::{EmailService, ListingDecisionEmail};
use crate::services::wizard::SubmitListingInput;

/// Reviewer decision on a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// Result of one automated compliance check, stored on the queue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn check(name: &str, passed: bool, note: Option<String>) -> ComplianceCheck {
    ComplianceCheck {
        name: name.to_string(),
        passed,
        note,
    }
}

/// Automated checks run at submit time. Advisory: results are recorded for
/// the reviewer, they do not block submission.
#[must_use]
pub fn run_compliance_checks(input: &SubmitListingInput) -> Vec<ComplianceCheck> {
    use crate::services::wizard::PricingTerms;

    let amount_ok = match &input.pricing {
        PricingTerms::Sell { price, .. } => *price > 0,
        PricingTerms::Rent { monthly_rent, .. } => *monthly_rent > 0,
        PricingTerms::Auction { starting_bid, .. } => *starting_bid > 0,
    };

    vec![
        check("title_length", input.title.len() >= 10, None),
        check(
            "description_length",
            input.description.len() >= 40,
            None,
        ),
        check("pricing_positive", amount_ok, None),
        check(
            "address_present",
            !input.location.address.trim().is_empty(),
            None,
        ),
        check(
            "media_attached",
            !input.media.is_empty(),
            input
                .media
                .is_empty()
                .then(|| "Listings with photos perform better".to_string()),
        ),
    ]
}

/// Approval workflow service.
#[derive(Clone)]
pub struct ApprovalService {
    db: Arc<DatabaseConnection>,
    listings: ListingRepository,
    queue: ApprovalQueueRepository,
    activity: ActivityEventRepository,
    users: UserRepository,
    email: EmailService,
}

impl ApprovalService {
    /// Create a new approval service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        listings: ListingRepository,
        queue: ApprovalQueueRepository,
        activity: ActivityEventRepository,
        users: UserRepository,
        email: EmailService,
    ) -> Self {
        Self {
            db,
            listings,
            queue,
            activity,
            users,
            email,
        }
    }

    /// Submit a listing for review.
    ///
    /// Freezes the submitted payload onto the listing row, moves it to
    /// `pending_review`, and upserts the queue entry. Submitting an already
    /// pending listing refreshes the same entry; submitting after a rejection
    /// re-opens it.
    pub async fn submit(
        &self,
        owner_id: &str,
        listing_id: &str,
        input: SubmitListingInput,
    ) -> AppResult<(listing::Model, approval_queue::Model)> {
        let listing = self.listings.get_by_id(listing_id).await?;

        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Listing belongs to another account".to_string(),
            ));
        }
        if matches!(listing.status, ListingStatus::Published | ListingStatus::Archived) {
            return Err(AppError::Conflict(format!(
                "Listing cannot be submitted from status {:?}",
                listing.status
            )));
        }
        if listing.approval_status == Some(ApprovalStatus::Approved) {
            return Err(AppError::Conflict(
                "Listing is already approved".to_string(),
            ));
        }

        let checks = run_compliance_checks(&input);
        let compliance = serde_json::to_value(&checks)
            .map_err(|e| AppError::Internal(format!("Failed to serialize checks: {e}")))?;

        let details = serde_json::to_value(&input.details)
            .map_err(|e| AppError::Internal(format!("Failed to serialize details: {e}")))?;
        let pricing = serde_json::to_value(&input.pricing)
            .map_err(|e| AppError::Internal(format!("Failed to serialize pricing: {e}")))?;
        let badges = serde_json::to_value(&input.badges)
            .map_err(|e| AppError::Internal(format!("Failed to serialize badges: {e}")))?;

        let now = chrono::Utc::now();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Upsert the queue entry: one row per listing.
        let existing = self.queue.find_by_listing_on(&txn, listing_id).await?;
        let entry = match existing {
            Some(entry) => {
                let submissions = entry.submission_count + 1;
                let mut model: approval_queue::ActiveModel = entry.into();
                model.status = Set(ApprovalStatus::Pending);
                model.submission_count = Set(submissions);
                model.compliance_results = Set(compliance);
                model.reviewed_by = Set(None);
                model.review_notes = Set(None);
                model.submitted_at = Set(now.into());
                model.reviewed_at = Set(None);
                self.queue.update_on(&txn, model).await?
            }
            None => {
                let model = approval_queue::ActiveModel {
                    id: Set(crate::generate_id()),
                    listing_id: Set(listing_id.to_string()),
                    status: Set(ApprovalStatus::Pending),
                    submission_count: Set(1),
                    compliance_results: Set(compliance),
                    reviewed_by: Set(None),
                    review_notes: Set(None),
                    submitted_at: Set(now.into()),
                    reviewed_at: Set(None),
                };
                self.queue.create_on(&txn, model).await?
            }
        };

        // Freeze the submitted payload onto the listing.
        let mut model: listing::ActiveModel = listing.into();
        model.action = Set(input.action);
        model.property_type = Set(input.property_type);
        model.title = Set(input.title.clone());
        model.description = Set(input.description.clone());
        model.badges = Set(badges);
        model.details = Set(details);
        model.pricing = Set(pricing);
        model.draft_state = Set(None);
        model.address = Set(input.location.address.clone());
        model.city = Set(input.location.city.clone());
        model.province = Set(input.location.province.clone());
        model.postal_code = Set(input.location.postal_code.clone());
        model.latitude = Set(input.location.latitude);
        model.longitude = Set(input.location.longitude);
        model.status = Set(ListingStatus::PendingReview);
        model.approval_status = Set(Some(ApprovalStatus::Pending));
        model.rejection_reason = Set(None);
        model.updated_at = Set(Some(now.into()));

        let listing = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.record_activity(
            owner_id,
            Some(listing_id),
            ActivityKind::ListingSubmitted,
            format!("\"{}\" submitted for review", listing.title),
        )
        .await;

        Ok((listing, entry))
    }

    /// Review a pending queue entry.
    pub async fn review(
        &self,
        reviewer_id: &str,
        queue_id: &str,
        decision: ReviewDecision,
        notes: Option<&str>,
    ) -> AppResult<approval_queue::Model> {
        let entry = self.queue.get_by_id(queue_id).await?;

        if entry.status != ApprovalStatus::Pending {
            return Err(AppError::Conflict(
                "Submission has already been reviewed".to_string(),
            ));
        }

        let listing = self.listings.get_by_id(&entry.listing_id).await?;

        let status = match decision {
            ReviewDecision::Approved => ApprovalStatus::Approved,
            ReviewDecision::Rejected => ApprovalStatus::Rejected,
        };
        let now = chrono::Utc::now();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut entry_model: approval_queue::ActiveModel = entry.into();
        entry_model.status = Set(status);
        entry_model.reviewed_by = Set(Some(reviewer_id.to_string()));
        entry_model.review_notes = Set(notes.map(String::from));
        entry_model.reviewed_at = Set(Some(now.into()));
        let entry = self.queue.update_on(&txn, entry_model).await?;

        let owner_id = listing.owner_id.clone();
        let title = listing.title.clone();
        let mut listing_model: listing::ActiveModel = listing.into();
        listing_model.approval_status = Set(Some(status));
        match decision {
            ReviewDecision::Approved => {
                listing_model.status = Set(ListingStatus::Approved);
                listing_model.rejection_reason = Set(None);
            }
            ReviewDecision::Rejected => {
                listing_model.status = Set(ListingStatus::Rejected);
                listing_model.rejection_reason = Set(notes.map(String::from));
            }
        }
        listing_model.updated_at = Set(Some(now.into()));
        listing_model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let kind = match decision {
            ReviewDecision::Approved => ActivityKind::ListingApproved,
            ReviewDecision::Rejected => ActivityKind::ListingRejected,
        };
        let message = match decision {
            ReviewDecision::Approved => format!("\"{title}\" was approved"),
            ReviewDecision::Rejected => format!("\"{title}\" was rejected"),
        };
        self.record_activity(&owner_id, Some(&entry.listing_id), kind, message)
            .await;

        self.notify_owner(&owner_id, &title, decision, notes).await;

        Ok(entry)
    }

    /// Publish an approved listing.
    ///
    /// `published_at` is set here and only here, keeping it non-null exactly
    /// for published listings.
    pub async fn publish(&self, actor_id: &str, listing_id: &str) -> AppResult<listing::Model> {
        let listing = self.listings.get_by_id(listing_id).await?;

        if listing.approval_status != Some(ApprovalStatus::Approved) {
            return Err(AppError::Conflict(
                "Only approved listings can be published".to_string(),
            ));
        }
        if listing.is_published {
            return Ok(listing);
        }

        let now = chrono::Utc::now();
        let owner_id = listing.owner_id.clone();
        let title = listing.title.clone();

        let mut model: listing::ActiveModel = listing.into();
        model.status = Set(ListingStatus::Published);
        model.is_published = Set(true);
        model.published_at = Set(Some(now.into()));
        model.updated_at = Set(Some(now.into()));

        let listing = self.listings.update(model).await?;

        tracing::info!(listing_id = %listing.id, actor_id = %actor_id, "Listing published");
        self.record_activity(
            &owner_id,
            Some(listing_id),
            ActivityKind::ListingPublished,
            format!("\"{title}\" is now live"),
        )
        .await;

        Ok(listing)
    }

    /// Archive a published listing, clearing the publication flags.
    pub async fn archive(&self, owner_id: &str, listing_id: &str) -> AppResult<listing::Model> {
        let listing = self.listings.get_by_id(listing_id).await?;

        if listing.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Listing belongs to another account".to_string(),
            ));
        }

        let mut model: listing::ActiveModel = listing.into();
        model.status = Set(ListingStatus::Archived);
        model.is_published = Set(false);
        model.published_at = Set(None);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.listings.update(model).await
    }

    /// List queue entries for the review dashboard.
    pub async fn list_queue(
        &self,
        status: Option<ApprovalStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<approval_queue::Model>> {
        self.queue.list(status, limit.min(100), offset).await
    }

    /// Count entries awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.queue.count_pending()
            .await
    }

    async fn record_activity(
        &self,
        user_id: &str,
        listing_id: Option<&str>,
        kind: ActivityKind,
        message: String,
    ) {
        let model = hestia_db::entities::activity_event::ActiveModel {
            id: Set(crate::generate_id()),
            user_id: Set(user_id.to_string()),
            listing_id: Set(listing_id.map(String::from)),
            kind: Set(kind),
            message: Set(message),
            created_at: Set(chrono::Utc::now().into()),
        };

        if let Err(e) = self.activity.create(model).await {
            tracing::warn!(error = %e, "Failed to record activity event");
        }
    }

    async fn notify_owner(
        &self,
        owner_id: &str,
        title: &str,
        decision: ReviewDecision,
        notes: Option<&str>,
    ) {
        if !self.email.is_enabled() {
            return;
        }

        let owner = match self.users.find_by_id(owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load owner for review notification");
                return;
            }
        };

        let email = ListingDecisionEmail {
            to: owner.email,
            listing_title: title.to_string(),
            approved: decision == ReviewDecision::Approved,
            reason: notes.map(String::from),
        };

        if let Err(e) = self.email.send_listing_decision(email).await {
            tracing::warn!(error = %e, "Failed to send review notification");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::wizard::{LocationFields, PricingTerms, PropertyDetails};
    use chrono::Utc;
    use hestia_db::entities::listing::{ListingAction, PropertyType};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn submit_input() -> SubmitListingInput {
        SubmitListingInput {
            action: ListingAction::Rent,
            property_type: PropertyType::Apartment,
            badges: vec![],
            title: "Sunny two-bed near the promenade".into(),
            description:
                "Bright two-bedroom apartment with sea glimpses, close to the beachfront.".into(),
            details: PropertyDetails::Apartment {
                bedrooms: 2,
                bathrooms: 1,
                floor_area_sqm: 78,
                floor: Some(3),
                has_parking: true,
                is_furnished: false,
            },
            pricing: PricingTerms::Rent {
                monthly_rent: 12_000,
                deposit: 12_000,
                lease_months: Some(12),
            },
            location: LocationFields {
                address: "7 Marine Drive".into(),
                city: "Durban".into(),
                province: None,
                postal_code: None,
                latitude: None,
                longitude: None,
            },
            media: vec![],
        }
    }

    fn draft_listing(id: &str, owner: &str, status: ListingStatus) -> listing::Model {
        listing::Model {
            id: id.to_string(),
            owner_id: owner.to_string(),
            brand_id: None,
            action: ListingAction::Rent,
            property_type: PropertyType::Apartment,
            title: "Sunny two-bed near the promenade".into(),
            description: "Bright two-bedroom apartment".into(),
            badges: serde_json::json!([]),
            details: serde_json::json!({}),
            pricing: serde_json::json!({}),
            draft_state: None,
            address: "7 Marine Drive".into(),
            city: "Durban".into(),
            province: None,
            postal_code: None,
            latitude: None,
            longitude: None,
            status,
            approval_status: match status {
                ListingStatus::Rejected => Some(ApprovalStatus::Rejected),
                ListingStatus::PendingReview => Some(ApprovalStatus::Pending),
                _ => None,
            },
            rejection_reason: None,
            is_published: false,
            published_at: None,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn queue_entry(id: &str, listing_id: &str, status: ApprovalStatus) -> approval_queue::Model {
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

    fn service(db: MockDatabase) -> ApprovalService {
        let db = Arc::new(db.into_connection());
        ApprovalService::new(
            Arc::clone(&db),
            ListingRepository::new(Arc::clone(&db)),
            ApprovalQueueRepository::new(Arc::clone(&db)),
            ActivityEventRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            EmailService::new(None),
        )
    }

    #[tokio::test]
    async fn test_submit_reuses_open_queue_entry() {
        let listing = draft_listing("listing1", "dev1", ListingStatus::PendingReview);
        let open_entry = queue_entry("queue1", "listing1", ApprovalStatus::Pending);
        let mut refreshed = open_entry.clone();
        refreshed.submission_count = 2;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![listing.clone()]]) // get listing
            .append_query_results([vec![open_entry]]) // find existing entry
            .append_query_results([vec![refreshed]]) // entry update returning
            .append_query_results([vec![draft_listing(
                "listing1",
                "dev1",
                ListingStatus::PendingReview,
            )]]) // listing update returning
            .append_query_results([vec![hestia_db::entities::activity_event::Model {
                id: "act1".into(),
                user_id: "dev1".into(),
                listing_id: Some("listing1".into()),
                kind: ActivityKind::ListingSubmitted,
                message: "submitted".into(),
                created_at: Utc::now().into(),
            }]]); // activity insert returning

        let svc = service(db);
        let (_, entry) = svc.submit("dev1", "listing1", submit_input()).await.unwrap();

        // Same row with a bumped submission count, not a second open entry.
        assert_eq!(entry.id, "queue1");
        assert_eq!(entry.submission_count, 2);
        assert_eq!(entry.status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_submit_rejects_foreign_listing() {
        let listing = draft_listing("listing1", "dev1", ListingStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![listing]]);

        let svc = service(db);
        let result = svc.submit("intruder", "listing1", submit_input()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_review_twice_conflicts() {
        let entry = queue_entry("queue1", "listing1", ApprovalStatus::Approved);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![entry]]);

        let svc = service(db);
        let result = svc
            .review("mod1", "queue1", ReviewDecision::Rejected, None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_publish_requires_approval() {
        let listing = draft_listing("listing1", "dev1", ListingStatus::PendingReview);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![listing]]);

        let svc = service(db);
        let result = svc.publish("mod1", "listing1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_compliance_checks_flag_missing_media() {
        let checks = run_compliance_checks(&submit_input());

        let media_check = checks.iter().find(|c| c.name == "media_attached").unwrap();
        assert!(!media_check.passed);
        assert!(checks.iter().any(|c| c.name == "pricing_positive" && c.passed));
    }
}
