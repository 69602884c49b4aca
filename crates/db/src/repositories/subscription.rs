//! Subscription repository.

use std::sync::Arc;

use crate::entities::{subscription, subscription::SubscriptionStatus, Subscription};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subscription by Stripe subscription ID (webhook upsert key).
    pub async fn find_by_stripe_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::StripeSubscriptionId.eq(stripe_subscription_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Latest subscription for a user, if any.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .order_by_desc(subscription::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a subscription row.
    pub async fn create(&self, model: subscription::ActiveModel) -> AppResult<subscription::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a subscription row.
    pub async fn update(&self, model: subscription::ActiveModel) -> AppResult<subscription::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count subscriptions in a given status (admin overview).
    pub async fn count_by_status(&self, status: SubscriptionStatus) -> AppResult<u64> {
        Subscription::find()
            .filter(subscription::Column::Status.eq(status))
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

    fn create_test_subscription(id: &str, stripe_id: &str) -> subscription::Model {
        subscription::Model {
            id: id.to_string(),
            user_id: "dev1".to_string(),
            stripe_customer_id: "cus_123".to_string(),
            stripe_subscription_id: stripe_id.to_string(),
            price_id: "price_dev".to_string(),
            status: SubscriptionStatus::Active,
            current_period_end: None,
            cancel_at_period_end: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_stripe_id() {
        let sub = create_test_subscription("sub1", "sub_abc");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sub]])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let result = repo.find_by_stripe_id("sub_abc").await.unwrap();

        assert_eq!(result.unwrap().id, "sub1");
    }
}
