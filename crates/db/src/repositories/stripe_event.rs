//! Processed Stripe event repository.

use std::sync::Arc;

use crate::entities::{stripe_event, StripeEvent};
use hestia_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Repository over the processed-event ledger.
#[derive(Clone)]
pub struct StripeEventRepository {
    db: Arc<DatabaseConnection>,
}

impl StripeEventRepository {
    /// Create a new Stripe event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Has this event already been processed?
    pub async fn is_processed(&self, event_id: &str) -> AppResult<bool> {
        let found = StripeEvent::find_by_id(event_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Record an event as processed.
    pub async fn mark_processed(&self, event_id: &str, event_type: &str) -> AppResult<()> {
        let model = stripe_event::ActiveModel {
            id: Set(event_id.to_string()),
            event_type: Set(event_type.to_string()),
            processed_at: Set(chrono::Utc::now().into()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_is_processed_true() {
        let event = stripe_event::Model {
            id: "evt_1".to_string(),
            event_type: "checkout.session.completed".to_string(),
            processed_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event]])
                .into_connection(),
        );

        let repo = StripeEventRepository::new(db);
        assert!(repo.is_processed("evt_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_processed_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<stripe_event::Model>::new()])
                .into_connection(),
        );

        let repo = StripeEventRepository::new(db);
        assert!(!repo.is_processed("evt_unknown").await.unwrap());
    }
}
