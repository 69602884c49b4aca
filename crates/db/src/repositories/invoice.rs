//! Invoice repository.

use std::sync::Arc;

use crate::entities::{invoice, invoice::InvoiceStatus, Invoice};
use hestia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Invoice repository for database operations.
#[derive(Clone)]
pub struct InvoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl InvoiceRepository {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an invoice by Stripe invoice ID (webhook upsert key).
    pub async fn find_by_stripe_id(
        &self,
        stripe_invoice_id: &str,
    ) -> AppResult<Option<invoice::Model>> {
        Invoice::find()
            .filter(invoice::Column::StripeInvoiceId.eq(stripe_invoice_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Invoices for a user, newest first.
    pub async fn find_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<invoice::Model>> {
        Invoice::find()
            .filter(invoice::Column::UserId.eq(user_id))
            .order_by_desc(invoice::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an invoice row.
    pub async fn create(&self, model: invoice::ActiveModel) -> AppResult<invoice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an invoice row.
    pub async fn update(&self, model: invoice::ActiveModel) -> AppResult<invoice::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of paid invoice amounts (admin overview revenue figure).
    pub async fn total_paid(&self) -> AppResult<i64> {
        use sea_orm::FromQueryResult;

        #[derive(FromQueryResult)]
        struct SumResult {
            total: Option<i64>,
        }

        let result = Invoice::find()
            .filter(invoice::Column::Status.eq(InvoiceStatus::Paid))
            .select_only()
            .column_as(invoice::Column::AmountPaid.sum(), "total")
            .into_model::<SumResult>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.and_then(|r| r.total).unwrap_or(0))
    }
}
