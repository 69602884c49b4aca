//! Stripe webhook reconciliation.
//!
//! Events arrive signed with the endpoint secret. An invalid signature is
//! rejected before any state changes; everything after that point is
//! acknowledged with a 200 even when a handler fails, because Stripe retries
//! on non-2xx and a poisoned event would otherwise block the queue.
//!
//! Idempotency is two-layered: processed event IDs are recorded in the
//! `stripe_event` ledger, and the subscription/invoice handlers upsert on
//! the external Stripe IDs, so a replayed delivery cannot duplicate rows or
//! side effects.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use chrono::{DateTime, TimeZone, Utc};
use hestia_common::{AppError, AppResult};
use hestia_db::{
    entities::{
        activity_event::ActivityKind,
        invoice,
        invoice::InvoiceStatus,
        subscription,
        subscription::SubscriptionStatus,
        user,
    },
    repositories::{
        ActivityEventRepository, InvoiceRepository, StripeEventRepository, SubscriptionRepository,
        UserRepository,
    },
};
use sea_orm::Set;

use crate::services::email::{EmailService, PaymentFailedEmail, WelcomeEmail};

type HmacSha256 = Hmac<Sha256>;

/// Verify a `stripe-signature` header against the raw request body.
///
/// The header carries a unix timestamp and one or more `v1` HMAC-SHA256
/// signatures of `"{timestamp}.{payload}"`. Timestamps outside the tolerance
/// window are rejected to stop replay of captured deliveries.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    tolerance_secs: i64,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(AppError::InvalidSignature)?;
    if candidates.is_empty() {
        return Err(AppError::InvalidSignature);
    }

    let sent_at = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or(AppError::InvalidSignature)?;
    if (now - sent_at).num_seconds().abs() > tolerance_secs {
        return Err(AppError::InvalidSignature);
    }

    for candidate in candidates {
        let Ok(decoded) = hex::decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {e}")))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        if mac.verify_slice(&decoded).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::InvalidSignature)
}

/// Closed set of event types this endpoint reconciles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    CustomerSubscriptionCreated,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    InvoicePaid,
    InvoicePaymentFailed,
    /// Anything else: acknowledged, never acted on.
    Other(String),
}

impl From<&str> for StripeEventType {
    fn from(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.created" => Self::CustomerSubscriptionCreated,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            "invoice.paid" => Self::InvoicePaid,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Envelope of a Stripe event.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

/// Payload wrapper.
#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    customer: Option<String>,
    client_reference_id: Option<String>,
    customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: String,
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
    current_period_end: Option<i64>,
    items: Option<SubscriptionItems>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItems {
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    price: PriceObject,
}

#[derive(Debug, Deserialize)]
struct PriceObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    id: String,
    customer: String,
    subscription: Option<String>,
    #[serde(default)]
    amount_due: i64,
    #[serde(default)]
    amount_paid: i64,
    #[serde(default = "default_currency")]
    currency: String,
    status: Option<String>,
    hosted_invoice_url: Option<String>,
    invoice_pdf: Option<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn map_subscription_status(status: &str) -> SubscriptionStatus {
    match status {
        "active" => SubscriptionStatus::Active,
        "trialing" => SubscriptionStatus::Trialing,
        "past_due" => SubscriptionStatus::PastDue,
        "canceled" => SubscriptionStatus::Canceled,
        _ => SubscriptionStatus::Incomplete,
    }
}

fn map_invoice_status(status: Option<&str>) -> InvoiceStatus {
    match status {
        Some("paid") => InvoiceStatus::Paid,
        Some("open") => InvoiceStatus::Open,
        Some("void") => InvoiceStatus::Void,
        Some("uncollectible") => InvoiceStatus::Uncollectible,
        _ => InvoiceStatus::Draft,
    }
}

/// Stripe webhook reconciliation service.
#[derive(Clone)]
pub struct StripeWebhookService {
    webhook_secret: String,
    tolerance_secs: i64,
    users: UserRepository,
    subscriptions: SubscriptionRepository,
    invoices: InvoiceRepository,
    events: StripeEventRepository,
    activity: ActivityEventRepository,
    email: EmailService,
}

impl StripeWebhookService {
    /// Create a new webhook service.
    #[must_use]
    pub const fn new(
        webhook_secret: String,
        tolerance_secs: i64,
        users: UserRepository,
        subscriptions: SubscriptionRepository,
        invoices: InvoiceRepository,
        events: StripeEventRepository,
        activity: ActivityEventRepository,
        email: EmailService,
    ) -> Self {
        Self {
            webhook_secret,
            tolerance_secs,
            users,
            subscriptions,
            invoices,
            events,
            activity,
            email,
        }
    }

    /// Handle one webhook delivery.
    ///
    /// Returns `Err(InvalidSignature)` only for a bad signature; every other
    /// failure is logged and swallowed so the delivery is acknowledged.
    pub async fn handle(&self, payload: &[u8], signature_header: &str) -> AppResult<()> {
        verify_signature(
            &self.webhook_secret,
            payload,
            signature_header,
            self.tolerance_secs,
            Utc::now(),
        )?;

        let event: StripeEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Discarding unparseable Stripe event");
                return Ok(());
            }
        };

        match self.events.is_processed(&event.id).await {
            Ok(true) => {
                tracing::info!(event_id = %event.id, "Skipping already-processed Stripe event");
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Event ledger lookup failed");
                return Ok(());
            }
        }

        let event_type = StripeEventType::from(event.event_type.as_str());
        let outcome = match &event_type {
            StripeEventType::CheckoutSessionCompleted => {
                self.handle_checkout_completed(&event.data.object).await
            }
            StripeEventType::CustomerSubscriptionCreated
            | StripeEventType::CustomerSubscriptionUpdated => {
                self.handle_subscription_upsert(&event.data.object).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.handle_subscription_deleted(&event.data.object).await
            }
            StripeEventType::InvoicePaid => self.handle_invoice(&event.data.object, false).await,
            StripeEventType::InvoicePaymentFailed => {
                self.handle_invoice(&event.data.object, true).await
            }
            StripeEventType::Other(kind) => {
                tracing::debug!(event_type = %kind, "Ignoring unhandled Stripe event type");
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {
                // Mark processed only after the side effects landed; a failed
                // handler stays unmarked so a replay can retry it.
                if let Err(e) = self.events.mark_processed(&event.id, &event.event_type).await {
                    tracing::error!(event_id = %event.id, error = %e, "Failed to record processed event");
                }
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Stripe event handler failed; acknowledging anyway"
                );
            }
        }

        Ok(())
    }

    async fn handle_checkout_completed(&self, object: &serde_json::Value) -> AppResult<()> {
        let session: CheckoutSessionObject = serde_json::from_value(object.clone())
            .map_err(|e| AppError::BadRequest(format!("Malformed checkout session: {e}")))?;

        let user = self.resolve_user(&session).await?;

        let already_active = user.agency_activated_at.is_some();
        let email_to = user.email.clone();
        let agency_name = user.agency_name.clone();
        let user_id = user.id.clone();

        let mut model: user::ActiveModel = user.into();
        model.is_developer = Set(true);
        if !already_active {
            model.agency_activated_at = Set(Some(Utc::now().into()));
        }
        if let Some(customer) = &session.customer {
            model.stripe_customer_id = Set(Some(customer.clone()));
        }
        self.users.update(model).await?;

        // Replays of the same session are filtered by the event ledger, and
        // a second distinct checkout must not re-welcome an active agency.
        if !already_active {
            self.record_activity(
                &user_id,
                ActivityKind::SubscriptionActivated,
                "Developer subscription activated".to_string(),
            )
            .await;

            if self.email.is_enabled() {
                if let Err(e) = self
                    .email
                    .send_welcome(WelcomeEmail {
                        to: email_to,
                        agency_name,
                    })
                    .await
                {
                    tracing::warn!(error = %e, "Failed to send welcome email");
                }
            }
        }

        Ok(())
    }

    async fn handle_subscription_upsert(&self, object: &serde_json::Value) -> AppResult<()> {
        let sub: SubscriptionObject = serde_json::from_value(object.clone())
            .map_err(|e| AppError::BadRequest(format!("Malformed subscription: {e}")))?;

        let status = map_subscription_status(&sub.status);
        let period_end = sub
            .current_period_end
            .and_then(|t| Utc.timestamp_opt(t, 0).single());
        let price_id = sub
            .items
            .as_ref()
            .and_then(|items| items.data.first())
            .map(|item| item.price.id.clone())
            .unwrap_or_default();

        match self.subscriptions.find_by_stripe_id(&sub.id).await? {
            Some(existing) => {
                let mut model: subscription::ActiveModel = existing.into();
                model.status = Set(status);
                model.price_id = Set(price_id);
                model.current_period_end = Set(period_end.map(Into::into));
                model.cancel_at_period_end = Set(sub.cancel_at_period_end);
                model.updated_at = Set(Some(Utc::now().into()));
                self.subscriptions.update(model).await?;
            }
            None => {
                let user = self
                    .users
                    .find_by_stripe_customer(&sub.customer)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("No account for customer {}", sub.customer))
                    })?;

                let model = subscription::ActiveModel {
                    id: Set(crate::generate_id()),
                    user_id: Set(user.id),
                    stripe_customer_id: Set(sub.customer),
                    stripe_subscription_id: Set(sub.id),
                    price_id: Set(price_id),
                    status: Set(status),
                    current_period_end: Set(period_end.map(Into::into)),
                    cancel_at_period_end: Set(sub.cancel_at_period_end),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                };
                self.subscriptions.create(model).await?;
            }
        }

        Ok(())
    }

    async fn handle_subscription_deleted(&self, object: &serde_json::Value) -> AppResult<()> {
        let sub: SubscriptionObject = serde_json::from_value(object.clone())
            .map_err(|e| AppError::BadRequest(format!("Malformed subscription: {e}")))?;

        let Some(existing) = self.subscriptions.find_by_stripe_id(&sub.id).await? else {
            tracing::debug!(stripe_subscription_id = %sub.id, "Delete for unknown subscription");
            return Ok(());
        };

        let mut model: subscription::ActiveModel = existing.into();
        model.status = Set(SubscriptionStatus::Canceled);
        model.updated_at = Set(Some(Utc::now().into()));
        self.subscriptions.update(model).await?;

        Ok(())
    }

    async fn handle_invoice(&self, object: &serde_json::Value, failed: bool) -> AppResult<()> {
        let inv: InvoiceObject = serde_json::from_value(object.clone())
            .map_err(|e| AppError::BadRequest(format!("Malformed invoice: {e}")))?;

        let user = self
            .users
            .find_by_stripe_customer(&inv.customer)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No account for customer {}", inv.customer))
            })?;

        let status = map_invoice_status(inv.status.as_deref());

        match self.invoices.find_by_stripe_id(&inv.id).await? {
            Some(existing) => {
                let mut model: invoice::ActiveModel = existing.into();
                model.amount_due = Set(inv.amount_due);
                model.amount_paid = Set(inv.amount_paid);
                model.status = Set(status);
                model.hosted_invoice_url = Set(inv.hosted_invoice_url.clone());
                model.invoice_pdf = Set(inv.invoice_pdf.clone());
                model.updated_at = Set(Some(Utc::now().into()));
                self.invoices.update(model).await?;
            }
            None => {
                let model = invoice::ActiveModel {
                    id: Set(crate::generate_id()),
                    user_id: Set(user.id.clone()),
                    stripe_invoice_id: Set(inv.id.clone()),
                    stripe_subscription_id: Set(inv.subscription.clone()),
                    amount_due: Set(inv.amount_due),
                    amount_paid: Set(inv.amount_paid),
                    currency: Set(inv.currency.clone()),
                    status: Set(status),
                    hosted_invoice_url: Set(inv.hosted_invoice_url.clone()),
                    invoice_pdf: Set(inv.invoice_pdf.clone()),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                };
                self.invoices.create(model).await?;
            }
        }

        if failed {
            self.record_activity(
                &user.id,
                ActivityKind::PaymentFailed,
                "A subscription payment failed".to_string(),
            )
            .await;

            if self.email.is_enabled() {
                if let Err(e) = self
                    .email
                    .send_payment_failed(PaymentFailedEmail {
                        to: user.email,
                        amount_due: inv.amount_due,
                        currency: inv.currency,
                    })
                    .await
                {
                    tracing::warn!(error = %e, "Failed to send payment-failed email");
                }
            }
        } else {
            self.record_activity(
                &user.id,
                ActivityKind::InvoicePaid,
                "Subscription invoice paid".to_string(),
            )
            .await;
        }

        Ok(())
    }

    async fn resolve_user(&self, session: &CheckoutSessionObject) -> AppResult<user::Model> {
        if let Some(user_id) = &session.client_reference_id {
            if let Some(user) = self.users.find_by_id(user_id).await? {
                return Ok(user);
            }
        }
        if let Some(customer) = &session.customer {
            if let Some(user) = self.users.find_by_stripe_customer(customer).await? {
                return Ok(user);
            }
        }
        if let Some(email) = &session.customer_email {
            if let Some(user) = self.users.find_by_email(email).await? {
                return Ok(user);
            }
        }

        Err(AppError::NotFound(
            "Checkout session matches no account".to_string(),
        ))
    }

    async fn record_activity(&self, user_id: &str, kind: ActivityKind, message: String) {
        let model = hestia_db::entities::activity_event::ActiveModel {
            id: Set(crate::generate_id()),
            user_id: Set(user_id.to_string()),
            listing_id: Set(None),
            kind: Set(kind),
            message: Set(message),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = self.activity.create(model).await {
            tracing::warn!(error = %e, "Failed to record activity event");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let digest = hex::encode(mac.finalize().into_bytes());
        format!("t={timestamp},v1={digest}")
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"id":"evt_1"}"#;
        let now = Utc::now();
        let header = sign(payload, now.timestamp());

        assert!(verify_signature(SECRET, payload, &header, 300, now).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let header = sign(br#"{"id":"evt_1"}"#, now.timestamp());

        let result = verify_signature(SECRET, br#"{"id":"evt_2"}"#, &header, 300, now);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = br#"{"id":"evt_1"}"#;
        let now = Utc::now();
        let header = sign(payload, now.timestamp() - 3600);

        let result = verify_signature(SECRET, payload, &header, 300, now);
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_header_rejected() {
        let result =
            verify_signature(SECRET, b"{}", "not-a-signature-header", 300, Utc::now());
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn test_event_type_mapping() {
        assert_eq!(
            StripeEventType::from("checkout.session.completed"),
            StripeEventType::CheckoutSessionCompleted
        );
        assert_eq!(
            StripeEventType::from("invoice.payment_failed"),
            StripeEventType::InvoicePaymentFailed
        );
        assert_eq!(
            StripeEventType::from("charge.refunded"),
            StripeEventType::Other("charge.refunded".to_string())
        );
    }

    fn service(db: MockDatabase) -> StripeWebhookService {
        let db = Arc::new(db.into_connection());
        StripeWebhookService::new(
            SECRET.to_string(),
            300,
            UserRepository::new(Arc::clone(&db)),
            SubscriptionRepository::new(Arc::clone(&db)),
            InvoiceRepository::new(Arc::clone(&db)),
            StripeEventRepository::new(Arc::clone(&db)),
            ActivityEventRepository::new(Arc::clone(&db)),
            EmailService::new(None),
        )
    }

    #[tokio::test]
    async fn test_replayed_event_is_skipped() {
        // The ledger already has evt_1; the handler must not touch anything
        // else, so the only appended result is the ledger row.
        let processed = hestia_db::entities::stripe_event::Model {
            id: "evt_1".to_string(),
            event_type: "checkout.session.completed".to_string(),
            processed_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![processed]]);

        let svc = service(db);
        let payload =
            br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#;
        let header = sign(payload, Utc::now().timestamp());

        svc.handle(payload, &header).await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_signature_short_circuits() {
        // No mock results at all: a bad signature must fail before any query.
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let svc = service(db);
        let result = svc.handle(b"{}", "t=1,v1=deadbeef").await;

        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_unhandled_event_type_is_acknowledged() {
        // Ledger lookup (empty), then the processed-mark insert.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<hestia_db::entities::stripe_event::Model>::new()])
            .append_query_results([vec![hestia_db::entities::stripe_event::Model {
                id: "evt_9".to_string(),
                event_type: "charge.refunded".to_string(),
                processed_at: Utc::now().into(),
            }]]);

        let svc = service(db);
        let payload = br#"{"id":"evt_9","type":"charge.refunded","data":{"object":{}}}"#;
        let header = sign(payload, Utc::now().timestamp());

        svc.handle(payload, &header).await.unwrap();
    }
}
