//! Billing: checkout sessions, subscription lookups, invoices.
//!
//! Stripe access goes through the [`StripeGateway`] trait so the service can
//! run against a mock in tests. The live gateway talks to the Stripe form
//! API directly. When no `[stripe]` config is present the gateway is absent
//! and billing operations return `ServiceUnavailable` instead of crashing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hestia_common::{AppError, AppResult};
use hestia_db::{
    entities::{invoice, subscription, subscription::SubscriptionStatus, user},
    repositories::{InvoiceRepository, SubscriptionRepository, UserRepository},
};

/// Request for a new checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    /// Local user ID, round-tripped via `client_reference_id`.
    pub client_reference_id: String,
    /// Prefilled customer email.
    pub customer_email: String,
    /// Existing Stripe customer, if the user checked out before.
    pub customer_id: Option<String>,
    /// Price being subscribed to.
    pub price_id: String,
    /// Redirect after successful payment.
    pub success_url: String,
    /// Redirect after cancel.
    pub cancel_url: String,
}

/// A created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A created billing portal session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSession {
    pub url: String,
}

/// Stripe API surface used by billing.
#[async_trait]
pub trait StripeGateway: Send + Sync {
    /// Create a subscription checkout session.
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession>;

    /// Create a billing portal session for an existing customer.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<PortalSession>;
}

/// Production gateway against the Stripe HTTP API.
pub struct LiveStripeGateway {
    secret_key: String,
    http_client: reqwest::Client,
}

impl LiveStripeGateway {
    /// Create a new live gateway.
    #[must_use]
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StripeGateway for LiveStripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        let mut params = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("line_items[0][price]".to_string(), request.price_id),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
            (
                "client_reference_id".to_string(),
                request.client_reference_id,
            ),
        ];

        // An existing customer keeps invoices on one Stripe account; a new
        // one gets the email prefilled instead.
        match request.customer_id {
            Some(customer) => params.push(("customer".to_string(), customer)),
            None => params.push(("customer_email".to_string(), request.customer_email)),
        }

        let response = self
            .http_client
            .post("https://api.stripe.com/v1/checkout/sessions")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Stripe request failed: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Stripe checkout creation failed: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct SessionResponse {
            id: String,
            url: String,
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Malformed Stripe response: {e}")))?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<PortalSession> {
        let params = [
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];

        let response = self
            .http_client
            .post("https://api.stripe.com/v1/billing_portal/sessions")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Stripe request failed: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Stripe portal creation failed: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct PortalResponse {
            url: String,
        }

        let portal: PortalResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Malformed Stripe response: {e}")))?;

        Ok(PortalSession { url: portal.url })
    }
}

/// Response shape for a subscription.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: String,
    pub price_id: String,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<String>,
    pub cancel_at_period_end: bool,
}

impl From<subscription::Model> for SubscriptionResponse {
    fn from(s: subscription::Model) -> Self {
        Self {
            id: s.id,
            price_id: s.price_id,
            status: s.status,
            current_period_end: s.current_period_end.map(|t| t.to_rfc3339()),
            cancel_at_period_end: s.cancel_at_period_end,
        }
    }
}

/// Response shape for an invoice.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub amount_due: i64,
    pub amount_paid: i64,
    pub currency: String,
    pub status: invoice::InvoiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_invoice_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_pdf: Option<String>,
    pub created_at: String,
}

impl From<invoice::Model> for InvoiceResponse {
    fn from(i: invoice::Model) -> Self {
        Self {
            id: i.id,
            amount_due: i.amount_due,
            amount_paid: i.amount_paid,
            currency: i.currency,
            status: i.status,
            hosted_invoice_url: i.hosted_invoice_url,
            invoice_pdf: i.invoice_pdf,
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

/// Platform-wide billing aggregates for staff.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingOverview {
    pub active_subscriptions: u64,
    pub past_due_subscriptions: u64,
    pub canceled_subscriptions: u64,
    pub developer_count: u64,
    /// Lifetime paid total in the smallest currency unit.
    pub total_paid: i64,
}

/// Billing service.
#[derive(Clone)]
pub struct BillingService {
    gateway: Option<Arc<dyn StripeGateway>>,
    price_id: String,
    public_url: String,
    subscriptions: SubscriptionRepository,
    invoices: InvoiceRepository,
    users: UserRepository,
}

impl BillingService {
    /// Create a new billing service.
    #[must_use]
    pub fn new(
        gateway: Option<Arc<dyn StripeGateway>>,
        price_id: String,
        public_url: String,
        subscriptions: SubscriptionRepository,
        invoices: InvoiceRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            gateway,
            price_id,
            public_url,
            subscriptions,
            invoices,
            users,
        }
    }

    /// Whether Stripe is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    fn gateway(&self) -> AppResult<&Arc<dyn StripeGateway>> {
        self.gateway.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Billing is not configured".to_string())
        })
    }

    /// Start a developer-plan checkout for a user.
    pub async fn create_checkout(&self, user: &user::Model) -> AppResult<CheckoutSession> {
        let gateway = self.gateway()?;

        let request = CheckoutSessionRequest {
            client_reference_id: user.id.clone(),
            customer_email: user.email.clone(),
            customer_id: user.stripe_customer_id.clone(),
            price_id: self.price_id.clone(),
            success_url: format!("{}/dashboard/billing?checkout=success", self.public_url),
            cancel_url: format!("{}/dashboard/billing?checkout=canceled", self.public_url),
        };

        gateway.create_checkout_session(request).await
    }

    /// Open the Stripe billing portal for a user with a customer record.
    pub async fn create_portal(&self, user: &user::Model) -> AppResult<PortalSession> {
        let gateway = self.gateway()?;

        let customer_id = user.stripe_customer_id.as_deref().ok_or_else(|| {
            AppError::BadRequest("No billing account exists for this user".to_string())
        })?;

        gateway
            .create_portal_session(
                customer_id,
                &format!("{}/dashboard/billing", self.public_url),
            )
            .await
    }

    /// Current subscription for a user, if any.
    pub async fn get_subscription(&self, user_id: &str) -> AppResult<Option<SubscriptionResponse>> {
        Ok(self
            .subscriptions
            .find_by_user(user_id)
            .await?
            .map(Into::into))
    }

    /// Invoices for a user.
    pub async fn list_invoices(&self, user_id: &str, limit: u64) -> AppResult<Vec<InvoiceResponse>> {
        Ok(self
            .invoices
            .find_by_user(user_id, limit.min(100))
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Platform-wide aggregates for the admin billing overview.
    pub async fn admin_overview(&self) -> AppResult<BillingOverview> {
        let active = self
            .subscriptions
            .count_by_status(SubscriptionStatus::Active)
            .await?;
        let past_due = self
            .subscriptions
            .count_by_status(SubscriptionStatus::PastDue)
            .await?;
        let canceled = self
            .subscriptions
            .count_by_status(SubscriptionStatus::Canceled)
            .await?;
        let developer_count = self.users.count_developers().await?;
        let total_paid = self.invoices.total_paid().await?;

        Ok(BillingOverview {
            active_subscriptions: active,
            past_due_subscriptions: past_due,
            canceled_subscriptions: canceled,
            developer_count,
            total_paid,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Mutex;

    /// Gateway double that records requests instead of calling Stripe.
    struct MockStripeGateway {
        requests: Mutex<Vec<CheckoutSessionRequest>>,
    }

    impl MockStripeGateway {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StripeGateway for MockStripeGateway {
        async fn create_checkout_session(
            &self,
            request: CheckoutSessionRequest,
        ) -> AppResult<CheckoutSession> {
            self.requests.lock().unwrap().push(request);
            Ok(CheckoutSession {
                id: "cs_test_1".to_string(),
                url: "https://checkout.stripe.com/pay/cs_test_1".to_string(),
            })
        }

        async fn create_portal_session(
            &self,
            _customer_id: &str,
            return_url: &str,
        ) -> AppResult<PortalSession> {
            Ok(PortalSession {
                url: return_url.to_string(),
            })
        }
    }

    fn test_user() -> user::Model {
        user::Model {
            id: "dev1".to_string(),
            username: "oakstone".to_string(),
            username_lower: "oakstone".to_string(),
            email: "dev@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            token: None,
            name: None,
            phone: None,
            agency_name: Some("Oak & Stone".to_string()),
            agency_activated_at: None,
            stripe_customer_id: None,
            is_developer: true,
            is_moderator: false,
            is_admin: false,
            is_suspended: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn repos() -> (SubscriptionRepository, InvoiceRepository, UserRepository) {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        (
            SubscriptionRepository::new(Arc::clone(&db)),
            InvoiceRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
        )
    }

    #[tokio::test]
    async fn test_checkout_carries_user_reference() {
        let gateway = Arc::new(MockStripeGateway::new());
        let (subs, invoices, users) = repos();
        let service = BillingService::new(
            Some(gateway.clone()),
            "price_dev".to_string(),
            "https://example.com".to_string(),
            subs,
            invoices,
            users,
        );

        let session = service.create_checkout(&test_user()).await.unwrap();
        assert_eq!(session.id, "cs_test_1");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].client_reference_id, "dev1");
        assert_eq!(requests[0].price_id, "price_dev");
    }

    #[tokio::test]
    async fn test_unconfigured_billing_is_unavailable() {
        let (subs, invoices, users) = repos();
        let service = BillingService::new(
            None,
            "price_dev".to_string(),
            "https://example.com".to_string(),
            subs,
            invoices,
            users,
        );

        let result = service.create_checkout(&test_user()).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_portal_requires_customer_record() {
        let gateway = Arc::new(MockStripeGateway::new());
        let (subs, invoices, users) = repos();
        let service = BillingService::new(
            Some(gateway),
            "price_dev".to_string(),
            "https://example.com".to_string(),
            subs,
            invoices,
            users,
        );

        let result = service.create_portal(&test_user()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
