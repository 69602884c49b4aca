//! API integration tests.
//!
//! These drive the router with a mock database connection and verify status
//! codes and response envelopes end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hestia_api::{middleware::AppState, router as api_router, webhook_router, MetaInfo};
use hestia_common::LocalStorage;
use hestia_core::{
    ApprovalService, BillingService, BrandService, DashboardService, EmailService, ListingService,
    MediaService, StripeWebhookService, UserService,
};
use hestia_db::repositories::{
    ActivityEventRepository, ApprovalQueueRepository, BrandProfileRepository, InvoiceRepository,
    ListingMediaRepository, ListingRepository, StripeEventRepository, SubscriptionRepository,
    UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

const WEBHOOK_SECRET: &str = "whsec_test";

/// Create a mock database connection with the given seeded query results.
fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn create_state(db: DatabaseConnection, with_webhooks: bool) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let listing_repo = ListingRepository::new(Arc::clone(&db));
    let media_repo = ListingMediaRepository::new(Arc::clone(&db));
    let queue_repo = ApprovalQueueRepository::new(Arc::clone(&db));
    let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));
    let invoice_repo = InvoiceRepository::new(Arc::clone(&db));
    let stripe_event_repo = StripeEventRepository::new(Arc::clone(&db));
    let brand_repo = BrandProfileRepository::new(Arc::clone(&db));
    let activity_repo = ActivityEventRepository::new(Arc::clone(&db));

    let email_service = EmailService::new(None);
    let storage = Arc::new(LocalStorage::new(
        "/tmp/hestia-test-media".into(),
        "https://example.com/media".to_string(),
        "https://example.com/api/uploads".to_string(),
    ));

    let stripe_webhook_service = with_webhooks.then(|| {
        StripeWebhookService::new(
            WEBHOOK_SECRET.to_string(),
            300,
            user_repo.clone(),
            subscription_repo.clone(),
            invoice_repo.clone(),
            stripe_event_repo,
            activity_repo.clone(),
            email_service.clone(),
        )
    });

    AppState {
        user_service: UserService::new(user_repo.clone()),
        listing_service: ListingService::new(listing_repo.clone(), None),
        approval_service: ApprovalService::new(
            Arc::clone(&db),
            listing_repo.clone(),
            queue_repo,
            activity_repo.clone(),
            user_repo.clone(),
            email_service.clone(),
        ),
        media_service: MediaService::new(
            media_repo,
            listing_repo.clone(),
            activity_repo.clone(),
            storage,
        ),
        billing_service: BillingService::new(
            None,
            String::new(),
            "https://example.com".to_string(),
            subscription_repo.clone(),
            invoice_repo,
            user_repo,
        ),
        stripe_webhook_service,
        brand_service: BrandService::new(brand_repo, listing_repo.clone()),
        dashboard_service: DashboardService::new(listing_repo, activity_repo, subscription_repo),
        meta: MetaInfo {
            name: "Hestia Test".to_string(),
            description: None,
            billing_enabled: false,
            geocoding_enabled: false,
            email_provider: None,
            storage_backend: "local",
        },
    }
}

fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .nest("/webhooks", webhook_router())
        .with_state(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_meta_reports_disabled_integrations() {
    let app = create_app(create_state(create_mock_db(), false));

    let response = app.oneshot(post_json("/api/meta", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["billingEnabled"], false);
    assert_eq!(json["data"]["storageBackend"], "local");
}

#[tokio::test]
async fn test_developments_requires_auth() {
    let app = create_app(create_state(create_mock_db(), false));

    let response = app
        .oneshot(post_json("/api/developer/developments", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_queue_requires_auth() {
    let app = create_app(create_state(create_mock_db(), false));

    let response = app
        .oneshot(post_json("/api/admin/queue", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_requires_auth() {
    let app = create_app(create_state(create_mock_db(), false));

    let response = app
        .oneshot(post_json("/api/billing/checkout", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_unavailable_without_stripe_config() {
    let app = create_app(create_state(create_mock_db(), false));

    let response = app
        .oneshot(post_json("/webhooks/stripe", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let app = create_app(create_state(create_mock_db(), true));

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/stripe")
        .header("content-type", "application/json")
        .header("stripe-signature", "t=1,v1=deadbeef")
        .body(Body::from(r#"{"id":"evt_1","type":"invoice.paid","data":{"object":{}}}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_requires_signature_header() {
    let app = create_app(create_state(create_mock_db(), true));

    let response = app
        .oneshot(post_json("/webhooks/stripe", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_browse_returns_published_listings() {
    use chrono::Utc;
    use hestia_db::entities::listing;

    let published = listing::Model {
        id: "listing1".to_string(),
        owner_id: "dev1".to_string(),
        brand_id: None,
        action: listing::ListingAction::Sell,
        property_type: listing::PropertyType::House,
        title: "Three-bed family home".to_string(),
        description: "Sunny corner plot".to_string(),
        badges: serde_json::json!([]),
        details: serde_json::json!({"type": "house"}),
        pricing: serde_json::json!({"action": "sell", "price": 2_500_000}),
        draft_state: None,
        address: "12 Oak Lane".to_string(),
        city: "Cape Town".to_string(),
        province: None,
        postal_code: None,
        latitude: None,
        longitude: None,
        status: listing::ListingStatus::Published,
        approval_status: Some(listing::ApprovalStatus::Approved),
        rejection_reason: None,
        is_published: true,
        published_at: Some(Utc::now().into()),
        view_count: 3,
        created_at: Utc::now().into(),
        updated_at: None,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![published]])
        .into_connection();
    let app = create_app(create_state(db, false));

    let response = app
        .oneshot(post_json("/api/listings/list", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"][0]["id"], "listing1");
    assert_eq!(json["data"][0]["isPublished"], true);
}

#[tokio::test]
async fn test_signup_validates_payload() {
    let app = create_app(create_state(create_mock_db(), false));

    // Password too short: rejected by the request validator before any query.
    let response = app
        .oneshot(post_json(
            "/api/auth/signup",
            r#"{"username":"dev","email":"dev@example.com","password":"short"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
