//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use hestia_core::{
    ApprovalService, BillingService, BrandService, DashboardService, ListingService, MediaService,
    StripeWebhookService, UserService,
};

/// Which optional integrations this deployment runs with.
#[derive(Clone, Debug)]
pub struct MetaInfo {
    pub name: String,
    pub description: Option<String>,
    pub billing_enabled: bool,
    pub geocoding_enabled: bool,
    pub email_provider: Option<&'static str>,
    pub storage_backend: &'static str,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub listing_service: ListingService,
    pub approval_service: ApprovalService,
    pub media_service: MediaService,
    pub billing_service: BillingService,
    pub stripe_webhook_service: Option<StripeWebhookService>,
    pub brand_service: BrandService,
    pub dashboard_service: DashboardService,
    pub meta: MetaInfo,
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract token from header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
            && let Some(token) = auth_str.strip_prefix("Bearer ") {
                // Authenticate user by token
                if let Ok(user) = state.user_service.authenticate_by_token(token).await {
                    req.extensions_mut().insert(user);
                }
            }

    next.run(req).await
}
