//! Inbound webhook endpoints.
//!
//! The Stripe route takes the raw body: signature verification runs over the
//! exact bytes Stripe signed, so no JSON extractor may touch them first.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use hestia_common::{AppError, AppResult};
use serde_json::json;

use crate::middleware::AppState;

/// Handle a Stripe event delivery.
///
/// Responds `{"received": true}` for everything except a bad signature;
/// handler failures are logged server-side and acknowledged so Stripe does
/// not retry a poisoned event forever.
async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let service = state.stripe_webhook_service.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Billing is not configured".to_string())
    })?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    service.handle(&body, signature).await?;

    Ok(Json(json!({ "received": true })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}
