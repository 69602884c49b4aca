//! Billing endpoints: checkout and portal sessions.

use axum::{extract::State, routing::post, Router};
use hestia_common::{AppError, AppResult};
use hestia_core::{CheckoutSession, PortalSession};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Checkout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session: CheckoutSession,
}

/// Start a developer-plan checkout.
async fn checkout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    if user.is_suspended {
        return Err(AppError::Forbidden("Account is suspended".to_string()));
    }

    let session = state.billing_service.create_checkout(&user).await?;

    Ok(ApiResponse::ok(CheckoutResponse { session }))
}

/// Portal response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalResponse {
    pub session: PortalSession,
}

/// Open the Stripe billing portal.
async fn portal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PortalResponse>> {
    let session = state.billing_service.create_portal(&user).await?;

    Ok(ApiResponse::ok(PortalResponse { session }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/portal", post(portal))
}
