//! Developer mission-control endpoints.

use axum::{extract::State, routing::post, Json, Router};
use hestia_common::{AppError, AppResult};
use hestia_core::{ActivityEntry, DashboardKpis, InvoiceResponse, ListingResponse};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

fn require_developer(user: &hestia_db::entities::user::Model) -> AppResult<()> {
    if user.is_developer || user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Mission control requires a developer account".to_string(),
        ))
    }
}

/// Pagination request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub until_id: Option<String>,
}

/// The developer's listings, every lifecycle status.
async fn developments(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<ListingResponse>>> {
    require_developer(&user)?;

    let listings = state
        .dashboard_service
        .developments(&user.id, req.limit.unwrap_or(20), req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        listings.into_iter().map(Into::into).collect(),
    ))
}

/// Delete-development request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDevelopmentRequest {
    pub listing_id: String,
}

/// Delete one of the developer's listings.
async fn delete_development(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteDevelopmentRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    require_developer(&user)?;

    state
        .dashboard_service
        .delete_development(&user.id, &req.listing_id)
        .await?;

    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

/// Subscription response wrapper; `null` when the user never subscribed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionEnvelope {
    pub subscription: Option<hestia_core::SubscriptionResponse>,
}

/// The developer's current subscription.
async fn subscription(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SubscriptionEnvelope>> {
    require_developer(&user)?;

    let subscription = state.billing_service.get_subscription(&user.id).await?;

    Ok(ApiResponse::ok(SubscriptionEnvelope { subscription }))
}

/// The developer's invoices.
async fn invoices(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<InvoiceResponse>>> {
    require_developer(&user)?;

    let invoices = state
        .billing_service
        .list_invoices(&user.id, req.limit.unwrap_or(20))
        .await?;

    Ok(ApiResponse::ok(invoices))
}

/// Dashboard KPI block.
async fn dashboard_kpis(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DashboardKpis>> {
    require_developer(&user)?;

    let kpis = state.dashboard_service.kpis(&user.id).await?;

    Ok(ApiResponse::ok(kpis))
}

/// Activity feed.
async fn activity_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<ActivityEntry>>> {
    require_developer(&user)?;

    let feed = state
        .dashboard_service
        .activity_feed(&user.id, req.limit.unwrap_or(20), req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(feed))
}

/// Notification-count request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCountRequest {
    #[serde(default)]
    pub since_id: Option<String>,
}

/// Notification-count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCountResponse {
    pub count: u64,
}

/// Unseen-activity badge. Best-effort: failures show as zero.
async fn notification_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationCountRequest>,
) -> AppResult<ApiResponse<NotificationCountResponse>> {
    let count = state
        .dashboard_service
        .notification_count(&user.id, req.since_id.as_deref())
        .await;

    Ok(ApiResponse::ok(NotificationCountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/developments", post(developments))
        .route("/developments/delete", post(delete_development))
        .route("/subscription", post(subscription))
        .route("/invoices", post(invoices))
        .route("/dashboard/kpis", post(dashboard_kpis))
        .route("/dashboard/activity", post(activity_feed))
        .route("/notifications/count", post(notification_count))
}
