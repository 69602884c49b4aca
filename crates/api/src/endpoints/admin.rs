//! Staff endpoints: approval queue, publication, billing overview.

use axum::{extract::State, routing::post, Json, Router};
use hestia_common::{AppError, AppResult};
use hestia_core::{BillingOverview, ListingResponse, ReviewDecision};
use hestia_db::entities::approval_queue::{self, ApprovalStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

fn require_staff(user: &hestia_db::entities::user::Model) -> AppResult<()> {
    if user.is_admin || user.is_moderator {
        Ok(())
    } else {
        Err(AppError::Forbidden("Staff only".to_string()))
    }
}

/// Queue entry response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryResponse {
    pub id: String,
    pub listing_id: String,
    pub status: ApprovalStatus,
    pub submission_count: i32,
    pub compliance_results: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
}

impl From<approval_queue::Model> for QueueEntryResponse {
    fn from(e: approval_queue::Model) -> Self {
        Self {
            id: e.id,
            listing_id: e.listing_id,
            status: e.status,
            submission_count: e.submission_count,
            compliance_results: e.compliance_results,
            reviewed_by: e.reviewed_by,
            review_notes: e.review_notes,
            submitted_at: e.submitted_at.to_rfc3339(),
            reviewed_at: e.reviewed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Queue-list request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListRequest {
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Queue-list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListResponse {
    pub entries: Vec<QueueEntryResponse>,
    pub pending_count: u64,
}

/// List approval-queue entries.
async fn list_queue(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<QueueListRequest>,
) -> AppResult<ApiResponse<QueueListResponse>> {
    require_staff(&user)?;

    let entries = state
        .approval_service
        .list_queue(req.status, req.limit.unwrap_or(20), req.offset.unwrap_or(0))
        .await?;
    let pending_count = state.approval_service.count_pending().await?;

    Ok(ApiResponse::ok(QueueListResponse {
        entries: entries.into_iter().map(Into::into).collect(),
        pending_count,
    }))
}

/// Review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub queue_id: String,
    pub decision: ReviewDecision,
    pub notes: Option<String>,
}

/// Decide a pending submission.
async fn review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<ApiResponse<QueueEntryResponse>> {
    require_staff(&user)?;

    let entry = state
        .approval_service
        .review(&user.id, &req.queue_id, req.decision, req.notes.as_deref())
        .await?;

    Ok(ApiResponse::ok(entry.into()))
}

/// Publish request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub listing_id: String,
}

/// Put an approved listing live.
async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> AppResult<ApiResponse<ListingResponse>> {
    require_staff(&user)?;

    let listing = state
        .approval_service
        .publish(&user.id, &req.listing_id)
        .await?;

    Ok(ApiResponse::ok(listing.into()))
}

/// Platform billing aggregates. Admin only, unlike the review queue.
async fn billing_overview(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<BillingOverview>> {
    if !user.is_admin {
        return Err(AppError::Forbidden("Admin only".to_string()));
    }

    let overview = state.billing_service.admin_overview().await?;

    Ok(ApiResponse::ok(overview))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", post(list_queue))
        .route("/queue/review", post(review))
        .route("/listings/publish", post(publish))
        .route("/billing/overview", post(billing_overview))
}
