//! Listing endpoints: wizard drafts, submission, media.

use axum::{extract::State, routing::post, Json, Router};
use hestia_common::{AppResult, PresignedUpload};
use hestia_core::{
    AttachMediaInput, BrowseFilter, DraftSnapshot, FieldErrors, ListingResponse, ListingWizard,
};
use hestia_db::entities::listing_media::Model as ListingMediaModel;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

fn validation_error(errors: &FieldErrors) -> hestia_common::AppError {
    let joined = errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ");
    hestia_common::AppError::Validation(joined)
}

/// Listing media response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: String,
    pub file_name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: i64,
    pub url: String,
    pub sort_order: i32,
    pub is_primary: bool,
    pub created_at: String,
}

impl From<ListingMediaModel> for MediaResponse {
    fn from(m: ListingMediaModel) -> Self {
        Self {
            id: m.id,
            file_name: m.file_name,
            content_type: m.content_type,
            size: m.size,
            url: m.url,
            sort_order: m.sort_order,
            is_primary: m.is_primary,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Save-draft request. Without a listing ID a new draft row is created.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    pub listing_id: Option<String>,
    #[serde(flatten)]
    pub snapshot: DraftSnapshot,
}

/// Persist the wizard state. No validation beyond the first two choices.
async fn save_draft(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SaveDraftRequest>,
) -> AppResult<ApiResponse<ListingResponse>> {
    let listing = state
        .listing_service
        .save_draft(&user.id, req.listing_id.as_deref(), req.snapshot)
        .await?;

    Ok(ApiResponse::ok(listing.into()))
}

/// Load-draft request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadDraftRequest {
    pub listing_id: String,
}

/// Load a saved wizard snapshot for resumption.
async fn load_draft(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LoadDraftRequest>,
) -> AppResult<ApiResponse<DraftSnapshot>> {
    let snapshot = state
        .listing_service
        .load_draft(&user.id, &req.listing_id)
        .await?;

    Ok(ApiResponse::ok(snapshot))
}

/// Show request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    pub listing_id: String,
}

/// Listing detail response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetailResponse {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub media: Vec<MediaResponse>,
}

/// Fetch a listing with its gallery. Published listings count a view.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<ListingDetailResponse>> {
    let listing = state
        .listing_service
        .get(&req.listing_id, viewer.as_ref())
        .await?;

    if listing.is_published {
        // Best-effort; a failed counter bump never blocks the page.
        if let Err(e) = state.listing_service.record_view(&listing.id).await {
            tracing::debug!(error = %e, "View counter bump failed");
        }
    }

    let media = state.media_service.list(&listing.id).await?;

    Ok(ApiResponse::ok(ListingDetailResponse {
        listing: listing.into(),
        media: media.into_iter().map(Into::into).collect(),
    }))
}

/// Browse published listings.
async fn browse(
    State(state): State<AppState>,
    Json(filter): Json<BrowseFilter>,
) -> AppResult<ApiResponse<Vec<ListingResponse>>> {
    let listings = state.listing_service.browse(filter).await?;

    Ok(ApiResponse::ok(
        listings.into_iter().map(Into::into).collect(),
    ))
}

/// Submit request: the full wizard snapshot, revalidated server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub listing_id: String,
    #[serde(flatten)]
    pub snapshot: DraftSnapshot,
}

/// Submission response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub listing: ListingResponse,
    pub queue_id: String,
    pub approval_status: hestia_db::entities::approval_queue::ApprovalStatus,
}

/// Submit a listing for review.
///
/// The snapshot is run through the same wizard state machine the client
/// uses, so a client that skipped validation cannot submit an invalid draft.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> AppResult<ApiResponse<SubmitResponse>> {
    let wizard = ListingWizard::from_snapshot(req.snapshot);
    let input = wizard
        .submit_for_review()
        .map_err(|errors| validation_error(&errors))?;

    let (listing, entry) = state
        .approval_service
        .submit(&user.id, &req.listing_id, input)
        .await?;

    // Coordinates are a nicety; fill them in after the fact if possible.
    if let Err(e) = state.listing_service.backfill_coordinates(&listing).await {
        tracing::debug!(error = %e, "Coordinate backfill failed");
    }

    Ok(ApiResponse::ok(SubmitResponse {
        listing: listing.into(),
        queue_id: entry.id,
        approval_status: entry.status,
    }))
}

/// Archive request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub listing_id: String,
}

/// Take a listing off the market.
async fn archive(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ArchiveRequest>,
) -> AppResult<ApiResponse<ListingResponse>> {
    let listing = state
        .approval_service
        .archive(&user.id, &req.listing_id)
        .await?;

    Ok(ApiResponse::ok(listing.into()))
}

/// Presign request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub listing_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
}

/// Presign response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub key: String,
    pub upload_url: String,
    pub headers: Vec<(String, String)>,
    pub public_url: String,
    pub expires_at: String,
}

impl From<PresignedUpload> for PresignResponse {
    fn from(p: PresignedUpload) -> Self {
        Self {
            key: p.key,
            upload_url: p.upload_url,
            headers: p.headers,
            public_url: p.public_url,
            expires_at: p.expires_at.to_rfc3339(),
        }
    }
}

/// Issue a presigned PUT target; the client uploads directly to storage.
async fn presign_media(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PresignRequest>,
) -> AppResult<ApiResponse<PresignResponse>> {
    let presigned = state
        .media_service
        .presign(
            &user.id,
            &req.listing_id,
            &req.file_name,
            &req.content_type,
            req.size,
        )
        .await?;

    Ok(ApiResponse::ok(presigned.into()))
}

/// Attach request: the client reports a finished upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRequest {
    pub listing_id: String,
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
}

/// Record an uploaded object as listing media.
async fn attach_media(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AttachRequest>,
) -> AppResult<ApiResponse<MediaResponse>> {
    let media = state
        .media_service
        .attach(
            &user.id,
            &req.listing_id,
            AttachMediaInput {
                storage_key: req.storage_key,
                file_name: req.file_name,
                content_type: req.content_type,
                size: req.size,
            },
        )
        .await?;

    Ok(ApiResponse::ok(media.into()))
}

/// Set-primary request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPrimaryRequest {
    pub media_id: String,
}

/// Flag a media item as the listing's primary image.
async fn set_primary(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetPrimaryRequest>,
) -> AppResult<ApiResponse<MediaResponse>> {
    let media = state
        .media_service
        .set_primary(&user.id, &req.media_id)
        .await?;

    Ok(ApiResponse::ok(media.into()))
}

/// Reorder request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub listing_id: String,
    pub ordered_ids: Vec<String>,
}

/// Rewrite the gallery order.
async fn reorder_media(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<ApiResponse<Vec<MediaResponse>>> {
    let media = state
        .media_service
        .reorder(&user.id, &req.listing_id, &req.ordered_ids)
        .await?;

    Ok(ApiResponse::ok(media.into_iter().map(Into::into).collect()))
}

/// Delete-media request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaRequest {
    pub media_id: String,
}

/// Remove a media item.
async fn delete_media(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteMediaRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.media_service.delete(&user.id, &req.media_id).await?;

    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(save_draft))
        .route("/update", post(save_draft))
        .route("/draft", post(load_draft))
        .route("/show", post(show))
        .route("/list", post(browse))
        .route("/submit", post(submit))
        .route("/archive", post(archive))
        // Media routes
        .route("/media/presign", post(presign_media))
        .route("/media/attach", post(attach_media))
        .route("/media/set-primary", post(set_primary))
        .route("/media/reorder", post(reorder_media))
        .route("/media/delete", post(delete_media))
}
