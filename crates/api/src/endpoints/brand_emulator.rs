//! Brand emulator endpoints (super-admin only).

use axum::{extract::State, routing::post, Json, Router};
use hestia_common::AppResult;
use hestia_core::{
    BrandResponse, CreateBrandInput, ListingResponse, ListingWizard, UpdateBrandInput,
};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// List brand profiles.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BrandResponse>>> {
    let brands = state.brand_service.list(&user).await?;

    Ok(ApiResponse::ok(brands.into_iter().map(Into::into).collect()))
}

/// Create a brand profile.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBrandInput>,
) -> AppResult<ApiResponse<BrandResponse>> {
    let brand = state.brand_service.create(&user, req).await?;

    Ok(ApiResponse::ok(brand.into()))
}

/// Update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub brand_id: String,
    #[serde(flatten)]
    pub input: UpdateBrandInput,
}

/// Update a brand profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> AppResult<ApiResponse<BrandResponse>> {
    let brand = state
        .brand_service
        .update(&user, &req.brand_id, req.input)
        .await?;

    Ok(ApiResponse::ok(brand.into()))
}

/// Delete request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub brand_id: String,
}

/// Delete a brand profile.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.brand_service.delete(&user, &req.brand_id).await?;

    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

/// Seed request: a complete wizard snapshot plus the brand to emulate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedListingRequest {
    pub brand_id: String,
    #[serde(flatten)]
    pub snapshot: hestia_core::DraftSnapshot,
}

/// Seed a demo listing as a brand. Goes live immediately.
async fn seed_listing(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SeedListingRequest>,
) -> AppResult<ApiResponse<ListingResponse>> {
    let wizard = ListingWizard::from_snapshot(req.snapshot);
    let input = wizard.submit_for_review().map_err(|errors| {
        let joined = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        hestia_common::AppError::Validation(joined)
    })?;

    let listing = state
        .brand_service
        .seed_listing(&user, &req.brand_id, input)
        .await?;

    Ok(ApiResponse::ok(listing.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/seed-listing", post(seed_listing))
}
