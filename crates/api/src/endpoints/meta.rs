//! Instance metadata endpoint.

use axum::{extract::State, routing::post, Router};
use hestia_common::AppResult;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Instance metadata: marketplace identity plus which optional integrations
/// are live, so clients can hide disabled surfaces.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    pub billing_enabled: bool,
    pub geocoding_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_provider: Option<&'static str>,
    pub storage_backend: &'static str,
}

/// Describe this instance.
async fn meta(State(state): State<AppState>) -> AppResult<ApiResponse<MetaResponse>> {
    Ok(ApiResponse::ok(MetaResponse {
        name: state.meta.name.clone(),
        description: state.meta.description.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        billing_enabled: state.meta.billing_enabled,
        geocoding_enabled: state.meta.geocoding_enabled,
        email_provider: state.meta.email_provider,
        storage_backend: state.meta.storage_backend,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/meta", post(meta))
}
