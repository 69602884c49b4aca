//! Local direct-upload endpoint.
//!
//! Stands in for S3 when the deployment runs on local storage: presigned
//! upload URLs point here and the handler writes the bytes to disk. With the
//! S3 backend configured this route never sees traffic.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::put,
    Json, Router,
};
use hestia_common::AppResult;
use serde_json::json;

use crate::middleware::AppState;

/// Accept a direct PUT for a presigned local upload.
async fn put_upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let url = state
        .media_service
        .store_direct(&key, &body, content_type)
        .await?;

    Ok(Json(json!({ "key": key, "url": url })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{*key}", put(put_upload))
}
