//! API endpoint modules.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod brand_emulator;
pub mod developer;
pub mod listings;
pub mod meta;
pub mod uploads;
pub mod webhooks;

use axum::Router;

use crate::middleware::AppState;

/// The `/api` router.
#[must_use]
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/listings", listings::router())
        .nest("/developer", developer::router())
        .nest("/admin", admin::router())
        .nest("/billing", billing::router())
        .nest("/brand-emulator", brand_emulator::router())
        .nest("/uploads", uploads::router())
        .merge(meta::router())
}

/// The `/webhooks` router, mounted outside `/api`.
#[must_use]
pub fn webhook_router() -> Router<AppState> {
    webhooks::router()
}
