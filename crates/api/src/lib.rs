//! HTTP API layer for hestia-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: POST-RPC procedures mirroring the marketplace surface
//! - **Extractors**: Authentication
//! - **Middleware**: Bearer-token auth
//! - **Webhooks**: The raw-body Stripe endpoint
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{router, webhook_router};
pub use middleware::{AppState, MetaInfo};
