//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the admin registry
//! - `routes/`: HTTP routes + handlers (one file per admin model)
//! - `dto.rs`: request/response DTOs
//! - `lookups.rs`: display strings for foreign keys
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod lookups;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/admin", routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::log_requests))
                .layer(Extension(services)),
        )
}
