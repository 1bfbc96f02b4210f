//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: infrastructure wiring (catalog, store, lifecycle service)
//!   and the external collaborator ports
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router with default wiring (public entrypoint used by
/// `main.rs`).
pub fn build_app() -> Router {
    build_app_with(services::build_services())
}

/// Build the router around explicitly constructed services (used by tests to
/// seed the store and pin the clock).
pub fn build_app_with(services: services::AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/price-validity", routes::validity::router())
        .layer(Extension(Arc::new(services)))
}
