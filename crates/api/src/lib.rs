//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over [`okrs_core::OkrService`]
//! - Mapping of engine errors to JSON error responses

pub mod error;
pub mod routes;

use axum::Router;
use okrs_core::OkrService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The OKR engine.
    pub service: Arc<OkrService>,
}

impl AppState {
    /// Wraps a service.
    #[must_use]
    pub fn new(service: OkrService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
