//! API route definitions.

use axum::Router;
use chrono::Utc;
use okrs_core::OkrResult;
use okrs_core::quarter::Quarter;
use serde::Deserialize;

use crate::AppState;

pub mod goals;
pub mod health;
pub mod key_results;
pub mod teams;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(teams::routes())
        .merge(goals::routes())
        .merge(key_results::routes())
}

/// `year`/`quarter` query parameters, defaulting to the current quarter.
#[derive(Debug, Default, Deserialize)]
pub struct QuarterQuery {
    /// Calendar year.
    pub year: Option<i32>,
    /// Quarter number, 1..=4.
    pub quarter: Option<u8>,
}

impl QuarterQuery {
    /// Resolves the requested quarter.
    pub fn resolve(&self) -> OkrResult<Quarter> {
        let current = Quarter::containing(Utc::now().date_naive());
        Quarter::new(
            self.year.unwrap_or(current.year),
            self.quarter.unwrap_or(current.quarter),
        )
    }
}

/// Body of a comment request.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Comment text.
    pub text: String,
}
