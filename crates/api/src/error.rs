//! Mapping engine results to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use okrs_core::{OkrError, OkrResult};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

/// Converts an engine error into a JSON error response.
pub fn map_okr_error(e: &OkrError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() && !e.is_retryable() {
        error!(error = %e, code = e.error_code(), "Request failed");
    } else {
        warn!(error = %e, code = e.error_code(), "Request rejected");
    }
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}

/// Responds with `status` and the JSON body on success, or the mapped
/// error.
pub fn respond<T: Serialize>(status: StatusCode, result: OkrResult<T>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => map_okr_error(&e),
    }
}
