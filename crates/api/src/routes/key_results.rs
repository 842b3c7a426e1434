//! Key result routes: edits, ordering, progress and comments.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{patch, post, put},
};
use okrs_core::key_result::{KeyResultInput, StageUpdate};
use okrs_shared::KeyResultId;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::CommentRequest;
use super::goals::MoveRequest;
use crate::AppState;
use crate::error::respond;

/// Creates the key result routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/key-results/{kr_id}",
            patch(update_key_result).delete(delete_key_result),
        )
        .route("/key-results/{kr_id}/move", post(move_key_result))
        .route("/key-results/{kr_id}/progress/percent", put(set_percent))
        .route("/key-results/{kr_id}/progress/boolean", put(set_boolean))
        .route("/key-results/{kr_id}/progress/project", put(set_project))
        .route("/key-results/{kr_id}/comments", post(add_comment))
}

/// Request body for a percent or linear progress update.
#[derive(Debug, Deserialize)]
pub struct PercentProgressRequest {
    /// Latest measured value.
    pub current_value: Decimal,
}

/// Request body for a boolean progress update.
#[derive(Debug, Deserialize)]
pub struct BooleanProgressRequest {
    /// Whether the key result is achieved.
    pub is_done: bool,
}

/// Request body for a project progress update.
#[derive(Debug, Deserialize)]
pub struct ProjectProgressRequest {
    /// Stage completion flags; unknown stages are ignored.
    pub stages: Vec<StageUpdate>,
}

async fn update_key_result(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
    Json(input): Json<KeyResultInput>,
) -> Response {
    respond(
        StatusCode::OK,
        state.service.update_key_result(kr_id, input).await,
    )
}

async fn delete_key_result(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
) -> Response {
    respond(StatusCode::OK, state.service.delete_key_result(kr_id).await)
}

async fn move_key_result(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
    Json(body): Json<MoveRequest>,
) -> Response {
    let result = match body.direction() {
        Ok(direction) => state.service.move_key_result(kr_id, direction).await,
        Err(e) => Err(e),
    };
    respond(StatusCode::OK, result)
}

async fn set_percent(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
    Json(body): Json<PercentProgressRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        state
            .service
            .set_percent_progress(kr_id, body.current_value)
            .await,
    )
}

async fn set_boolean(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
    Json(body): Json<BooleanProgressRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        state.service.set_boolean_progress(kr_id, body.is_done).await,
    )
}

async fn set_project(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
    Json(body): Json<ProjectProgressRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        state.service.set_project_progress(kr_id, body.stages).await,
    )
}

async fn add_comment(
    State(state): State<AppState>,
    Path(kr_id): Path<KeyResultId>,
    Json(body): Json<CommentRequest>,
) -> Response {
    respond(
        StatusCode::CREATED,
        state.service.add_key_result_comment(kr_id, body.text).await,
    )
}
