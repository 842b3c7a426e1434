//! Goal routes: edits, ordering, comments, sharing and key result creation.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
};
use okrs_core::goal::GoalInput;
use okrs_core::key_result::KeyResultInput;
use okrs_core::ordering::MoveDirection;
use okrs_core::sharing::ShareTarget;
use okrs_core::{OkrError, OkrResult};
use okrs_shared::{GoalId, TeamId};
use serde::Deserialize;

use super::CommentRequest;
use crate::AppState;
use crate::error::respond;

/// Creates the goal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/goals/{goal_id}",
            get(get_goal).patch(update_goal).delete(delete_goal),
        )
        .route("/goals/{goal_id}/move", post(move_goal))
        .route("/goals/{goal_id}/comments", post(add_comment))
        .route("/goals/{goal_id}/shares", put(share_goal))
        .route("/goals/{goal_id}/teams/{team_id}/weight", put(update_team_weight))
        .route("/goals/{goal_id}/key-results", post(add_key_result))
}

/// Request body for moving a goal or key result.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// `up`/`down`, or `-1`/`1`.
    pub direction: String,
    /// Team whose listing to reorder; the goal's origin when omitted.
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

impl MoveRequest {
    /// Parses the direction.
    pub fn direction(&self) -> OkrResult<MoveDirection> {
        MoveDirection::parse(&self.direction)
            .ok_or_else(|| OkrError::Validation(format!("unknown direction {}", self.direction)))
    }
}

/// Request body for replacing a goal's shares.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    /// Teams to share with; unlisted teams lose the goal.
    #[serde(default)]
    pub targets: Vec<ShareTarget>,
}

/// Request body for a team weight change.
#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    /// New weight.
    pub weight: u32,
}

async fn get_goal(State(state): State<AppState>, Path(goal_id): Path<GoalId>) -> Response {
    respond(StatusCode::OK, state.service.goal(goal_id).await)
}

async fn update_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
    Json(input): Json<GoalInput>,
) -> Response {
    respond(StatusCode::OK, state.service.update_goal(goal_id, input).await)
}

async fn delete_goal(State(state): State<AppState>, Path(goal_id): Path<GoalId>) -> Response {
    respond(StatusCode::OK, state.service.delete_goal(goal_id).await)
}

async fn move_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
    Json(body): Json<MoveRequest>,
) -> Response {
    let result = match body.direction() {
        Ok(direction) => state.service.move_goal(goal_id, body.team_id, direction).await,
        Err(e) => Err(e),
    };
    respond(StatusCode::OK, result)
}

async fn add_comment(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
    Json(body): Json<CommentRequest>,
) -> Response {
    respond(
        StatusCode::CREATED,
        state.service.add_goal_comment(goal_id, body.text).await,
    )
}

async fn share_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
    Json(body): Json<ShareRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        state.service.share_goal(goal_id, body.targets).await,
    )
}

async fn update_team_weight(
    State(state): State<AppState>,
    Path((goal_id, team_id)): Path<(GoalId, TeamId)>,
    Json(body): Json<WeightRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        state
            .service
            .update_goal_team_weight(goal_id, team_id, body.weight)
            .await,
    )
}

async fn add_key_result(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
    Json(input): Json<KeyResultInput>,
) -> Response {
    respond(
        StatusCode::CREATED,
        state.service.add_key_result(goal_id, input).await,
    )
}
