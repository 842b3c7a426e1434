//! Team listing, team-quarter views, status changes and goal creation.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
};
use okrs_core::goal::GoalInput;
use okrs_core::quarter::{Quarter, QuarterStatus};
use okrs_core::OkrError;
use okrs_shared::TeamId;
use serde::Deserialize;
use tracing::info;

use super::QuarterQuery;
use crate::AppState;
use crate::error::respond;

/// Creates the team routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hierarchy", get(hierarchy))
        .route("/teams/options", get(team_options))
        .route("/teams", get(list_teams))
        .route("/teams/{team_id}/okr", get(team_okr))
        .route(
            "/teams/{team_id}/quarters/{year}/{quarter}/status",
            put(set_status),
        )
        .route(
            "/teams/{team_id}/quarters/{year}/{quarter}/goals",
            post(create_goal),
        )
}

/// Query parameters for the quarter dashboard.
#[derive(Debug, Deserialize)]
pub struct TeamsQuery {
    /// Calendar year.
    pub year: Option<i32>,
    /// Quarter number.
    pub quarter: Option<u8>,
    /// Limit rows to this team's subtree.
    pub org_id: Option<TeamId>,
}

/// Query parameters for the team picker.
#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    /// Team to mark as selected.
    pub selected: Option<TeamId>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status, e.g. `validated`.
    pub status: String,
}

async fn hierarchy(State(state): State<AppState>) -> Response {
    respond(StatusCode::OK, state.service.hierarchy().await)
}

async fn team_options(
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> Response {
    respond(
        StatusCode::OK,
        state.service.team_options(query.selected).await,
    )
}

async fn list_teams(State(state): State<AppState>, Query(query): Query<TeamsQuery>) -> Response {
    let quarter = QuarterQuery {
        year: query.year,
        quarter: query.quarter,
    };
    let result = match quarter.resolve() {
        Ok(quarter) => {
            state
                .service
                .teams_for_quarter(quarter, query.org_id)
                .await
        }
        Err(e) => Err(e),
    };
    respond(StatusCode::OK, result)
}

async fn team_okr(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
    Query(query): Query<QuarterQuery>,
) -> Response {
    let result = match query.resolve() {
        Ok(quarter) => state.service.team_okr(team_id, quarter).await,
        Err(e) => Err(e),
    };
    respond(StatusCode::OK, result)
}

async fn set_status(
    State(state): State<AppState>,
    Path((team_id, year, quarter)): Path<(TeamId, i32, u8)>,
    Json(body): Json<StatusRequest>,
) -> Response {
    let result = async {
        let quarter = Quarter::new(year, quarter)?;
        let status = QuarterStatus::parse(&body.status)
            .ok_or_else(|| OkrError::Validation(format!("unknown status {}", body.status)))?;
        let view = state.service.set_status(team_id, quarter, status).await?;
        info!(team_id = %team_id, quarter = %quarter, status = %view.status, "Status request handled");
        Ok::<_, OkrError>(view)
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn create_goal(
    State(state): State<AppState>,
    Path((team_id, year, quarter)): Path<(TeamId, i32, u8)>,
    Json(input): Json<GoalInput>,
) -> Response {
    let result = match Quarter::new(year, quarter) {
        Ok(quarter) => state.service.create_goal(team_id, quarter, input).await,
        Err(e) => Err(e),
    };
    respond(StatusCode::CREATED, result)
}
