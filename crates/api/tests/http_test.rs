//! End-to-end tests driving the router against an in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use okrs_api::{AppState, create_router};
use okrs_core::OkrService;
use okrs_core::hierarchy::{Team, TeamType};
use okrs_db::MemoryStore;
use okrs_shared::{EngineConfig, TeamId};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const ORG: TeamId = TeamId::from_u128(1);
const ALPHA: TeamId = TeamId::from_u128(2);
const BRAVO: TeamId = TeamId::from_u128(3);

fn app() -> Router {
    let team = |id, name: &str, type_label, parent_id| Team {
        id,
        name: name.into(),
        type_label,
        parent_id,
    };
    let store = Arc::new(MemoryStore::with_teams(vec![
        team(ORG, "Engineering", TeamType::Cluster, None),
        team(ALPHA, "Alpha", TeamType::Team, Some(ORG)),
        team(BRAVO, "Bravo", TeamType::Team, Some(ORG)),
    ]));
    let service = OkrService::new(store, &EngineConfig { lock_timeout_ms: 2_000 });
    create_router(AppState::new(service))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(format!("/api/v1{uri}"));
    let body = match body {
        Some(value) => {
            request = request.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn goal_body(title: &str, weight: u32) -> Value {
    json!({
        "title": title,
        "priority": "P1",
        "weight": weight,
        "work_type": "Delivery",
        "focus_type": "STABILITY",
        "owner_text": "Lead"
    })
}

fn team_path(team: TeamId) -> String {
    format!("/teams/{team}/quarters/2026/2")
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_hierarchy_lists_teams_depth_first() {
    let (status, body) = call(&app(), Method::GET, "/hierarchy", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|option| option["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Engineering", "Alpha", "Bravo"]);
}

#[tokio::test]
async fn test_goal_lifecycle_over_http() {
    let app = app();

    let (status, view) = call(
        &app,
        Method::POST,
        &format!("{}/goals", team_path(ALPHA)),
        Some(goal_body("Ship", 40)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["status"], "forming");
    let goal_id = view["goals"][0]["id"].as_str().unwrap().to_string();

    let (status, view) = call(
        &app,
        Method::POST,
        &format!("/goals/{goal_id}/key-results"),
        Some(json!({
            "title": "Latency",
            "weight": 60,
            "measure": {
                "kind": "LINEAR",
                "start_value": "0",
                "target_value": "100",
                "current_value": "50"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["goals"][0]["progress"], 30);
    assert_eq!(view["progress"], 12);
    let kr_id = view["goals"][0]["key_results"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, view) = call(
        &app,
        Method::PUT,
        &format!("/key-results/{kr_id}/progress/percent"),
        Some(json!({ "current_value": "75" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["goals"][0]["progress"], 45);
    assert_eq!(view["progress"], 18);

    let (status, view) = call(
        &app,
        Method::POST,
        &format!("/goals/{goal_id}/key-results"),
        Some(json!({
            "title": "Launched",
            "weight": 40,
            "measure": { "kind": "BOOLEAN", "is_done": true }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["goals"][0]["progress"], 85);
    assert_eq!(view["progress"], 34);

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/goals/{goal_id}/shares"),
        Some(json!({ "targets": [{ "team_id": BRAVO, "weight": 50 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, bravo) = call(
        &app,
        Method::GET,
        &format!("/teams/{BRAVO}/okr?year=2026&quarter=2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bravo["goals"][0]["weight"], 50);
    assert_eq!(bravo["goals"][0]["is_shared"], true);
    assert_eq!(bravo["progress"], 43);

    let (status, view) = call(
        &app,
        Method::PUT,
        &format!("{}/status", team_path(ALPHA)),
        Some(json!({ "status": "validated" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["locked"], true);

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/key-results/{kr_id}"),
        Some(json!({ "title": "Latency", "weight": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "QUARTER_LOCKED");

    let (status, view) = call(
        &app,
        Method::PUT,
        &format!("/key-results/{kr_id}/progress/percent"),
        Some(json!({ "current_value": "100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["goals"][0]["progress"], 100);

    let (status, view) = call(
        &app,
        Method::POST,
        &format!("/key-results/{kr_id}/comments"),
        Some(json!({ "text": "  done  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["goals"][0]["key_results"][0]["comments"][0]["text"], "done");
}

#[tokio::test]
async fn test_rejections_map_to_error_bodies() {
    let app = app();
    let (_, view) = call(
        &app,
        Method::POST,
        &format!("{}/goals", team_path(ALPHA)),
        Some(goal_body("Ship", 40)),
    )
    .await;
    let goal_id = view["goals"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/goals/{goal_id}/comments"),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EMPTY_COMMENT");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/goals/{goal_id}/move"),
        Some(json!({ "direction": "sideways" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("{}/status", team_path(ALPHA)),
        Some(json!({ "status": "no_goals" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let missing = TeamId::from_u128(99);
    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/goals/{missing}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/goals/{goal_id}/shares"),
        Some(json!({ "targets": [{ "team_id": missing, "weight": 10 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SHARE_TARGET");
}
