//! Shared fixtures for store-backed service tests.

#![allow(dead_code)]

use okrs_core::OkrService;
use okrs_core::goal::{FocusType, GoalInput, Priority, WorkType};
use okrs_core::hierarchy::{Team, TeamType};
use okrs_core::key_result::KeyResultInput;
use okrs_core::measure::{BooleanMeasure, MeasureSeed, PercentMeasure};
use okrs_core::quarter::Quarter;
use okrs_core::service::TeamOkrView;
use okrs_db::MemoryStore;
use okrs_shared::{EngineConfig, GoalId, KeyResultId, TeamId};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const ORG: TeamId = TeamId::from_u128(1);
pub const TEAM_A: TeamId = TeamId::from_u128(2);
pub const TEAM_B: TeamId = TeamId::from_u128(3);
pub const TEAM_C: TeamId = TeamId::from_u128(4);

pub fn quarter() -> Quarter {
    Quarter::new(2026, 2).unwrap()
}

pub fn teams() -> Vec<Team> {
    let team = |id, name: &str, type_label, parent_id| Team {
        id,
        name: name.into(),
        type_label,
        parent_id,
    };
    vec![
        team(ORG, "Engineering", TeamType::Cluster, None),
        team(TEAM_A, "Alpha", TeamType::Team, Some(ORG)),
        team(TEAM_B, "Bravo", TeamType::Team, Some(ORG)),
        team(TEAM_C, "Charlie", TeamType::Team, Some(ORG)),
    ]
}

pub fn service_with(store: Arc<MemoryStore>, lock_timeout_ms: u64) -> OkrService {
    OkrService::new(store, &EngineConfig { lock_timeout_ms })
}

pub fn service() -> (Arc<MemoryStore>, OkrService) {
    let store = Arc::new(MemoryStore::with_teams(teams()));
    let service = service_with(store.clone(), 2_000);
    (store, service)
}

pub fn goal_input(title: &str, weight: u32) -> GoalInput {
    GoalInput {
        title: title.into(),
        description: String::new(),
        priority: Priority::P1,
        weight,
        work_type: WorkType::Delivery,
        focus_type: FocusType::Stability,
        owner_text: "Lead".into(),
    }
}

pub fn percent(start: i64, target: i64, current: i64) -> MeasureSeed {
    MeasureSeed::Percent(PercentMeasure {
        start_value: Decimal::from(start),
        target_value: Decimal::from(target),
        current_value: Decimal::from(current),
        checkpoints: Vec::new(),
    })
}

pub fn boolean(is_done: bool) -> MeasureSeed {
    MeasureSeed::Boolean(BooleanMeasure { is_done })
}

pub fn kr_input(title: &str, weight: u32, measure: Option<MeasureSeed>) -> KeyResultInput {
    KeyResultInput {
        title: title.into(),
        description: String::new(),
        weight,
        measure,
    }
}

pub fn goal_id(view: &TeamOkrView, title: &str) -> GoalId {
    view.goals
        .iter()
        .find(|goal| goal.title == title)
        .map(|goal| goal.id)
        .unwrap()
}

pub fn kr_id(view: &TeamOkrView, title: &str) -> KeyResultId {
    view.goals
        .iter()
        .flat_map(|goal| &goal.key_results)
        .find(|kr| kr.title == title)
        .map(|kr| kr.id)
        .unwrap()
}

/// Team A with goal G (weight 40): KR1 PERCENT 0→50 at 25 (weight 60) and
/// KR2 BOOLEAN done (weight 40).
pub async fn scenario(service: &OkrService) -> TeamOkrView {
    let view = service
        .create_goal(TEAM_A, quarter(), goal_input("G", 40))
        .await
        .unwrap();
    let g = goal_id(&view, "G");
    service
        .add_key_result(g, kr_input("KR1", 60, Some(percent(0, 50, 25))))
        .await
        .unwrap();
    service
        .add_key_result(g, kr_input("KR2", 40, Some(boolean(true))))
        .await
        .unwrap()
}
