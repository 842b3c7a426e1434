//! Demo organization and OKRs.

use okrs_core::OkrResult;
use okrs_core::OkrService;
use okrs_core::goal::{FocusType, GoalInput, Priority, WorkType};
use okrs_core::hierarchy::{Team, TeamType};
use okrs_core::key_result::KeyResultInput;
use okrs_core::measure::{MeasureSeed, PercentMeasure, StageSeed};
use okrs_core::quarter::Quarter;
use okrs_shared::{GoalId, TeamId};
use rust_decimal::Decimal;
use tracing::info;

/// The engineering cluster all demo teams report to.
pub const ENGINEERING: TeamId = TeamId::from_u128(1);
/// Demo delivery teams.
pub const DEMO_TEAMS: [(TeamId, &str); 3] = [
    (TeamId::from_u128(2), "Platform"),
    (TeamId::from_u128(3), "Payments"),
    (TeamId::from_u128(4), "Growth"),
];

/// The demo team tree: one cluster with three teams.
#[must_use]
pub fn demo_teams() -> Vec<Team> {
    let mut teams = vec![Team {
        id: ENGINEERING,
        name: "Engineering".into(),
        type_label: TeamType::Cluster,
        parent_id: None,
    }];
    teams.extend(DEMO_TEAMS.iter().map(|(id, name)| Team {
        id: *id,
        name: (*name).to_string(),
        type_label: TeamType::Team,
        parent_id: Some(ENGINEERING),
    }));
    teams
}

/// Creates two goals per demo team through the service: a reliability
/// goal measured by a half-done project and an adoption goal measured by
/// a percent key result. The store must already know the demo teams.
pub async fn seed_demo(service: &OkrService, quarter: Quarter) -> OkrResult<()> {
    for (team_id, name) in DEMO_TEAMS {
        let reliability = create_goal(
            service,
            team_id,
            quarter,
            GoalInput {
                title: format!("Improve reliability for {name}"),
                description: "Reduce incidents and improve on-call experience.".into(),
                priority: Priority::P1,
                weight: 60,
                work_type: WorkType::Delivery,
                focus_type: FocusType::Stability,
                owner_text: "Engineering Lead".into(),
            },
        )
        .await?;
        service
            .add_key_result(
                reliability,
                KeyResultInput {
                    title: "Incident reduction project".into(),
                    description: "Deliver reliability initiatives.".into(),
                    weight: 100,
                    measure: Some(MeasureSeed::Project {
                        stages: vec![
                            StageSeed {
                                id: None,
                                title: "Audit".into(),
                                weight: 40,
                                is_done: true,
                            },
                            StageSeed {
                                id: None,
                                title: "Remediations".into(),
                                weight: 60,
                                is_done: false,
                            },
                        ],
                    }),
                },
            )
            .await?;

        let adoption = create_goal(
            service,
            team_id,
            quarter,
            GoalInput {
                title: format!("Grow adoption for {name}"),
                description: "Ship features that increase engagement.".into(),
                priority: Priority::P2,
                weight: 40,
                work_type: WorkType::Discovery,
                focus_type: FocusType::SpeedEfficiency,
                owner_text: "Product Manager".into(),
            },
        )
        .await?;
        service
            .add_key_result(
                adoption,
                KeyResultInput {
                    title: "MAU growth".into(),
                    description: "Increase monthly active usage.".into(),
                    weight: 100,
                    measure: Some(MeasureSeed::Percent(PercentMeasure {
                        start_value: Decimal::from(1000),
                        target_value: Decimal::from(1500),
                        current_value: Decimal::from(1200),
                        checkpoints: Vec::new(),
                    })),
                },
            )
            .await?;
        info!(team_id = %team_id, team = name, quarter = %quarter, "Seeded demo goals");
    }
    Ok(())
}

async fn create_goal(
    service: &OkrService,
    team_id: TeamId,
    quarter: Quarter,
    input: GoalInput,
) -> OkrResult<GoalId> {
    let title = input.title.clone();
    let view = service.create_goal(team_id, quarter, input).await?;
    view.goals
        .iter()
        .rev()
        .find(|goal| goal.title == title)
        .map(|goal| goal.id)
        .ok_or_else(|| okrs_core::OkrError::Storage(format!("created goal {title} not found")))
}
