//! Savings goal API endpoints.

use api_types::goal::{GoalNew, GoalUpdate, GoalView, Target, TargetKind};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use ledger::{GoalTargetKind, GoalTargetSpec, GoalWithTargets};

use crate::{ServerError, auth::Identity, server::ServerState};

fn map_kind(kind: TargetKind) -> GoalTargetKind {
    match kind {
        TargetKind::Account => GoalTargetKind::Account,
        TargetKind::Pocket => GoalTargetKind::Pocket,
    }
}

fn view(goal: GoalWithTargets) -> Result<GoalView, ServerError> {
    let mut targets = Vec::with_capacity(goal.targets.len());
    for target in goal.targets {
        let target_type = match GoalTargetKind::try_from(target.target_kind.as_str())? {
            GoalTargetKind::Account => TargetKind::Account,
            GoalTargetKind::Pocket => TargetKind::Pocket,
        };
        targets.push(Target {
            target_type,
            target_id: target.target_id,
        });
    }
    Ok(GoalView {
        id: goal.goal.id,
        description: goal.goal.description,
        start_date: goal.goal.start_date,
        end_date: goal.goal.end_date,
        max_money: goal.goal.max_money,
        actual_progress: goal.goal.actual_progress,
        targets,
    })
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let goal = state
        .ledger
        .create_goal(
            identity.user_id,
            ledger::NewGoal {
                description: payload.description,
                start_date: payload.start_date,
                end_date: payload.end_date,
                max_money: payload.max_money,
                targets: payload
                    .targets
                    .into_iter()
                    .map(|t| GoalTargetSpec {
                        kind: map_kind(t.target_type),
                        target_id: t.target_id,
                    })
                    .collect(),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(goal)?)))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state.ledger.list_goals(identity.user_id).await?;
    let mut out = Vec::with_capacity(goals.len());
    for goal in goals {
        out.push(view(goal)?);
    }
    Ok(Json(out))
}

pub async fn get(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.ledger.goal(identity.user_id, id).await?;
    Ok(Json(view(goal)?))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state
        .ledger
        .update_goal(
            identity.user_id,
            id,
            ledger::GoalUpdate {
                description: payload.description,
                start_date: payload.start_date,
                end_date: payload.end_date,
                max_money: payload.max_money,
                target: payload.target.map(|t| GoalTargetSpec {
                    kind: map_kind(t.target_type),
                    target_id: t.target_id,
                }),
            },
        )
        .await?;
    Ok(Json(view(goal)?))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_goal(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recomputes and returns the goal with refreshed progress.
pub async fn progress(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.ledger.goal_progress(identity.user_id, id).await?;
    Ok(Json(view(goal)?))
}
