//! Savings goals: CRUD plus progress recomputation.
//!
//! Goals have no owner column; ownership is resolved through their targets
//! (the referenced account or pocket must belong to the caller).

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    GoalTargetKind, LedgerError, ResultLedger, goal_targets, goals, pockets, transactions,
};

use super::Ledger;

/// A target as provided by the caller.
#[derive(Clone, Copy)]
pub struct GoalTargetSpec {
    pub kind: GoalTargetKind,
    pub target_id: i32,
}

pub struct NewGoal {
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_money: i64,
    pub targets: Vec<GoalTargetSpec>,
}

/// Partial goal update. Providing `target` replaces every stored target row
/// with the single new one (replacement, not addition).
#[derive(Default)]
pub struct GoalUpdate {
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_money: Option<i64>,
    pub target: Option<GoalTargetSpec>,
}

#[derive(Debug)]
pub struct GoalWithTargets {
    pub goal: goals::Model,
    pub targets: Vec<goal_targets::Model>,
}

impl Ledger {
    async fn ensure_target_owned<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
        target: GoalTargetSpec,
    ) -> ResultLedger<()> {
        match target.kind {
            GoalTargetKind::Account => {
                self.require_account(conn, target.target_id, user_id).await?;
            }
            GoalTargetKind::Pocket => {
                self.require_pocket_with_account(conn, target.target_id, user_id)
                    .await?;
            }
        }
        Ok(())
    }

    async fn targets_of<C: ConnectionTrait>(
        &self,
        conn: &C,
        goal_id: i32,
    ) -> ResultLedger<Vec<goal_targets::Model>> {
        Ok(goal_targets::Entity::find()
            .filter(goal_targets::Column::GoalId.eq(goal_id))
            .order_by_asc(goal_targets::Column::Id)
            .all(conn)
            .await?)
    }

    /// A goal is visible to a user when at least one of its targets points
    /// at something the user owns.
    async fn require_goal<C: ConnectionTrait>(
        &self,
        conn: &C,
        goal_id: i32,
        user_id: i32,
    ) -> ResultLedger<GoalWithTargets> {
        let goal = goals::Entity::find_by_id(goal_id)
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("objetivo".to_string()))?;
        let targets = self.targets_of(conn, goal.id).await?;

        for target in &targets {
            let spec = GoalTargetSpec {
                kind: GoalTargetKind::try_from(target.target_kind.as_str())?,
                target_id: target.target_id,
            };
            if self.ensure_target_owned(conn, user_id, spec).await.is_ok() {
                return Ok(GoalWithTargets { goal, targets });
            }
        }
        Err(LedgerError::KeyNotFound("objetivo".to_string()))
    }

    pub async fn create_goal(&self, user_id: i32, cmd: NewGoal) -> ResultLedger<GoalWithTargets> {
        if cmd.targets.is_empty() {
            return Err(LedgerError::InvalidInput(
                "un objetivo necesita al menos una meta".to_string(),
            ));
        }
        if cmd.end_date < cmd.start_date {
            return Err(LedgerError::InvalidInput(
                "la fecha final es anterior a la inicial".to_string(),
            ));
        }
        if cmd.max_money <= 0 {
            return Err(LedgerError::InvalidInput(
                "el monto objetivo debe ser mayor que cero".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        for target in &cmd.targets {
            self.ensure_target_owned(&db_tx, user_id, *target).await?;
        }

        let goal = goals::ActiveModel {
            description: ActiveValue::Set(cmd.description.trim().to_string()),
            start_date: ActiveValue::Set(cmd.start_date),
            end_date: ActiveValue::Set(cmd.end_date),
            max_money: ActiveValue::Set(cmd.max_money),
            actual_progress: ActiveValue::Set(0),
            ..Default::default()
        }
        .insert(&db_tx)
        .await?;

        for target in &cmd.targets {
            goal_targets::ActiveModel {
                goal_id: ActiveValue::Set(goal.id),
                target_kind: ActiveValue::Set(target.kind.as_str().to_string()),
                target_id: ActiveValue::Set(target.target_id),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
        }

        let targets = self.targets_of(&db_tx, goal.id).await?;
        db_tx.commit().await?;

        Ok(GoalWithTargets { goal, targets })
    }

    pub async fn goal(&self, user_id: i32, goal_id: i32) -> ResultLedger<GoalWithTargets> {
        self.require_goal(&self.database, goal_id, user_id).await
    }

    /// Lists every goal whose targets touch the user's accounts or pockets.
    pub async fn list_goals(&self, user_id: i32) -> ResultLedger<Vec<GoalWithTargets>> {
        let all = goals::Entity::find()
            .order_by_asc(goals::Column::Id)
            .all(&self.database)
            .await?;

        let mut visible = Vec::new();
        for goal in all {
            if let Ok(with_targets) = self.require_goal(&self.database, goal.id, user_id).await {
                visible.push(with_targets);
            }
        }
        Ok(visible)
    }

    pub async fn update_goal(
        &self,
        user_id: i32,
        goal_id: i32,
        update: GoalUpdate,
    ) -> ResultLedger<GoalWithTargets> {
        let db_tx = self.database.begin().await?;

        let current = self.require_goal(&db_tx, goal_id, user_id).await?;
        let mut active: goals::ActiveModel = current.goal.into();

        if let Some(description) = update.description.as_deref() {
            active.description = ActiveValue::Set(description.trim().to_string());
        }
        if let Some(start_date) = update.start_date {
            active.start_date = ActiveValue::Set(start_date);
        }
        if let Some(end_date) = update.end_date {
            active.end_date = ActiveValue::Set(end_date);
        }
        if let Some(max_money) = update.max_money {
            if max_money <= 0 {
                return Err(LedgerError::InvalidInput(
                    "el monto objetivo debe ser mayor que cero".to_string(),
                ));
            }
            active.max_money = ActiveValue::Set(max_money);
        }
        let goal = active.update(&db_tx).await?;

        if let Some(target) = update.target {
            self.ensure_target_owned(&db_tx, user_id, target).await?;
            goal_targets::Entity::delete_many()
                .filter(goal_targets::Column::GoalId.eq(goal.id))
                .exec(&db_tx)
                .await?;
            goal_targets::ActiveModel {
                goal_id: ActiveValue::Set(goal.id),
                target_kind: ActiveValue::Set(target.kind.as_str().to_string()),
                target_id: ActiveValue::Set(target.target_id),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
        }

        let targets = self.targets_of(&db_tx, goal.id).await?;
        db_tx.commit().await?;

        Ok(GoalWithTargets { goal, targets })
    }

    pub async fn delete_goal(&self, user_id: i32, goal_id: i32) -> ResultLedger<()> {
        let current = self.require_goal(&self.database, goal_id, user_id).await?;
        goals::Entity::delete_by_id(current.goal.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Recomputes the goal's progress as the net signed sum of transactions
    /// under its targets within the goal's date range, stores it and returns
    /// the refreshed goal.
    pub async fn goal_progress(&self, user_id: i32, goal_id: i32) -> ResultLedger<GoalWithTargets> {
        let current = self.require_goal(&self.database, goal_id, user_id).await?;

        let mut progress: i64 = 0;
        for target in &current.targets {
            let kind = GoalTargetKind::try_from(target.target_kind.as_str())?;
            let txs = match kind {
                GoalTargetKind::Pocket => {
                    transactions::Entity::find()
                        .filter(transactions::Column::PocketId.eq(target.target_id))
                        .filter(transactions::Column::Date.gte(current.goal.start_date))
                        .filter(transactions::Column::Date.lte(current.goal.end_date))
                        .all(&self.database)
                        .await?
                }
                GoalTargetKind::Account => {
                    transactions::Entity::find()
                        .join(JoinType::InnerJoin, transactions::Relation::Pockets.def())
                        .filter(pockets::Column::AccountId.eq(target.target_id))
                        .filter(transactions::Column::Date.gte(current.goal.start_date))
                        .filter(transactions::Column::Date.lte(current.goal.end_date))
                        .all(&self.database)
                        .await?
                }
            };
            progress += txs.iter().map(transactions::Model::signed_amount).sum::<i64>();
        }

        let mut active: goals::ActiveModel = current.goal.into();
        active.actual_progress = ActiveValue::Set(progress);
        let goal = active.update(&self.database).await?;

        Ok(GoalWithTargets {
            goal,
            targets: current.targets,
        })
    }
}
