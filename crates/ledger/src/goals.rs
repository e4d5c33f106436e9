//! Savings goals table.
//!
//! A goal tracks progress over a date range against one or more targets
//! (see `goal_targets`); a goal without a target is invalid.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub description: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub max_money: i64,
    pub actual_progress: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::goal_targets::Entity")]
    GoalTargets,
}

impl Related<super::goal_targets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoalTargets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
