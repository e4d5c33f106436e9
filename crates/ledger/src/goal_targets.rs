//! Goal targets table.
//!
//! Polymorphic reference from a goal to either an account or a tag pocket.

use sea_orm::entity::prelude::*;

use crate::LedgerError;

/// What a goal target points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalTargetKind {
    Account,
    Pocket,
}

impl GoalTargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Pocket => "pocket",
        }
    }
}

impl TryFrom<&str> for GoalTargetKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "account" => Ok(Self::Account),
            "pocket" => Ok(Self::Pocket),
            other => Err(LedgerError::InvalidInput(format!(
                "tipo de objetivo desconocido: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "goal_targets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub goal_id: i32,
    pub target_kind: String,
    pub target_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id"
    )]
    Goals,
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
