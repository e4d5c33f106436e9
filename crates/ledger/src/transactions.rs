//! Transactions table.
//!
//! A transaction is the authoritative ledger entry; the owning account's
//! `money` column caches the sum of signed amounts.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount: i64,
    pub is_income: bool,
    pub date: DateTimeUtc,
    pub description: Option<String>,
    pub pocket_id: i32,
}

impl Model {
    /// Signed effect of this transaction on its account balance.
    pub fn signed_amount(&self) -> i64 {
        signed_amount(self.amount, self.is_income)
    }
}

/// `+amount` for income, `-amount` for expense.
pub fn signed_amount(amount: i64, is_income: bool) -> i64 {
    if is_income { amount } else { -amount }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pockets::Entity",
        from = "Column::PocketId",
        to = "super::pockets::Column::Id"
    )]
    Pockets,
}

impl Related<super::pockets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pockets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::signed_amount;

    #[test]
    fn income_is_positive_expense_is_negative() {
        assert_eq!(signed_amount(100, true), 100);
        assert_eq!(signed_amount(100, false), -100);
    }
}
