//! Transaction lifecycle and balance maintenance.
//!
//! Every mutation touches two rows: the transaction itself and the cached
//! `money` of the account reached through the pocket. Both writes run inside
//! one database transaction so a crash can never leave the ledger and the
//! balance disagreeing, and the balance is rejected before commit if it
//! would drop below zero.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    LedgerError, ResultLedger, accounts, transactions,
    transactions::signed_amount,
};

use super::{Ledger, normalize_optional_text};

pub struct NewTransaction {
    pub pocket_id: i32,
    pub amount: i64,
    pub is_income: bool,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// Partial transaction update: absent fields keep their stored value.
///
/// The pocket is fixed for the lifetime of a transaction; moving money
/// between pockets is a delete plus a create.
#[derive(Default)]
pub struct TransactionPatch {
    pub amount: Option<i64>,
    pub is_income: Option<bool>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

fn ensure_positive_amount(amount: i64) -> ResultLedger<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidInput(
            "el monto debe ser mayor que cero".to_string(),
        ));
    }
    Ok(())
}

impl Ledger {
    /// Creates a transaction and applies its signed effect to the account.
    pub async fn create_transaction(
        &self,
        user_id: i32,
        cmd: NewTransaction,
    ) -> ResultLedger<transactions::Model> {
        ensure_positive_amount(cmd.amount)?;

        let db_tx = self.database.begin().await?;

        let (pocket, account) = self
            .require_pocket_with_account(&db_tx, cmd.pocket_id, user_id)
            .await?;

        let new_money = account.money + signed_amount(cmd.amount, cmd.is_income);
        if new_money < 0 {
            return Err(LedgerError::InsufficientFunds(format!(
                "la cuenta \"{}\" quedaría en negativo",
                account.name
            )));
        }

        let created = transactions::ActiveModel {
            amount: ActiveValue::Set(cmd.amount),
            is_income: ActiveValue::Set(cmd.is_income),
            date: ActiveValue::Set(cmd.date),
            description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
            pocket_id: ActiveValue::Set(pocket.id),
            ..Default::default()
        }
        .insert(&db_tx)
        .await?;

        let account_update = accounts::ActiveModel {
            id: ActiveValue::Set(account.id),
            money: ActiveValue::Set(new_money),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        account_update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(created)
    }

    /// Updates a transaction: first reverses the stored version's effect,
    /// then applies the merged version's effect.
    pub async fn update_transaction(
        &self,
        user_id: i32,
        transaction_id: i32,
        patch: TransactionPatch,
    ) -> ResultLedger<transactions::Model> {
        if let Some(amount) = patch.amount {
            ensure_positive_amount(amount)?;
        }

        let db_tx = self.database.begin().await?;

        let stored = transactions::Entity::find_by_id(transaction_id)
            .one(&db_tx)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("transacción".to_string()))?;
        let (_, account) = self
            .require_pocket_with_account(&db_tx, stored.pocket_id, user_id)
            .await?;

        let amount = patch.amount.unwrap_or(stored.amount);
        let is_income = patch.is_income.unwrap_or(stored.is_income);
        let date = patch.date.unwrap_or(stored.date);
        let description = match patch.description.as_deref() {
            Some(text) => normalize_optional_text(Some(text)),
            None => stored.description.clone(),
        };

        let reversed = account.money - stored.signed_amount();
        let new_money = reversed + signed_amount(amount, is_income);
        if new_money < 0 {
            return Err(LedgerError::InsufficientFunds(format!(
                "la cuenta \"{}\" quedaría en negativo",
                account.name
            )));
        }

        let mut active: transactions::ActiveModel = stored.into();
        active.amount = ActiveValue::Set(amount);
        active.is_income = ActiveValue::Set(is_income);
        active.date = ActiveValue::Set(date);
        active.description = ActiveValue::Set(description);
        let updated = active.update(&db_tx).await?;

        let account_update = accounts::ActiveModel {
            id: ActiveValue::Set(account.id),
            money: ActiveValue::Set(new_money),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        account_update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(updated)
    }

    /// Deletes a transaction, reversing its effect on the account.
    pub async fn delete_transaction(&self, user_id: i32, transaction_id: i32) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;

        let stored = transactions::Entity::find_by_id(transaction_id)
            .one(&db_tx)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("transacción".to_string()))?;
        let (_, account) = self
            .require_pocket_with_account(&db_tx, stored.pocket_id, user_id)
            .await?;

        let new_money = account.money - stored.signed_amount();
        if new_money < 0 {
            return Err(LedgerError::InsufficientFunds(format!(
                "la cuenta \"{}\" quedaría en negativo",
                account.name
            )));
        }

        transactions::Entity::delete_by_id(stored.id)
            .exec(&db_tx)
            .await?;

        let account_update = accounts::ActiveModel {
            id: ActiveValue::Set(account.id),
            money: ActiveValue::Set(new_money),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        account_update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Lists a pocket's transactions, newest first.
    pub async fn list_transactions(
        &self,
        user_id: i32,
        pocket_id: i32,
    ) -> ResultLedger<Vec<transactions::Model>> {
        let (pocket, _) = self
            .require_pocket_with_account(&self.database, pocket_id, user_id)
            .await?;
        Ok(transactions::Entity::find()
            .filter(transactions::Column::PocketId.eq(pocket.id))
            .order_by_desc(transactions::Column::Date)
            .all(&self.database)
            .await?)
    }

    /// Lists a pocket's transactions inside an inclusive date range.
    pub async fn list_transactions_by_date(
        &self,
        user_id: i32,
        pocket_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultLedger<Vec<transactions::Model>> {
        let (pocket, _) = self
            .require_pocket_with_account(&self.database, pocket_id, user_id)
            .await?;
        Ok(transactions::Entity::find()
            .filter(transactions::Column::PocketId.eq(pocket.id))
            .filter(transactions::Column::Date.gte(from))
            .filter(transactions::Column::Date.lte(to))
            .order_by_desc(transactions::Column::Date)
            .all(&self.database)
            .await?)
    }

    /// Like [`Ledger::list_transactions_by_date`], restricted to one kind.
    pub async fn list_transactions_by_type_date(
        &self,
        user_id: i32,
        pocket_id: i32,
        is_income: bool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultLedger<Vec<transactions::Model>> {
        let (pocket, _) = self
            .require_pocket_with_account(&self.database, pocket_id, user_id)
            .await?;
        Ok(transactions::Entity::find()
            .filter(transactions::Column::PocketId.eq(pocket.id))
            .filter(transactions::Column::IsIncome.eq(is_income))
            .filter(transactions::Column::Date.gte(from))
            .filter(transactions::Column::Date.lte(to))
            .order_by_desc(transactions::Column::Date)
            .all(&self.database)
            .await?)
    }
}
