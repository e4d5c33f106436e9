//! Account CRUD and the statement view the chat context is built from.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{LedgerError, ResultLedger, accounts, categories, pockets, transactions};

use super::{Ledger, normalize_required_text};

pub struct NewAccount {
    pub name: String,
    pub money: i64,
    pub category_id: i32,
}

/// Partial account update: absent fields keep their stored value.
///
/// Setting `money` here rewrites the cached balance without touching the
/// ledger; the transaction operations are the only path that keeps the two
/// consistent.
#[derive(Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub money: Option<i64>,
    pub category_id: Option<i32>,
}

/// One pocket with its transactions, newest first.
pub struct PocketHistory {
    pub pocket: pockets::Model,
    pub transactions: Vec<transactions::Model>,
}

/// Everything the assistant context needs about one account.
pub struct AccountStatement {
    pub account: accounts::Model,
    pub category: categories::Model,
    pub pockets: Vec<PocketHistory>,
}

impl Ledger {
    /// Loads an account and checks it belongs to `user_id`.
    ///
    /// Foreign accounts are indistinguishable from missing ones.
    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: i32,
        user_id: i32,
    ) -> ResultLedger<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("cuenta".to_string()))
    }

    pub async fn create_account(
        &self,
        user_id: i32,
        cmd: NewAccount,
    ) -> ResultLedger<accounts::Model> {
        let name = normalize_required_text(&cmd.name, "el nombre de la cuenta")?;
        if cmd.money < 0 {
            return Err(LedgerError::InvalidInput(
                "el saldo inicial no puede ser negativo".to_string(),
            ));
        }
        categories::Entity::find_by_id(cmd.category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("categoría".to_string()))?;

        let taken = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Name.eq(name.clone()))
            .one(&self.database)
            .await?;
        if taken.is_some() {
            return Err(LedgerError::ExistingKey(name));
        }

        let now = Utc::now();
        let account = accounts::ActiveModel {
            name: ActiveValue::Set(name),
            money: ActiveValue::Set(cmd.money),
            user_id: ActiveValue::Set(user_id),
            category_id: ActiveValue::Set(cmd.category_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        Ok(account)
    }

    pub async fn list_accounts(&self, user_id: i32) -> ResultLedger<Vec<accounts::Model>> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Id)
            .all(&self.database)
            .await?)
    }

    pub async fn update_account(
        &self,
        user_id: i32,
        account_id: i32,
        update: AccountUpdate,
    ) -> ResultLedger<accounts::Model> {
        let account = self
            .require_account(&self.database, account_id, user_id)
            .await?;
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = update.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "el nombre de la cuenta")?);
        }
        if let Some(money) = update.money {
            if money < 0 {
                return Err(LedgerError::InvalidInput(
                    "el saldo no puede ser negativo".to_string(),
                ));
            }
            active.money = ActiveValue::Set(money);
        }
        if let Some(category_id) = update.category_id {
            categories::Entity::find_by_id(category_id)
                .one(&self.database)
                .await?
                .ok_or_else(|| LedgerError::KeyNotFound("categoría".to_string()))?;
            active.category_id = ActiveValue::Set(category_id);
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        Ok(active.update(&self.database).await?)
    }

    /// Deletes the account; pockets, transactions and chat cascade with it.
    pub async fn delete_account(&self, user_id: i32, account_id: i32) -> ResultLedger<()> {
        let account = self
            .require_account(&self.database, account_id, user_id)
            .await?;
        accounts::Entity::delete_by_id(account.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Full statement of one account: category, balance and the per-pocket
    /// transaction history.
    pub async fn account_statement(
        &self,
        user_id: i32,
        account_id: i32,
    ) -> ResultLedger<AccountStatement> {
        let account = self
            .require_account(&self.database, account_id, user_id)
            .await?;
        let category = categories::Entity::find_by_id(account.category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("categoría".to_string()))?;

        let pocket_models = pockets::Entity::find()
            .filter(pockets::Column::AccountId.eq(account.id))
            .order_by_asc(pockets::Column::Id)
            .all(&self.database)
            .await?;

        let mut histories = Vec::with_capacity(pocket_models.len());
        for pocket in pocket_models {
            let txs = transactions::Entity::find()
                .filter(transactions::Column::PocketId.eq(pocket.id))
                .order_by_desc(transactions::Column::Date)
                .all(&self.database)
                .await?;
            histories.push(PocketHistory {
                pocket,
                transactions: txs,
            });
        }

        Ok(AccountStatement {
            account,
            category,
            pockets: histories,
        })
    }
}
