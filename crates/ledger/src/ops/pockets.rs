//! Tag pocket CRUD.
//!
//! Deleting a pocket removes its transactions, so the cached account balance
//! has to give back their net effect inside the same database transaction.

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{LedgerError, ResultLedger, accounts, pockets, transactions};

use super::{Ledger, normalize_optional_text, normalize_required_text};

pub struct NewPocket {
    pub name: String,
    pub description: Option<String>,
    pub account_id: i32,
}

/// Partial pocket update.
#[derive(Default)]
pub struct PocketUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Ledger {
    /// Loads a pocket together with its account, checking ownership.
    pub(super) async fn require_pocket_with_account<C: ConnectionTrait>(
        &self,
        conn: &C,
        pocket_id: i32,
        user_id: i32,
    ) -> ResultLedger<(pockets::Model, accounts::Model)> {
        let pocket = pockets::Entity::find_by_id(pocket_id)
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("bolsillo".to_string()))?;
        let account = accounts::Entity::find_by_id(pocket.account_id)
            .filter(accounts::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("bolsillo".to_string()))?;
        Ok((pocket, account))
    }

    pub async fn create_pocket(&self, user_id: i32, cmd: NewPocket) -> ResultLedger<pockets::Model> {
        let name = normalize_required_text(&cmd.name, "el nombre del bolsillo")?;
        let account = self
            .require_account(&self.database, cmd.account_id, user_id)
            .await?;

        let taken = pockets::Entity::find()
            .filter(pockets::Column::AccountId.eq(account.id))
            .filter(pockets::Column::Name.eq(name.clone()))
            .one(&self.database)
            .await?;
        if taken.is_some() {
            return Err(LedgerError::ExistingKey(name));
        }

        Ok(pockets::ActiveModel {
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
            account_id: ActiveValue::Set(account.id),
            ..Default::default()
        }
        .insert(&self.database)
        .await?)
    }

    pub async fn list_pockets(
        &self,
        user_id: i32,
        account_id: i32,
    ) -> ResultLedger<Vec<pockets::Model>> {
        let account = self
            .require_account(&self.database, account_id, user_id)
            .await?;
        Ok(pockets::Entity::find()
            .filter(pockets::Column::AccountId.eq(account.id))
            .order_by_asc(pockets::Column::Id)
            .all(&self.database)
            .await?)
    }

    pub async fn update_pocket(
        &self,
        user_id: i32,
        pocket_id: i32,
        update: PocketUpdate,
    ) -> ResultLedger<pockets::Model> {
        let (pocket, _) = self
            .require_pocket_with_account(&self.database, pocket_id, user_id)
            .await?;
        let mut active: pockets::ActiveModel = pocket.into();

        if let Some(name) = update.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "el nombre del bolsillo")?);
        }
        if let Some(description) = update.description.as_deref() {
            active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
        }

        Ok(active.update(&self.database).await?)
    }

    /// Deletes the pocket and its transactions, reversing their net effect
    /// on the account balance in the same database transaction.
    pub async fn delete_pocket(&self, user_id: i32, pocket_id: i32) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;

        let (pocket, account) = self
            .require_pocket_with_account(&db_tx, pocket_id, user_id)
            .await?;

        let txs = transactions::Entity::find()
            .filter(transactions::Column::PocketId.eq(pocket.id))
            .all(&db_tx)
            .await?;
        let net: i64 = txs.iter().map(transactions::Model::signed_amount).sum();

        let new_money = account.money - net;
        if new_money < 0 {
            return Err(LedgerError::InsufficientFunds(
                "eliminar el bolsillo dejaría la cuenta en negativo".to_string(),
            ));
        }

        transactions::Entity::delete_many()
            .filter(transactions::Column::PocketId.eq(pocket.id))
            .exec(&db_tx)
            .await?;
        pockets::Entity::delete_by_id(pocket.id).exec(&db_tx).await?;

        let account_update = accounts::ActiveModel {
            id: ActiveValue::Set(account.id),
            money: ActiveValue::Set(new_money),
            updated_at: ActiveValue::Set(chrono::Utc::now()),
            ..Default::default()
        };
        account_update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }
}
