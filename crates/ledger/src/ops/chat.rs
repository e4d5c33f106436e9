//! Chat persistence and the plain-text context the assistant receives.
//!
//! The context is rebuilt from scratch on every question; there is no
//! windowing.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{ResultLedger, chats, messages};

use super::{AccountStatement, Ledger};

/// Renders one account's statement as the system context block.
pub fn build_context(statement: &AccountStatement) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Cuenta \"{}\" (categoría: {}). Saldo actual: {} céntimos.\n",
        statement.account.name, statement.category.tipo, statement.account.money
    ));

    if statement.pockets.is_empty() {
        out.push_str("La cuenta no tiene bolsillos todavía.\n");
    }
    for history in &statement.pockets {
        out.push_str(&format!("\nBolsillo \"{}\"", history.pocket.name));
        if let Some(description) = &history.pocket.description {
            out.push_str(&format!(" ({description})"));
        }
        out.push_str(":\n");
        if history.transactions.is_empty() {
            out.push_str("  (sin movimientos)\n");
        }
        for tx in &history.transactions {
            let kind = if tx.is_income { "ingreso" } else { "gasto" };
            out.push_str(&format!(
                "  - {} de {} céntimos el {}",
                kind,
                tx.amount,
                tx.date.format("%Y-%m-%d")
            ));
            if let Some(description) = &tx.description {
                out.push_str(&format!(": {description}"));
            }
            out.push('\n');
        }
    }
    out
}

impl Ledger {
    /// Finds the account's chat, creating it on first use.
    pub async fn find_or_create_chat(
        &self,
        user_id: i32,
        account_id: i32,
    ) -> ResultLedger<chats::Model> {
        let account = self
            .require_account(&self.database, account_id, user_id)
            .await?;

        if let Some(chat) = chats::Entity::find()
            .filter(chats::Column::AccountId.eq(account.id))
            .one(&self.database)
            .await?
        {
            return Ok(chat);
        }

        Ok(chats::ActiveModel {
            account_id: ActiveValue::Set(account.id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.database)
        .await?)
    }

    /// Persists one question/answer pair.
    pub async fn record_exchange(
        &self,
        chat_id: i32,
        question: &str,
        answer: &str,
    ) -> ResultLedger<messages::Model> {
        Ok(messages::ActiveModel {
            chat_id: ActiveValue::Set(chat_id),
            question: ActiveValue::Set(question.to_string()),
            answer: ActiveValue::Set(answer.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.database)
        .await?)
    }

    /// The chat's messages in insertion order.
    pub async fn chat_history(
        &self,
        user_id: i32,
        account_id: i32,
    ) -> ResultLedger<Vec<messages::Model>> {
        let chat = self.find_or_create_chat(user_id, account_id).await?;
        Ok(messages::Entity::find()
            .filter(messages::Column::ChatId.eq(chat.id))
            .order_by_asc(messages::Column::Id)
            .all(&self.database)
            .await?)
    }
}
