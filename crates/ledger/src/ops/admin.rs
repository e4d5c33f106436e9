//! Admin surface: user management, login log and platform statistics.

use chrono::Utc;
use sea_orm::{ActiveValue, PaginatorTrait, QueryOrder, Statement, prelude::*};

use crate::{LedgerError, ResultLedger, RoleKind, accounts, sessions, transactions, users};

use super::{Ledger, users::NewUser};

/// One session row joined with its user's email, newest activity first.
pub struct LoginLogEntry {
    pub session: sessions::Model,
    pub email: String,
}

/// Platform totals; monetary sums are in minor units.
pub struct PlatformStats {
    pub users: u64,
    pub accounts: u64,
    pub transactions: u64,
    pub total_income: i64,
    pub total_expenses: i64,
}

impl Ledger {
    /// Every user with its role, soft-deleted ones included.
    pub async fn list_users(&self) -> ResultLedger<Vec<(users::Model, RoleKind)>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for user in models {
            let role = self.role_of(&self.database, &user).await?;
            out.push((user, role));
        }
        Ok(out)
    }

    /// Flags a user as deleted without touching their data.
    pub async fn soft_delete_user(&self, user_id: i32) -> ResultLedger<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("usuario".to_string()))?;

        let mut active: users::ActiveModel = user.into();
        active.deleted = ActiveValue::Set(true);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;
        Ok(())
    }

    /// The login log: session rows with their user's email.
    pub async fn login_logs(&self) -> ResultLedger<Vec<LoginLogEntry>> {
        let rows: Vec<(sessions::Model, Option<users::Model>)> = sessions::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(sessions::Column::UpdatedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (session, user) in rows {
            let Some(user) = user else { continue };
            out.push(LoginLogEntry {
                session,
                email: user.email,
            });
        }
        Ok(out)
    }

    /// Counts and income/expense volume across the whole platform.
    pub async fn platform_stats(&self) -> ResultLedger<PlatformStats> {
        let users = users::Entity::find().count(&self.database).await?;
        let accounts = accounts::Entity::find().count(&self.database).await?;
        let tx_count = transactions::Entity::find().count(&self.database).await?;

        let backend = self.database.get_database_backend();
        let mut totals = [0i64; 2];
        for (slot, is_income) in totals.iter_mut().zip([true, false]) {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount), 0) AS sum FROM transactions WHERE is_income = ?",
                vec![is_income.into()],
            );
            let row = self.database.query_one(stmt).await?;
            *slot = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        }

        Ok(PlatformStats {
            users,
            accounts,
            transactions: tx_count,
            total_income: totals[0],
            total_expenses: totals[1],
        })
    }

    /// Users holding the admin or super-admin role.
    pub async fn list_admins(&self) -> ResultLedger<Vec<(users::Model, RoleKind)>> {
        let all = self.list_users().await?;
        Ok(all
            .into_iter()
            .filter(|(_, role)| role.is_admin())
            .collect())
    }

    /// Creates a user carrying an elevated role.
    pub async fn create_admin(
        &self,
        cmd: NewUser,
        role: RoleKind,
    ) -> ResultLedger<users::Model> {
        if !role.is_admin() {
            return Err(LedgerError::InvalidRole(role.as_str().to_string()));
        }
        let user = self.signup(cmd).await?;

        let role_id = self.require_role_id(&self.database, role).await?;
        let mut active: users::ActiveModel = user.into();
        active.role_id = ActiveValue::Set(role_id);
        active.updated_at = ActiveValue::Set(Utc::now());
        Ok(active.update(&self.database).await?)
    }
}
