use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body every failed request gets: a stable machine-readable kind and
/// a human-readable (Spanish) message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: String,
    pub message: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Signup {
        pub email: String,
        pub password: String,
        pub nickname: String,
        /// Device the signup session is bound to; defaults to "web".
        pub device_id: Option<String>,
    }

    /// Login body. The Spanish aliases are a compatibility shim for older
    /// clients; both forms authenticate identically.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        #[serde(alias = "correoElectronico", alias = "correoElectrónico")]
        pub email: String,
        #[serde(alias = "contrasena", alias = "contraseña")]
        pub password: String,
        pub device_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionUser {
        pub id: i32,
        pub email: String,
        pub nickname: String,
        pub role: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub user: SessionUser,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Logout {
        pub device_id: Option<String>,
    }

    /// Partial profile update: absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub nickname: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Recover {
        #[serde(alias = "correoElectronico", alias = "correoElectrónico")]
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecoverResponse {
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Reset {
        #[serde(alias = "contrasena", alias = "contraseña")]
        pub password: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        /// Opening balance in minor units.
        pub money: i64,
        pub category_id: i32,
    }

    /// Partial account update: absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub money: Option<i64>,
        pub category_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i32,
        pub name: String,
        pub money: i64,
        pub category_id: i32,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub tipo: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub tipo: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i32,
        pub tipo: String,
    }
}

pub mod pocket {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketNew {
        pub name: String,
        pub description: Option<String>,
        pub account_id: i32,
    }

    /// Partial pocket update: absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PocketUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PocketView {
        pub id: i32,
        pub name: String,
        pub description: Option<String>,
        pub account_id: i32,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Minor units; must be > 0. The sign comes from `is_income`.
        pub amount: i64,
        pub is_income: bool,
        /// RFC3339 timestamp.
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        pub pocket_id: i32,
    }

    /// Partial transaction update; the pocket cannot change.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount: Option<i64>,
        pub is_income: Option<bool>,
        pub date: Option<DateTime<Utc>>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub amount: i64,
        pub is_income: bool,
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        pub pocket_id: i32,
    }

    /// Query for `/byDate`: inclusive range over one pocket.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ByDateQuery {
        pub pocket_id: i32,
        pub from: DateTime<Utc>,
        pub to: DateTime<Utc>,
    }

    /// Query for `/byTypeDate`: range plus income/expense filter.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ByTypeDateQuery {
        pub pocket_id: i32,
        pub is_income: bool,
        pub from: DateTime<Utc>,
        pub to: DateTime<Utc>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TargetKind {
        Account,
        Pocket,
    }

    #[derive(Debug, Clone, Copy, Serialize, Deserialize)]
    pub struct Target {
        pub target_type: TargetKind,
        pub target_id: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub description: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub max_money: i64,
        /// At least one target is required.
        pub targets: Vec<Target>,
    }

    /// Partial goal update. A provided `target` replaces every stored
    /// target row (replacement, not addition).
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub description: Option<String>,
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
        pub max_money: Option<i64>,
        pub target: Option<Target>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: i32,
        pub description: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub max_money: i64,
        pub actual_progress: i64,
        pub targets: Vec<Target>,
    }
}

pub mod chat {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Question {
        #[serde(alias = "pregunta")]
        pub question: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Answer {
        pub answer: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageView {
        pub id: i32,
        pub question: String,
        pub answer: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod admin {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
        pub nickname: String,
        pub role: String,
        pub deleted: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginLogView {
        pub user_id: i32,
        pub email: String,
        pub device_id: String,
        pub user_agent: Option<String>,
        pub ip: Option<String>,
        pub last_login: DateTime<Utc>,
        pub revoked: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsView {
        pub users: u64,
        pub accounts: u64,
        pub transactions: u64,
        pub total_income: i64,
        pub total_expenses: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminNew {
        pub email: String,
        pub password: String,
        pub nickname: String,
        /// `admin` or `super_admin`; defaults to `admin`.
        pub role: Option<String>,
    }
}
