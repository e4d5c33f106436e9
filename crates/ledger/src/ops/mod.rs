use sea_orm::DatabaseConnection;

use crate::{LedgerError, ResultLedger};

mod accounts;
mod admin;
mod categories;
mod chat;
mod goals;
mod pockets;
mod transactions;
mod users;

pub use accounts::{AccountStatement, AccountUpdate, NewAccount, PocketHistory};
pub use admin::{LoginLogEntry, PlatformStats};
pub use categories::CategoryUpdate;
pub use chat::build_context;
pub use goals::{GoalTargetSpec, GoalUpdate, GoalWithTargets, NewGoal};
pub use pockets::{NewPocket, PocketUpdate};
pub use transactions::{NewTransaction, TransactionPatch};
pub use users::{NewUser, ProfileUpdate, SessionUpsert};

/// Process-wide handle over the connection pool.
///
/// Built once at startup and injected into the server; every operation takes
/// `&self` and goes through the pool, so the handle can be shared behind an
/// `Arc`.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Borrow the underlying connection pool (tests and the bootstrap CLI).
    pub fn connection(&self) -> &DatabaseConnection {
        &self.database
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidInput(format!(
            "{label} no puede estar vacío"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database pool.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`.
    pub fn build(self) -> Ledger {
        Ledger {
            database: self.database,
        }
    }
}
