pub use error::LedgerError;
pub use goal_targets::GoalTargetKind;
pub use ops::{
    AccountStatement, AccountUpdate, CategoryUpdate, GoalTargetSpec, GoalUpdate, GoalWithTargets,
    Ledger, LedgerBuilder, LoginLogEntry, NewAccount, NewGoal, NewPocket, NewTransaction, NewUser,
    PlatformStats, PocketHistory, PocketUpdate, ProfileUpdate, SessionUpsert, TransactionPatch,
    build_context,
};
pub use roles::RoleKind;

pub mod accounts;
pub mod categories;
pub mod chats;
pub mod goal_targets;
pub mod goals;
pub mod messages;
pub mod password_resets;
pub mod pockets;
pub mod roles;
pub mod sessions;
pub mod transactions;
pub mod users;

mod error;
mod ops;

type ResultLedger<T> = Result<T, LedgerError>;
