//! Initial schema migration - creates all tables from scratch.
//!
//! - `roles`: the closed role set (user, admin, super_admin)
//! - `users`: authentication and profile
//! - `user_sessions`: one row per (user, device) login; also the login log
//! - `password_resets`: single-use reset tokens
//! - `categories`: account categories
//! - `accounts`: money containers with a cached balance
//! - `tag_pockets`: named sub-buckets grouping transactions
//! - `transactions`: the authoritative ledger entries
//! - `goals` / `goal_targets`: savings goals over accounts or pockets
//! - `chats` / `messages`: one assistant conversation per account

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Nickname,
    RoleId,
    Deleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserSessions {
    Table,
    Id,
    UserId,
    DeviceId,
    RefreshToken,
    UserAgent,
    Ip,
    ExpiresAt,
    Revoked,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PasswordResets {
    Table,
    Id,
    Token,
    UserId,
    ExpiresAt,
    Used,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Tipo,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    Money,
    UserId,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TagPockets {
    Table,
    Id,
    Name,
    Description,
    AccountId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Amount,
    IsIncome,
    Date,
    Description,
    PocketId,
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    Description,
    StartDate,
    EndDate,
    MaxMoney,
    ActualProgress,
}

#[derive(Iden)]
enum GoalTargets {
    Table,
    Id,
    GoalId,
    TargetKind,
    TargetId,
}

#[derive(Iden)]
enum Chats {
    Table,
    Id,
    AccountId,
    CreatedAt,
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
    ChatId,
    Question,
    Answer,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Roles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-roles-name-unique")
                    .table(Roles::Table)
                    .col(Roles::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Nickname).string().not_null())
                    .col(ColumnDef::new(Users::RoleId).integer().not_null())
                    .col(
                        ColumnDef::new(Users::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. User sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSessions::UserId).integer().not_null())
                    .col(ColumnDef::new(UserSessions::DeviceId).string().not_null())
                    .col(
                        ColumnDef::new(UserSessions::RefreshToken)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserSessions::UserAgent).string())
                    .col(ColumnDef::new(UserSessions::Ip).string())
                    .col(
                        ColumnDef::new(UserSessions::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::Revoked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserSessions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_sessions-user_id")
                            .from(UserSessions::Table, UserSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-user_sessions-user_id-device_id-unique")
                    .table(UserSessions::Table)
                    .col(UserSessions::UserId)
                    .col(UserSessions::DeviceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Password resets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PasswordResets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordResets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PasswordResets::Token).string().not_null())
                    .col(ColumnDef::new(PasswordResets::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(PasswordResets::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResets::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PasswordResets::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-password_resets-user_id")
                            .from(PasswordResets::Table, PasswordResets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-password_resets-token-unique")
                    .table(PasswordResets::Table)
                    .col(PasswordResets::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Tipo).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Money).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::UserId).integer().not_null())
                    .col(ColumnDef::new(Accounts::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-user_id")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-category_id")
                            .from(Accounts::Table, Accounts::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-user_id")
                    .table(Accounts::Table)
                    .col(Accounts::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Tag pockets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TagPockets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TagPockets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TagPockets::Name).string().not_null())
                    .col(ColumnDef::new(TagPockets::Description).string())
                    .col(ColumnDef::new(TagPockets::AccountId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tag_pockets-account_id")
                            .from(TagPockets::Table, TagPockets::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tag_pockets-account_id-name-unique")
                    .table(TagPockets::Table)
                    .col(TagPockets::AccountId)
                    .col(TagPockets::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::IsIncome).boolean().not_null())
                    .col(ColumnDef::new(Transactions::Date).timestamp().not_null())
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(ColumnDef::new(Transactions::PocketId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-pocket_id")
                            .from(Transactions::Table, Transactions::PocketId)
                            .to(TagPockets::Table, TagPockets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-pocket_id-date")
                    .table(Transactions::Table)
                    .col(Transactions::PocketId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Goals and targets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Goals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Goals::Description).string().not_null())
                    .col(ColumnDef::new(Goals::StartDate).timestamp().not_null())
                    .col(ColumnDef::new(Goals::EndDate).timestamp().not_null())
                    .col(ColumnDef::new(Goals::MaxMoney).big_integer().not_null())
                    .col(
                        ColumnDef::new(Goals::ActualProgress)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalTargets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoalTargets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoalTargets::GoalId).integer().not_null())
                    .col(ColumnDef::new(GoalTargets::TargetKind).string().not_null())
                    .col(ColumnDef::new(GoalTargets::TargetId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_targets-goal_id")
                            .from(GoalTargets::Table, GoalTargets::GoalId)
                            .to(Goals::Table, Goals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_targets-goal_id")
                    .table(GoalTargets::Table)
                    .col(GoalTargets::GoalId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Chats and messages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Chats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chats::AccountId).integer().not_null())
                    .col(ColumnDef::new(Chats::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chats-account_id")
                            .from(Chats::Table, Chats::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-chats-account_id-unique")
                    .table(Chats::Table)
                    .col(Chats::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::ChatId).integer().not_null())
                    .col(ColumnDef::new(Messages::Question).text().not_null())
                    .col(ColumnDef::new(Messages::Answer).text().not_null())
                    .col(ColumnDef::new(Messages::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-messages-chat_id")
                            .from(Messages::Table, Messages::ChatId)
                            .to(Chats::Table, Chats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-messages-chat_id")
                    .table(Messages::Table)
                    .col(Messages::ChatId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Chats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GoalTargets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TagPockets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PasswordResets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        Ok(())
    }
}
