//! User lifecycle: signup, credential checks, profile, sessions and
//! password resets.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    LedgerError, ResultLedger, RoleKind, accounts, password_resets, roles, sessions, users,
};

use super::{Ledger, normalize_optional_text, normalize_required_text};

/// How long a reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub struct NewUser {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

/// Partial profile update: absent fields keep their stored value.
#[derive(Default)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// One device's login, upserted on each successful authentication.
pub struct SessionUpsert {
    pub user_id: i32,
    pub device_id: String,
    pub refresh_token: String,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub expires_at: chrono::DateTime<Utc>,
}

fn hash_password(password: &str) -> ResultLedger<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| LedgerError::InvalidInput("no se pudo procesar la contraseña".to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Minimum bar for a new password: 8+ chars with upper, lower and digit.
pub fn check_password_strength(password: &str) -> ResultLedger<()> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(LedgerError::InvalidInput(
            "la contraseña debe tener al menos 8 caracteres, mayúsculas, minúsculas y números"
                .to_string(),
        ))
    }
}

fn normalize_email(email: &str) -> ResultLedger<String> {
    let email = normalize_required_text(email, "el correo electrónico")?.to_lowercase();
    if !email.contains('@') {
        return Err(LedgerError::InvalidInput(
            "el correo electrónico no es válido".to_string(),
        ));
    }
    Ok(email)
}

impl Ledger {
    /// Finds the role row for `kind`, creating it on first use.
    pub(super) async fn require_role_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        kind: RoleKind,
    ) -> ResultLedger<i32> {
        if let Some(role) = roles::Entity::find()
            .filter(roles::Column::Name.eq(kind.as_str()))
            .one(conn)
            .await?
        {
            return Ok(role.id);
        }

        let role = roles::ActiveModel {
            name: ActiveValue::Set(kind.as_str().to_string()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(role.id)
    }

    pub(super) async fn role_of<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
    ) -> ResultLedger<RoleKind> {
        let role = roles::Entity::find_by_id(user.role_id)
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::InvalidRole(format!("rol {}", user.role_id)))?;
        RoleKind::try_from(role.name.as_str())
    }

    /// Registers a new user with the default `user` role.
    pub async fn signup(&self, cmd: NewUser) -> ResultLedger<users::Model> {
        let email = normalize_email(&cmd.email)?;
        let password = normalize_required_text(&cmd.password, "la contraseña")?;
        let nickname = normalize_required_text(&cmd.nickname, "el nombre")?;

        let taken = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?;
        if taken.is_some() {
            return Err(LedgerError::DuplicateEmail);
        }

        let role_id = self.require_role_id(&self.database, RoleKind::User).await?;
        let now = Utc::now();
        let user = users::ActiveModel {
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(hash_password(&password)?),
            nickname: ActiveValue::Set(nickname),
            role_id: ActiveValue::Set(role_id),
            deleted: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        Ok(user)
    }

    /// Checks a credential pair against the stored hash.
    ///
    /// Soft-deleted users cannot authenticate.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> ResultLedger<(users::Model, RoleKind)> {
        let email = normalize_email(email)?;
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::Deleted.eq(false))
            .one(&self.database)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(LedgerError::InvalidCredentials);
        }

        let role = self.role_of(&self.database, &user).await?;
        Ok((user, role))
    }

    /// Like [`Ledger::authenticate`] but requires an elevated role.
    pub async fn authenticate_admin(
        &self,
        email: &str,
        password: &str,
    ) -> ResultLedger<(users::Model, RoleKind)> {
        let (user, role) = self.authenticate(email, password).await?;
        if !role.is_admin() {
            return Err(LedgerError::Forbidden(
                "se requiere un rol de administrador".to_string(),
            ));
        }
        Ok((user, role))
    }

    /// Upserts the (user, device) session row; doubles as the login log.
    pub async fn record_login(&self, cmd: SessionUpsert) -> ResultLedger<()> {
        let now = Utc::now();
        let session = sessions::ActiveModel {
            user_id: ActiveValue::Set(cmd.user_id),
            device_id: ActiveValue::Set(cmd.device_id),
            refresh_token: ActiveValue::Set(cmd.refresh_token),
            user_agent: ActiveValue::Set(cmd.user_agent),
            ip: ActiveValue::Set(cmd.ip),
            expires_at: ActiveValue::Set(cmd.expires_at),
            revoked: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        sessions::Entity::insert(session)
            .on_conflict(
                OnConflict::columns([sessions::Column::UserId, sessions::Column::DeviceId])
                    .update_columns([
                        sessions::Column::RefreshToken,
                        sessions::Column::UserAgent,
                        sessions::Column::Ip,
                        sessions::Column::ExpiresAt,
                        sessions::Column::Revoked,
                        sessions::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Marks the device session revoked (logout).
    pub async fn revoke_session(&self, user_id: i32, device_id: &str) -> ResultLedger<()> {
        if let Some(session) = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::DeviceId.eq(device_id))
            .one(&self.database)
            .await?
        {
            let mut session: sessions::ActiveModel = session.into();
            session.revoked = ActiveValue::Set(true);
            session.updated_at = ActiveValue::Set(Utc::now());
            session.update(&self.database).await?;
        }
        Ok(())
    }

    pub async fn profile(&self, user_id: i32) -> ResultLedger<users::Model> {
        users::Entity::find_by_id(user_id)
            .filter(users::Column::Deleted.eq(false))
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("usuario".to_string()))
    }

    /// Merges the provided fields over the stored profile.
    pub async fn update_profile(
        &self,
        user_id: i32,
        update: ProfileUpdate,
    ) -> ResultLedger<users::Model> {
        let user = self.profile(user_id).await?;
        let mut active: users::ActiveModel = user.into();

        if let Some(nickname) = normalize_optional_text(update.nickname.as_deref()) {
            active.nickname = ActiveValue::Set(nickname);
        }
        if let Some(email) = update.email.as_deref() {
            let email = normalize_email(email)?;
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .filter(users::Column::Id.ne(user_id))
                .one(&self.database)
                .await?;
            if taken.is_some() {
                return Err(LedgerError::DuplicateEmail);
            }
            active.email = ActiveValue::Set(email);
        }
        if let Some(password) = update.password.as_deref() {
            check_password_strength(password)?;
            active.password_hash = ActiveValue::Set(hash_password(password)?);
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        Ok(active.update(&self.database).await?)
    }

    /// Hard-deletes the user; sessions, resets, accounts, pockets,
    /// transactions and chats go with it through the schema cascades.
    pub async fn delete_profile(&self, user_id: i32) -> ResultLedger<()> {
        let user = self.profile(user_id).await?;
        users::Entity::delete_by_id(user.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Creates a reset row for the address, if a live user owns it.
    ///
    /// Returns `None` for unknown emails so the caller can answer with the
    /// same generic body either way.
    pub async fn create_reset(
        &self,
        email: &str,
    ) -> ResultLedger<Option<(users::Model, String, chrono::DateTime<Utc>)>> {
        let email = normalize_email(email)?;
        let Some(user) = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::Deleted.eq(false))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        let jti = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + chrono::Duration::hours(RESET_TOKEN_TTL_HOURS);
        password_resets::ActiveModel {
            token: ActiveValue::Set(jti.clone()),
            user_id: ActiveValue::Set(user.id),
            expires_at: ActiveValue::Set(expires_at),
            used: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        Ok(Some((user, jti, expires_at)))
    }

    /// Applies a password reset: the row must exist, be unused and unexpired;
    /// the new password must clear the strength bar. Every reset row of the
    /// user is marked used afterwards.
    pub async fn consume_reset(&self, jti: &str, new_password: &str) -> ResultLedger<()> {
        let reset = password_resets::Entity::find()
            .filter(password_resets::Column::Token.eq(jti))
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("token de restablecimiento".to_string()))?;

        if reset.used || reset.expires_at < Utc::now() {
            return Err(LedgerError::InvalidInput(
                "el token de restablecimiento ya no es válido".to_string(),
            ));
        }
        check_password_strength(new_password)?;

        let user = users::Entity::find_by_id(reset.user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("usuario".to_string()))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = ActiveValue::Set(hash_password(new_password)?);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.database).await?;

        password_resets::Entity::update_many()
            .col_expr(password_resets::Column::Used, Expr::value(true))
            .filter(password_resets::Column::UserId.eq(reset.user_id))
            .exec(&self.database)
            .await?;

        Ok(())
    }

    /// Sanity lookup used by handlers that only hold a user id from a token.
    pub async fn user_owns_account(&self, user_id: i32, account_id: i32) -> ResultLedger<bool> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        Ok(account.is_some())
    }
}
