//! Cookie-JWT authentication.
//!
//! Three middleware variants guard the routes: regular users (`authToken`
//! cookie, user secret), admins and super-admins (`adminAuthToken` cookie,
//! admin secret with fallback to the user secret, plus a role claim).
//! Verification never touches the database; the identity attached to the
//! request is whatever the signed payload carries.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use ledger::RoleKind;

use crate::{ServerError, server::ServerState};

pub const USER_COOKIE: &str = "authToken";
pub const ADMIN_COOKIE: &str = "adminAuthToken";

/// Access cookies are short-lived; the refresh token stored on the session
/// row is the long-lived half of the pair.
pub const ACCESS_TTL_MINUTES: i64 = 60;
pub const REFRESH_TTL_DAYS: i64 = 30;

const RESET_PURPOSE: &str = "password_reset";

/// Signing secrets, resolved once at startup.
///
/// `None` means the secret was never configured; using it is a server
/// error (500), not an authentication failure.
#[derive(Clone, Debug, Default)]
pub struct AuthKeys {
    user_secret: Option<String>,
    admin_secret: Option<String>,
}

impl AuthKeys {
    /// The admin secret falls back to the user secret when absent.
    pub fn new(user_secret: Option<String>, admin_secret: Option<String>) -> Self {
        Self {
            user_secret,
            admin_secret,
        }
    }

    fn user_secret(&self) -> Result<&str, ServerError> {
        self.user_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServerError::Internal("jwt_secret no configurado".to_string()))
    }

    fn admin_secret(&self) -> Result<&str, ServerError> {
        match self.admin_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Ok(secret),
            None => self.user_secret(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id; a token without it is incomplete.
    sub: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
    exp: i64,
    iat: i64,
}

/// Per-request identity decoded from the cookie.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: i32,
    pub email: Option<String>,
    pub role: Option<RoleKind>,
}

fn sign(claims: &Claims, secret: &str) -> Result<String, ServerError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ServerError::Internal(format!("no se pudo firmar el token: {err}")))
}

fn verify(token: &str, secret: &str) -> Result<Claims, ServerError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ServerError::Unauthorized("token inválido o caducado".to_string()))
}

fn access_claims(user_id: i32, email: &str, role: Option<RoleKind>) -> Claims {
    let now = Utc::now();
    Claims {
        sub: Some(user_id),
        email: Some(email.to_string()),
        role: role.map(|r| r.as_str().to_string()),
        jti: None,
        purpose: None,
        exp: (now + Duration::minutes(ACCESS_TTL_MINUTES)).timestamp(),
        iat: now.timestamp(),
    }
}

/// Signs the short-lived access token carried by the user cookie.
pub(crate) fn issue_user_token(
    keys: &AuthKeys,
    user_id: i32,
    email: &str,
) -> Result<String, ServerError> {
    sign(&access_claims(user_id, email, None), keys.user_secret()?)
}

/// Signs the admin access token; the role claim rides along.
pub(crate) fn issue_admin_token(
    keys: &AuthKeys,
    user_id: i32,
    email: &str,
    role: RoleKind,
) -> Result<String, ServerError> {
    sign(&access_claims(user_id, email, Some(role)), keys.admin_secret()?)
}

/// Signs the long-lived refresh token persisted on the session row.
pub(crate) fn issue_refresh_token(
    keys: &AuthKeys,
    user_id: i32,
) -> Result<(String, DateTime<Utc>), ServerError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(REFRESH_TTL_DAYS);
    let claims = Claims {
        sub: Some(user_id),
        email: None,
        role: None,
        jti: None,
        purpose: None,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };
    Ok((sign(&claims, keys.user_secret()?)?, expires_at))
}

/// Signs a password-reset token around the stored `jti`.
pub fn sign_reset_token(
    keys: &AuthKeys,
    user_id: i32,
    jti: &str,
    expires_at: DateTime<Utc>,
) -> Result<String, ServerError> {
    let claims = Claims {
        sub: Some(user_id),
        email: None,
        role: None,
        jti: Some(jti.to_string()),
        purpose: Some(RESET_PURPOSE.to_string()),
        exp: expires_at.timestamp(),
        iat: Utc::now().timestamp(),
    };
    sign(&claims, keys.user_secret()?)
}

/// Verifies a reset token and returns the reset row's `jti`.
pub(crate) fn verify_reset_token(keys: &AuthKeys, token: &str) -> Result<String, ServerError> {
    let claims = verify(token, keys.user_secret()?)?;
    if claims.purpose.as_deref() != Some(RESET_PURPOSE) {
        return Err(ServerError::Unauthorized(
            "token inválido o caducado".to_string(),
        ));
    }
    claims
        .jti
        .ok_or_else(|| ServerError::Unauthorized("token incompleto".to_string()))
}

/// Builds the HTTP-only session cookie.
pub(crate) fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// An expired cookie, for logout.
pub(crate) fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

fn identity_from(claims: Claims) -> Result<Identity, ServerError> {
    let user_id = claims
        .sub
        .ok_or_else(|| ServerError::Unauthorized("token incompleto".to_string()))?;
    let role = match claims.role.as_deref() {
        Some(name) => Some(
            RoleKind::try_from(name)
                .map_err(|_| ServerError::Unauthorized("token inválido o caducado".to_string()))?,
        ),
        None => None,
    };
    Ok(Identity {
        user_id,
        email: claims.email,
        role,
    })
}

fn decode_cookie(
    jar: &CookieJar,
    cookie_name: &str,
    secret: &str,
) -> Result<Identity, ServerError> {
    let cookie = jar
        .get(cookie_name)
        .ok_or_else(|| ServerError::Unauthorized("falta el token de autenticación".to_string()))?;
    identity_from(verify(cookie.value(), secret)?)
}

pub(crate) async fn user_auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let identity = decode_cookie(&jar, USER_COOKIE, state.keys.user_secret()?)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn require_admin(identity: &Identity) -> Result<(), ServerError> {
    match identity.role {
        Some(role) if role.is_admin() => Ok(()),
        _ => Err(ServerError::Forbidden(
            "se requiere un rol de administrador".to_string(),
        )),
    }
}

pub(crate) async fn admin_auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let identity = decode_cookie(&jar, ADMIN_COOKIE, state.keys.admin_secret()?)?;
    require_admin(&identity)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub(crate) async fn super_admin_auth(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let identity = decode_cookie(&jar, ADMIN_COOKIE, state.keys.admin_secret()?)?;
    if identity.role != Some(RoleKind::SuperAdmin) {
        return Err(ServerError::Forbidden(
            "se requiere el rol de superadministrador".to_string(),
        ));
    }
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
