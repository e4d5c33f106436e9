//! Auth endpoints: signup, login, logout, profile, recovery and reset.

use api_types::auth::{
    Login, LoginResponse, Logout, ProfileUpdate, Recover, RecoverResponse, Reset, SessionUser,
    Signup,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use axum_extra::extract::cookie::CookieJar;

use ledger::{NewUser, RoleKind, SessionUpsert};

use crate::{
    ServerError,
    auth::{
        ADMIN_COOKIE, Identity, USER_COOKIE, issue_admin_token, issue_refresh_token,
        issue_user_token, removal_cookie, session_cookie, sign_reset_token, verify_reset_token,
    },
    server::ServerState,
};

const DEFAULT_DEVICE: &str = "web";
const RECOVER_MESSAGE: &str =
    "Si el correo está registrado, recibirás instrucciones para restablecer la contraseña";

fn user_agent_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn session_view(user: &ledger::users::Model, role: RoleKind) -> SessionUser {
    SessionUser {
        id: user.id,
        email: user.email.clone(),
        nickname: user.nickname.clone(),
        role: role.as_str().to_string(),
    }
}

async fn open_session(
    state: &ServerState,
    user: &ledger::users::Model,
    device_id: String,
    headers: &HeaderMap,
) -> Result<(), ServerError> {
    let (refresh_token, expires_at) = issue_refresh_token(&state.keys, user.id)?;
    state
        .ledger
        .record_login(SessionUpsert {
            user_id: user.id,
            device_id,
            refresh_token,
            user_agent: user_agent_of(headers),
            ip: None,
            expires_at,
        })
        .await?;
    Ok(())
}

pub async fn signup(
    State(state): State<ServerState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<Signup>,
) -> Result<(StatusCode, CookieJar, Json<LoginResponse>), ServerError> {
    let user = state
        .ledger
        .signup(NewUser {
            email: payload.email,
            password: payload.password,
            nickname: payload.nickname,
        })
        .await?;

    let device_id = payload.device_id.unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    open_session(&state, &user, device_id, &headers).await?;

    let token = issue_user_token(&state.keys, user.id, &user.email)?;
    let jar = jar.add(session_cookie(USER_COOKIE, token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(LoginResponse {
            user: session_view(&user, RoleKind::User),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<Login>,
) -> Result<(CookieJar, Json<LoginResponse>), ServerError> {
    let (user, role) = state
        .ledger
        .authenticate(&payload.email, &payload.password)
        .await?;

    let device_id = payload.device_id.unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    open_session(&state, &user, device_id, &headers).await?;

    let token = issue_user_token(&state.keys, user.id, &user.email)?;
    let jar = jar.add(session_cookie(USER_COOKIE, token));

    Ok((
        jar,
        Json(LoginResponse {
            user: session_view(&user, role),
        }),
    ))
}

pub async fn admin_login(
    State(state): State<ServerState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<Login>,
) -> Result<(CookieJar, Json<LoginResponse>), ServerError> {
    let (user, role) = state
        .ledger
        .authenticate_admin(&payload.email, &payload.password)
        .await?;

    let device_id = payload.device_id.unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    open_session(&state, &user, device_id, &headers).await?;

    let token = issue_admin_token(&state.keys, user.id, &user.email, role)?;
    let jar = jar.add(session_cookie(ADMIN_COOKIE, token));

    Ok((
        jar,
        Json(LoginResponse {
            user: session_view(&user, role),
        }),
    ))
}

pub async fn logout(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Option<Json<Logout>>,
) -> Result<(CookieJar, StatusCode), ServerError> {
    let device_id = payload
        .and_then(|Json(body)| body.device_id)
        .unwrap_or_else(|| DEFAULT_DEVICE.to_string());
    state
        .ledger
        .revoke_session(identity.user_id, &device_id)
        .await?;

    let jar = jar
        .add(removal_cookie(USER_COOKIE))
        .add(removal_cookie(ADMIN_COOKIE));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<SessionUser>, ServerError> {
    let user = state.ledger.profile(identity.user_id).await?;
    let role = identity.role.unwrap_or(RoleKind::User);
    Ok(Json(session_view(&user, role)))
}

pub async fn update_profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<SessionUser>, ServerError> {
    let user = state
        .ledger
        .update_profile(
            identity.user_id,
            ledger::ProfileUpdate {
                nickname: payload.nickname,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;
    let role = identity.role.unwrap_or(RoleKind::User);
    Ok(Json(session_view(&user, role)))
}

/// Self-service hard delete; everything the user owns cascades away.
pub async fn delete_profile(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ServerError> {
    state.ledger.delete_profile(identity.user_id).await?;
    let jar = jar
        .add(removal_cookie(USER_COOKIE))
        .add(removal_cookie(ADMIN_COOKIE));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Always answers the same generic body, whether or not the email exists.
pub async fn recover(
    State(state): State<ServerState>,
    Json(payload): Json<Recover>,
) -> Result<(StatusCode, Json<RecoverResponse>), ServerError> {
    if let Some((user, jti, expires_at)) = state.ledger.create_reset(&payload.email).await? {
        let token = sign_reset_token(&state.keys, user.id, &jti, expires_at)?;
        // Delivery is the mail service's job; the token never leaves the
        // backend through this response.
        state.mailer.send_reset(&user.email, &token);
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(RecoverResponse {
            message: RECOVER_MESSAGE.to_string(),
        }),
    ))
}

pub async fn reset(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    Json(payload): Json<Reset>,
) -> Result<StatusCode, ServerError> {
    let jti = verify_reset_token(&state.keys, &token)?;
    state.ledger.consume_reset(&jti, &payload.password).await?;
    Ok(StatusCode::NO_CONTENT)
}
