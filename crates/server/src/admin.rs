//! Admin API endpoints: login log, user management, platform stats and
//! admin management (the latter gated to super-admins in the router).

use api_types::admin::{AdminNew, LoginLogView, StatsView, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use ledger::{NewUser, RoleKind};

use crate::{ServerError, server::ServerState};

fn user_view(user: ledger::users::Model, role: RoleKind) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        nickname: user.nickname,
        role: role.as_str().to_string(),
        deleted: user.deleted,
        created_at: user.created_at,
    }
}

pub async fn login_logs(
    State(state): State<ServerState>,
) -> Result<Json<Vec<LoginLogView>>, ServerError> {
    let entries = state.ledger.login_logs().await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|entry| LoginLogView {
                user_id: entry.session.user_id,
                email: entry.email,
                device_id: entry.session.device_id,
                user_agent: entry.session.user_agent,
                ip: entry.session.ip,
                last_login: entry.session.updated_at,
                revoked: entry.session.revoked,
            })
            .collect(),
    ))
}

pub async fn list_users(
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.ledger.list_users().await?;
    Ok(Json(
        users
            .into_iter()
            .map(|(user, role)| user_view(user, role))
            .collect(),
    ))
}

pub async fn soft_delete_user(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.soft_delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats(State(state): State<ServerState>) -> Result<Json<StatsView>, ServerError> {
    let stats = state.ledger.platform_stats().await?;
    Ok(Json(StatsView {
        users: stats.users,
        accounts: stats.accounts,
        transactions: stats.transactions,
        total_income: stats.total_income,
        total_expenses: stats.total_expenses,
    }))
}

pub async fn list_admins(
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let admins = state.ledger.list_admins().await?;
    Ok(Json(
        admins
            .into_iter()
            .map(|(user, role)| user_view(user, role))
            .collect(),
    ))
}

pub async fn create_admin(
    State(state): State<ServerState>,
    Json(payload): Json<AdminNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let role = match payload.role.as_deref() {
        None => RoleKind::Admin,
        Some(name) => {
            let role = RoleKind::try_from(name)
                .map_err(|_| ServerError::Generic(format!("rol desconocido: {name}")))?;
            if !role.is_admin() {
                return Err(ServerError::Generic(format!("rol desconocido: {name}")));
            }
            role
        }
    };

    let user = state
        .ledger
        .create_admin(
            NewUser {
                email: payload.email,
                password: payload.password,
                nickname: payload.nickname,
            },
            role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user_view(user, role))))
}
