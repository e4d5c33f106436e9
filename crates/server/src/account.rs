//! Account API endpoints.

use api_types::account::{AccountNew, AccountUpdate, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::Identity, server::ServerState};

fn view(account: ledger::accounts::Model) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        money: account.money,
        category_id: account.category_id,
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .ledger
        .create_account(
            identity.user_id,
            ledger::NewAccount {
                name: payload.name,
                money: payload.money,
                category_id: payload.category_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(account))))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.ledger.list_accounts(identity.user_id).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .ledger
        .update_account(
            identity.user_id,
            id,
            ledger::AccountUpdate {
                name: payload.name,
                money: payload.money,
                category_id: payload.category_id,
            },
        )
        .await?;
    Ok(Json(view(account)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_account(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
