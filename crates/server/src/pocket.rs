//! Tag pocket API endpoints.

use api_types::pocket::{PocketNew, PocketUpdate, PocketView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::Identity, server::ServerState};

fn view(pocket: ledger::pockets::Model) -> PocketView {
    PocketView {
        id: pocket.id,
        name: pocket.name,
        description: pocket.description,
        account_id: pocket.account_id,
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<PocketNew>,
) -> Result<(StatusCode, Json<PocketView>), ServerError> {
    let pocket = state
        .ledger
        .create_pocket(
            identity.user_id,
            ledger::NewPocket {
                name: payload.name,
                description: payload.description,
                account_id: payload.account_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(pocket))))
}

pub async fn list_by_account(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
) -> Result<Json<Vec<PocketView>>, ServerError> {
    let pockets = state
        .ledger
        .list_pockets(identity.user_id, account_id)
        .await?;
    Ok(Json(pockets.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<PocketUpdate>,
) -> Result<Json<PocketView>, ServerError> {
    let pocket = state
        .ledger
        .update_pocket(
            identity.user_id,
            id,
            ledger::PocketUpdate {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(view(pocket)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_pocket(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
