//! Transaction API endpoints.
//!
//! Creation, update and deletion go through the balance-maintenance
//! operations; a change that would leave the account negative comes back as
//! a 409 and nothing is persisted.

use api_types::transaction::{
    ByDateQuery, ByTypeDateQuery, TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, auth::Identity, server::ServerState};

fn view(tx: ledger::transactions::Model) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount: tx.amount,
        is_income: tx.is_income,
        date: tx.date,
        description: tx.description,
        pocket_id: tx.pocket_id,
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .ledger
        .create_transaction(
            identity.user_id,
            ledger::NewTransaction {
                pocket_id: payload.pocket_id,
                amount: payload.amount,
                is_income: payload.is_income,
                date: payload.date,
                description: payload.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn list_by_pocket(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(pocket_id): Path<i32>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state
        .ledger
        .list_transactions(identity.user_id, pocket_id)
        .await?;
    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn list_by_date(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state
        .ledger
        .list_transactions_by_date(identity.user_id, query.pocket_id, query.from, query.to)
        .await?;
    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn list_by_type_date(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<ByTypeDateQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state
        .ledger
        .list_transactions_by_type_date(
            identity.user_id,
            query.pocket_id,
            query.is_income,
            query.from,
            query.to,
        )
        .await?;
    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .ledger
        .update_transaction(
            identity.user_id,
            id,
            ledger::TransactionPatch {
                amount: payload.amount,
                is_income: payload.is_income,
                date: payload.date,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state
        .ledger
        .delete_transaction(identity.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
