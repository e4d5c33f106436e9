//! Category API endpoints.

use api_types::category::{CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn view(category: ledger::categories::Model) -> CategoryView {
    CategoryView {
        id: category.id,
        tipo: category.tipo,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.ledger.create_category(&payload.tipo).await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.ledger.list_categories().await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryView>, ServerError> {
    Ok(Json(view(state.ledger.category(id).await?)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .ledger
        .update_category(id, ledger::CategoryUpdate { tipo: payload.tipo })
        .await?;
    Ok(Json(view(category)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
