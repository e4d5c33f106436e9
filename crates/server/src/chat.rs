//! Assistant chat endpoints.
//!
//! The account context is rebuilt from the full statement on every question
//! and sent together with it to the completion API; the exchange is stored
//! on the account's single chat.

use api_types::chat::{Answer, MessageView, Question};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use ledger::build_context;

use crate::{ServerError, auth::Identity, server::ServerState};

pub async fn ask(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
    Json(payload): Json<Question>,
) -> Result<Json<Answer>, ServerError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(ServerError::Generic(
            "la pregunta no puede estar vacía".to_string(),
        ));
    }

    let Some(client) = state.assistant.as_ref() else {
        return Err(ServerError::Internal(
            "el asistente no está configurado".to_string(),
        ));
    };

    let statement = state
        .ledger
        .account_statement(identity.user_id, account_id)
        .await?;
    let chat = state
        .ledger
        .find_or_create_chat(identity.user_id, account_id)
        .await?;

    let context = build_context(&statement);
    let answer = client.complete(&context, question).await?;

    state
        .ledger
        .record_exchange(chat.id, question, &answer)
        .await?;

    Ok(Json(Answer { answer }))
}

pub async fn history(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    let messages = state
        .ledger
        .chat_history(identity.user_id, account_id)
        .await?;
    Ok(Json(
        messages
            .into_iter()
            .map(|message| MessageView {
                id: message.id,
                question: message.question,
                answer: message.answer,
                created_at: message.created_at,
            })
            .collect(),
    ))
}
