use axum::{Json, http::StatusCode, response::IntoResponse};

use assistant::AssistantError;
use ledger::LedgerError;

pub use auth::{AuthKeys, Identity, sign_reset_token};
pub use mailer::Mailer;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod account;
mod admin;
mod auth;
mod category;
mod chat;
mod goal;
mod mailer;
mod pocket;
mod server;
mod transaction;
mod user;

/// Every failure a handler can produce, mapped onto one JSON shape:
/// `{"kind": "...", "message": "..."}`.
#[derive(Debug)]
pub enum ServerError {
    Ledger(LedgerError),
    Assistant(AssistantError),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
    Generic(String),
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::ExistingKey(_) | LedgerError::InsufficientFunds(_) => StatusCode::CONFLICT,
        // The duplicate-email contract predates the conflict mapping: clients
        // expect 400 with the canonical message.
        LedgerError::DuplicateEmail | LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LedgerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
        LedgerError::InvalidRole(_) | LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "validation",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        _ => "internal",
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "error interno del servidor".to_string()
        }
        LedgerError::InvalidRole(detail) => {
            tracing::error!("role mismatch in stored data: {detail}");
            "error interno del servidor".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Ledger(err) => {
                (status_for_ledger_error(&err), message_for_ledger_error(err))
            }
            ServerError::Assistant(err) => {
                tracing::error!("assistant error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "el asistente no está disponible".to_string(),
                )
            }
            ServerError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ServerError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ServerError::Internal(message) => {
                tracing::error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error interno del servidor".to_string(),
                )
            }
            ServerError::Generic(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = api_types::ApiError {
            kind: kind_for_status(status).to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<AssistantError> for ServerError {
    fn from(value: AssistantError) -> Self {
        Self::Assistant(value)
    }
}
