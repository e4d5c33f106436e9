//! Errors the ledger can return.
//!
//! The server maps each variant onto an HTTP status, so new variants must be
//! added to that mapping as well.

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The requested row does not exist or is not visible to the caller.
    #[error("{0} no encontrado")]
    KeyNotFound(String),
    /// A unique value is already taken (account/pocket names).
    #[error("\"{0}\" ya existe")]
    ExistingKey(String),
    /// Signup with an email that already has a user.
    #[error("El correo electrónico ya está registrado")]
    DuplicateEmail,
    /// Applying the change would leave an account balance below zero.
    #[error("Fondos insuficientes: {0}")]
    InsufficientFunds(String),
    /// A field failed validation (empty name, non-positive amount, weak
    /// password, goal without targets).
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    /// Credentials did not match a stored user.
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    /// The caller's role does not allow the operation.
    #[error("Acceso denegado: {0}")]
    Forbidden(String),
    /// Unknown role name in the database.
    #[error("Rol inválido: {0}")]
    InvalidRole(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::DuplicateEmail, Self::DuplicateEmail) => true,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
