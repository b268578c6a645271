//! Vault service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::auth::password::PasswordError;

#[derive(Debug, Error)]
pub enum VaultServiceError {
    #[error("missing required fields")]
    MissingFields,

    #[error("master password is too short")]
    WeakPassword,

    #[error("no access to this project")]
    Forbidden,

    #[error("project or secret not found")]
    NotFound,

    #[error("wrong master password")]
    WrongMasterPassword,

    #[error("vault is locked")]
    VaultLocked,

    #[error("a secret with this key already exists")]
    DuplicateKey,

    #[error("password hashing error")]
    Hash(#[from] PasswordError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for VaultServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateKey,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::NotNullViolation) => Self::MissingFields,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
