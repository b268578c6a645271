//! Identity service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::auth::password::PasswordError;

#[derive(Debug, Error)]
pub enum IdentityServiceError {
    #[error("missing required fields")]
    MissingFields,

    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("email address has not been confirmed")]
    EmailNotVerified,

    #[error("token not found")]
    TokenNotFound,

    #[error("token expired or already used")]
    TokenExpired,

    #[error("login or email already registered")]
    AlreadyExists,

    #[error("password is too short")]
    WeakPassword,

    #[error("user not found")]
    NotFound,

    #[error("password hashing error")]
    Hash(#[from] PasswordError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for IdentityServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::NotNullViolation) => Self::MissingFields,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
