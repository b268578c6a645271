//! Companies service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompaniesServiceError {
    #[error("missing required fields")]
    MissingFields,

    #[error("company or project not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("already exists")]
    AlreadyExists,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CompaniesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingFields,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
