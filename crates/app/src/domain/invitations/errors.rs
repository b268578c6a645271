//! Invitations service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvitationsServiceError {
    #[error("missing required fields")]
    MissingFields,

    #[error("invalid role")]
    InvalidRole,

    #[error("only company partners may invite")]
    Forbidden,

    #[error("company or user not found")]
    NotFound,

    #[error("a pending invitation already exists for this email")]
    DuplicateInvitation,

    #[error("this email already belongs to a company worker")]
    AlreadyMember,

    #[error("invitation not found")]
    TokenNotFound,

    #[error("invitation expired")]
    TokenExpired,

    #[error("invitation already used")]
    AlreadyResolved,

    #[error("invitation was sent to a different email address")]
    EmailMismatch,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InvitationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateInvitation,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
