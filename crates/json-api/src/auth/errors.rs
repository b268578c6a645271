//! Identity Errors

use salvo::http::StatusError;
use tracing::error;

use orbit_app::auth::{IdentityServiceError, password::MIN_PASSWORD_CHARS};

pub(crate) fn into_status_error(error: IdentityServiceError) -> StatusError {
    match error {
        IdentityServiceError::MissingFields => {
            StatusError::bad_request().brief("Missing required fields")
        }
        IdentityServiceError::WeakPassword => StatusError::bad_request().brief(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )),
        IdentityServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid login or password")
        }
        IdentityServiceError::EmailNotVerified => StatusError::forbidden()
            .brief("Please confirm your email address before signing in"),
        IdentityServiceError::TokenNotFound => {
            StatusError::not_found().brief("Verification link not found")
        }
        IdentityServiceError::TokenExpired => {
            StatusError::gone().brief("Verification link expired or already used")
        }
        IdentityServiceError::AlreadyExists => {
            StatusError::conflict().brief("Login or email already registered")
        }
        IdentityServiceError::NotFound => StatusError::not_found().brief("User not found"),
        IdentityServiceError::Hash(source) => {
            error!("password hashing failed: {source}");

            StatusError::internal_server_error()
        }
        IdentityServiceError::Sql(source) => {
            error!("identity storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
