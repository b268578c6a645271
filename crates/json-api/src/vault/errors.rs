//! Vault Errors

use salvo::http::StatusError;
use tracing::error;

use orbit_app::{auth::password::MIN_PASSWORD_CHARS, domain::vault::VaultServiceError};

pub(crate) fn into_status_error(error: VaultServiceError) -> StatusError {
    match error {
        VaultServiceError::MissingFields => {
            StatusError::bad_request().brief("Missing required fields")
        }
        VaultServiceError::WeakPassword => StatusError::bad_request().brief(format!(
            "Master password must be at least {MIN_PASSWORD_CHARS} characters"
        )),
        VaultServiceError::Forbidden => {
            StatusError::forbidden().brief("No access to this project")
        }
        VaultServiceError::NotFound => StatusError::not_found().brief("Project or secret not found"),
        VaultServiceError::WrongMasterPassword => {
            StatusError::unauthorized().brief("Wrong master password")
        }
        VaultServiceError::VaultLocked => StatusError::locked().brief("Vault is locked"),
        VaultServiceError::DuplicateKey => {
            StatusError::conflict().brief("A secret with this key already exists")
        }
        VaultServiceError::Hash(source) => {
            error!("master password hashing failed: {source}");

            StatusError::internal_server_error()
        }
        VaultServiceError::Sql(source) => {
            error!("vault storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Short metric label for a vault call result.
pub(crate) fn outcome_label<T>(result: &Result<T, VaultServiceError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(VaultServiceError::VaultLocked) => "locked",
        Err(VaultServiceError::WrongMasterPassword | VaultServiceError::Forbidden) => "denied",
        Err(VaultServiceError::Hash(_) | VaultServiceError::Sql(_)) => "error",
        Err(_) => "rejected",
    }
}
