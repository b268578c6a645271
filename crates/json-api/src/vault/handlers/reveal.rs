//! Reveal Secret Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use orbit_app::domain::vault::records::SecretId;

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::{
        errors::{into_status_error, outcome_label},
        grant::vault_grant,
        models::SecretValueResponse,
    },
};

/// Reveal Secret Handler
///
/// Returns the plaintext value and records a `view` in the access log.
#[endpoint(
    tags("vault"),
    summary = "Reveal Secret",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Secret value"),
        (status_code = StatusCode::NOT_FOUND, description = "Secret not found"),
        (status_code = StatusCode::LOCKED, description = "Vault is locked"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    secret: PathParam<i64>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<SecretValueResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state
        .vault
        .reveal_secret(&grant, SecretId::from_i64(secret.into_inner()))
        .await;

    record_vault_operation(VaultOperation::Reveal, outcome_label(&result));

    Ok(Json(result.map_err(into_status_error)?.into()))
}
