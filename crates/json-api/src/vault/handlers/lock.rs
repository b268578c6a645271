//! Lock Vault Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::{
        errors::{into_status_error, outcome_label},
        grant::vault_grant,
    },
};

/// Lock Vault Handler
///
/// Ends the vault session named by `x-vault-token`. Locking twice is harmless.
#[endpoint(
    tags("vault"),
    summary = "Lock Vault",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Vault locked"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::LOCKED, description = "No vault token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state.vault.lock(&grant).await;

    record_vault_operation(VaultOperation::Lock, outcome_label(&result));

    result.map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
