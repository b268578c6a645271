//! List Secrets Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::{
        errors::{into_status_error, outcome_label},
        grant::vault_grant,
        models::SecretResponse,
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SecretsResponse {
    /// Secrets ordered by key
    pub secrets: Vec<SecretResponse>,
}

/// List Secrets Handler
///
/// Returns secret metadata only; values stay hidden until revealed.
#[endpoint(
    tags("vault"),
    summary = "List Secrets",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Secrets"),
        (status_code = StatusCode::FORBIDDEN, description = "No access to this project"),
        (status_code = StatusCode::LOCKED, description = "Vault is locked"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<SecretsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state.vault.list_secrets(&grant).await;

    record_vault_operation(VaultOperation::List, outcome_label(&result));

    let secrets = result.map_err(into_status_error)?;

    Ok(Json(SecretsResponse {
        secrets: secrets.into_iter().map(Into::into).collect(),
    }))
}
