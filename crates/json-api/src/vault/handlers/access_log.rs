//! Secret Access Log Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use orbit_app::domain::vault::records::SecretId;

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::{
        errors::{into_status_error, outcome_label},
        grant::vault_grant,
        models::SecretAccessResponse,
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AccessLogResponse {
    /// Most recent first
    pub entries: Vec<SecretAccessResponse>,
}

/// Secret Access Log Handler
#[endpoint(
    tags("vault"),
    summary = "Secret Access Log",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Access log"),
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
) -> Result<Json<AccessLogResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state
        .vault
        .list_access_log(&grant, SecretId::from_i64(secret.into_inner()))
        .await;

    record_vault_operation(VaultOperation::AccessLog, outcome_label(&result));

    let entries = result.map_err(into_status_error)?;

    Ok(Json(AccessLogResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    }))
}
