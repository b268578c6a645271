//! Unlock Vault Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use orbit_app::domain::{companies::records::ProjectId, vault::records::VaultUnlock};

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::errors::{into_status_error, outcome_label},
};

/// Unlock Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct UnlockRequest {
    pub master_password: String,
}

impl fmt::Debug for UnlockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnlockRequest(**redacted**)")?;
        Ok(())
    }
}

/// Unlocked Response
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct UnlockedResponse {
    /// Send back as `x-vault-token` on every vault call.
    pub vault_token: String,

    /// Seconds of inactivity before the token stops working.
    pub idle_timeout_seconds: i64,
}

impl fmt::Debug for UnlockedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedResponse")
            .field("idle_timeout_seconds", &self.idle_timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl From<VaultUnlock> for UnlockedResponse {
    fn from(unlock: VaultUnlock) -> Self {
        Self {
            vault_token: unlock.token.as_str().to_owned(),
            idle_timeout_seconds: unlock.idle_timeout.as_secs(),
        }
    }
}

/// Unlock Vault Handler
///
/// Checks the master password and opens a vault session.
#[endpoint(
    tags("vault"),
    summary = "Unlock Vault",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Vault unlocked"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Wrong master password"),
        (status_code = StatusCode::FORBIDDEN, description = "No access to this project"),
        (status_code = StatusCode::NOT_FOUND, description = "Project not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    json: JsonBody<UnlockRequest>,
    depot: &mut Depot,
) -> Result<Json<UnlockedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.session_user_or_401()?.id;

    let result = state
        .vault
        .unlock(
            actor,
            ProjectId::from_i64(project.into_inner()),
            &json.into_inner().master_password,
        )
        .await;

    record_vault_operation(VaultOperation::Unlock, outcome_label(&result));

    let unlock = result.map_err(into_status_error)?;

    Ok(Json(unlock.into()))
}
