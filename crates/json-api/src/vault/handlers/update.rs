//! Update Secret Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use orbit_app::domain::vault::{
    data::SecretUpdate,
    records::{SecretId, SecretValue},
};

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::{
        errors::{into_status_error, outcome_label},
        grant::vault_grant,
    },
};

/// Update Secret Request. Keys cannot be renamed.
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateSecretRequest {
    pub value: String,

    /// Omit to keep the current description.
    #[serde(default)]
    pub description: Option<String>,
}

impl fmt::Debug for UpdateSecretRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSecretRequest")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl From<UpdateSecretRequest> for SecretUpdate {
    fn from(request: UpdateSecretRequest) -> Self {
        SecretUpdate {
            value: SecretValue::new(request.value),
            description: request.description,
        }
    }
}

/// Update Secret Handler
#[endpoint(
    tags("vault"),
    summary = "Update Secret",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Secret updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Secret not found"),
        (status_code = StatusCode::LOCKED, description = "Vault is locked"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    secret: PathParam<i64>,
    json: JsonBody<UpdateSecretRequest>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state
        .vault
        .update_secret(
            &grant,
            SecretId::from_i64(secret.into_inner()),
            json.into_inner().into(),
        )
        .await;

    record_vault_operation(VaultOperation::Update, outcome_label(&result));

    result.map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
