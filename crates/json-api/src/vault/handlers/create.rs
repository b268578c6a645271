//! Add Secret Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use orbit_app::domain::vault::{data::NewSecret, records::SecretValue};

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

/// Add Secret Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct AddSecretRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl fmt::Debug for AddSecretRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddSecretRequest")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl From<AddSecretRequest> for NewSecret {
    fn from(request: AddSecretRequest) -> Self {
        NewSecret {
            key: request.key,
            value: SecretValue::new(request.value),
            description: request.description,
        }
    }
}

/// Add Secret Handler
#[endpoint(
    tags("vault"),
    summary = "Add Secret",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Secret stored"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing key"),
        (status_code = StatusCode::CONFLICT, description = "Key already exists"),
        (status_code = StatusCode::LOCKED, description = "Vault is locked"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    json: JsonBody<AddSecretRequest>,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SecretResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state
        .vault
        .add_secret(&grant, json.into_inner().into())
        .await;

    record_vault_operation(VaultOperation::Add, outcome_label(&result));

    let secret = result.map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(secret.into()))
}
