//! Set Master Password Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use orbit_app::domain::companies::records::ProjectId;

use crate::{
    extensions::*,
    observability::{VaultOperation, record_vault_operation},
    state::State,
    vault::errors::{into_status_error, outcome_label},
};

/// Master Password Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct MasterPasswordRequest {
    pub password: String,
}

impl fmt::Debug for MasterPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterPasswordRequest(**redacted**)")?;
        Ok(())
    }
}

/// Set Master Password Handler
///
/// Replaces the project's master password and locks every open vault session.
#[endpoint(
    tags("vault"),
    summary = "Set Master Password",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Master password changed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Password too short"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::FORBIDDEN, description = "Partners only"),
        (status_code = StatusCode::NOT_FOUND, description = "Project not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    project: PathParam<i64>,
    json: JsonBody<MasterPasswordRequest>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.session_user_or_401()?.id;

    let result = state
        .vault
        .set_master_password(
            actor,
            ProjectId::from_i64(project.into_inner()),
            &json.into_inner().password,
        )
        .await;

    record_vault_operation(VaultOperation::SetMasterPassword, outcome_label(&result));

    result.map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use orbit_app::domain::vault::VaultServiceError;

    use crate::test_helpers::{Mocks, TEST_USER_ID};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.session_service(
            Router::with_path("projects/{project}/vault/master-password").put(handler),
        )
    }

    #[tokio::test]
    async fn partner_sets_the_master_password() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vault
            .expect_set_master_password()
            .once()
            .withf(|actor, project, password| {
                *actor == TEST_USER_ID
                    && *project == ProjectId::from_i64(5)
                    && password == "open sesame"
            })
            .return_once(|_, _, _| Ok(()));

        let res = TestClient::put("http://example.com/projects/5/vault/master-password")
            .json(&json!({ "password": "open sesame" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn employees_are_forbidden() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vault
            .expect_set_master_password()
            .once()
            .return_once(|_, _, _| Err(VaultServiceError::Forbidden));

        let res = TestClient::put("http://example.com/projects/5/vault/master-password")
            .json(&json!({ "password": "open sesame" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn short_password_is_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vault
            .expect_set_master_password()
            .once()
            .return_once(|_, _, _| Err(VaultServiceError::WeakPassword));

        let res = TestClient::put("http://example.com/projects/5/vault/master-password")
            .json(&json!({ "password": "short" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
