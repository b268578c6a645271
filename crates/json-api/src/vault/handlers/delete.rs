//! Delete Secret Handler

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
    },
};

/// Delete Secret Handler
#[endpoint(
    tags("vault"),
    summary = "Delete Secret",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Secret deleted"),
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
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let grant = vault_grant(req, depot, project.into_inner())?;

    let result = state
        .vault
        .delete_secret(&grant, SecretId::from_i64(secret.into_inner()))
        .await;

    record_vault_operation(VaultOperation::Delete, outcome_label(&result));

    result.map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use orbit_app::domain::vault::VaultServiceError;

    use crate::{
        test_helpers::Mocks,
        vault::grant::{
            VAULT_TOKEN_HEADER,
            tests::{TEST_VAULT_TOKEN, test_grant},
        },
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.session_service(
            Router::with_path("projects/{project}/vault/secrets/{secret}").delete(handler),
        )
    }

    #[tokio::test]
    async fn secret_is_deleted() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vault
            .expect_delete_secret()
            .once()
            .withf(|grant, secret| *grant == test_grant() && *secret == SecretId::from_i64(9))
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete("http://example.com/projects/5/vault/secrets/9")
            .add_header(VAULT_TOKEN_HEADER, TEST_VAULT_TOKEN, true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn secret_of_another_project_is_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vault
            .expect_delete_secret()
            .once()
            .return_once(|_, _| Err(VaultServiceError::NotFound));

        let res = TestClient::delete("http://example.com/projects/5/vault/secrets/9")
            .add_header(VAULT_TOKEN_HEADER, TEST_VAULT_TOKEN, true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
