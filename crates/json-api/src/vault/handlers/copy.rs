//! Copy Secret Handler

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

/// Copy Secret Handler
///
/// Same as reveal, but the access log records a `copy`.
#[endpoint(
    tags("vault"),
    summary = "Copy Secret",
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
        .copy_secret(&grant, SecretId::from_i64(secret.into_inner()))
        .await;

    record_vault_operation(VaultOperation::Copy, outcome_label(&result));

    Ok(Json(result.map_err(into_status_error)?.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use orbit_app::domain::vault::{VaultServiceError, records::SecretValue};

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
            Router::with_path("projects/{project}/vault/secrets/{secret}/copy").post(handler),
        )
    }

    #[tokio::test]
    async fn copy_returns_the_value_without_revealing() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.vault.expect_reveal_secret().never();
        mocks
            .vault
            .expect_copy_secret()
            .once()
            .withf(|grant, secret| *grant == test_grant() && *secret == SecretId::from_i64(9))
            .return_once(|_, _| Ok(SecretValue::new("s3cret")));

        let mut res = TestClient::post("http://example.com/projects/5/vault/secrets/9/copy")
            .add_header(VAULT_TOKEN_HEADER, TEST_VAULT_TOKEN, true)
            .send(&make_service(mocks))
            .await;

        let body: SecretValueResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.value, "s3cret");

        Ok(())
    }

    #[tokio::test]
    async fn outsider_is_403() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vault
            .expect_copy_secret()
            .once()
            .return_once(|_, _| Err(VaultServiceError::Forbidden));

        let res = TestClient::post("http://example.com/projects/5/vault/secrets/9/copy")
            .add_header(VAULT_TOKEN_HEADER, TEST_VAULT_TOKEN, true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
