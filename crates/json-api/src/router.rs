//! App Router

use salvo::Router;

use crate::{auth, invitations, vault};

/// Routes reachable without a session.
fn public_router() -> Router {
    Router::new()
        .push(
            Router::with_path("auth")
                .push(Router::with_path("login").post(auth::login::handler))
                .push(Router::with_path("logout").post(auth::logout::handler))
                .push(Router::with_path("register").post(auth::register::handler))
                .push(Router::with_path("verification/resend").post(auth::resend::handler)),
        )
        .push(Router::with_path("verify").get(auth::verify::handler))
        .push(Router::with_path("accept-invitation").get(invitations::landing::handler))
}

fn vault_router() -> Router {
    Router::with_path("projects/{project}/vault")
        .push(Router::with_path("master-password").put(vault::master_password::handler))
        .push(Router::with_path("unlock").post(vault::unlock::handler))
        .push(Router::with_path("lock").post(vault::lock::handler))
        .push(Router::with_path("activity").post(vault::activity::handler))
        .push(
            Router::with_path("secrets")
                .get(vault::index::handler)
                .post(vault::create::handler)
                .push(
                    Router::with_path("{secret}")
                        .put(vault::update::handler)
                        .delete(vault::delete::handler)
                        .push(Router::with_path("reveal").post(vault::reveal::handler))
                        .push(Router::with_path("copy").post(vault::copy::handler))
                        .push(Router::with_path("access-log").get(vault::access_log::handler)),
                ),
        )
}

pub(crate) fn app_router() -> Router {
    Router::new().push(public_router()).push(
        Router::new()
            .hoop(auth::middleware::handler)
            .push(Router::with_path("invitations/accept").post(invitations::accept::handler))
            .push(
                Router::with_path("companies/{company}/invitations")
                    .post(invitations::create::handler),
            )
            .push(vault_router()),
    )
}

#[cfg(test)]
mod tests {
    use salvo::{http::header::COOKIE, prelude::*, test::TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use orbit_app::{
        auth::{IdentityServiceError, UserId},
        domain::companies::records::ProjectId,
    };

    use crate::test_helpers::{Mocks, authenticated};

    use super::*;

    #[tokio::test]
    async fn vault_routes_require_a_session() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.vault.expect_list_secrets().never();

        let res = TestClient::get("http://example.com/projects/5/vault/secrets")
            .send(&mocks.service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn hand_written_user_id_cookie_cannot_set_the_master_password() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.identity.expect_resolve_session().never();
        mocks.vault.expect_set_master_password().never();

        let res = TestClient::put("http://example.com/projects/5/vault/master-password")
            .add_header(COOKIE, "orbit_uid=1; orbit_nickname=Admin", true)
            .json(&json!({ "password": "attacker chosen password" }))
            .send(&mocks.service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_session_token_cannot_reach_the_vault() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .identity
            .expect_resolve_session()
            .once()
            .return_once(|_| Err(IdentityServiceError::TokenNotFound));
        mocks.vault.expect_set_master_password().never();

        let res = TestClient::put("http://example.com/projects/5/vault/master-password")
            .add_header(COOKIE, "orbit_session=guessed; orbit_uid=1", true)
            .json(&json!({ "password": "attacker chosen password" }))
            .send(&mocks.service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn live_session_reaches_the_vault_as_its_owner() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .identity
            .expect_resolve_session()
            .once()
            .withf(|token| token == "live")
            .return_once(|_| Ok(authenticated(42, "alice", "Alice")));
        mocks
            .vault
            .expect_set_master_password()
            .once()
            .withf(|actor, project, password| {
                *actor == UserId::from_i64(42)
                    && *project == ProjectId::from_i64(5)
                    && password == "a strong master password"
            })
            .return_once(|_, _, _| Ok(()));

        let res = TestClient::put("http://example.com/projects/5/vault/master-password")
            .add_header(COOKIE, "orbit_session=live; orbit_uid=1", true)
            .json(&json!({ "password": "a strong master password" }))
            .send(&mocks.service(app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn invitation_landing_is_public() -> TestResult {
        let res = TestClient::get("http://example.com/accept-invitation")
            .send(&Mocks::default().service(app_router()))
            .await;

        assert_ne!(
            res.status_code,
            Some(StatusCode::UNAUTHORIZED),
            "anonymous visitors must reach the landing handler"
        );

        Ok(())
    }
}
