//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use orbit_app::{
    auth::{AuthenticatedUser, IssuedToken, MockIdentityService, OpaqueToken, UserId, UserRecord},
    domain::{invitations::MockInvitationsService, vault::MockVaultService},
};

use crate::{
    auth::session::SessionUser,
    extensions::*,
    mailer::MockMailer,
    state::{State, WebSettings},
};

pub(crate) const TEST_USER_ID: UserId = UserId::from_i64(7);
pub(crate) const TEST_APP_URL: &str = "https://crm.example.com";

#[salvo::handler]
pub(crate) async fn inject_session(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_session_user(SessionUser {
        id: TEST_USER_ID,
        nickname: "Tester".to_owned(),
    });

    ctrl.call_next(req, depot, res).await;
}

pub(crate) fn web_settings() -> WebSettings {
    WebSettings {
        app_url: TEST_APP_URL.to_owned(),
        secure_cookies: true,
    }
}

/// Mocked collaborators. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) identity: MockIdentityService,
    pub(crate) invitations: MockInvitationsService,
    pub(crate) vault: MockVaultService,
    pub(crate) mailer: MockMailer,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        Arc::new(State::new(
            Arc::new(self.identity),
            Arc::new(self.invitations),
            Arc::new(self.vault),
            Arc::new(self.mailer),
            web_settings(),
        ))
    }

    /// Serve `route` to anonymous callers.
    pub(crate) fn service(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.into_state())).push(route))
    }

    /// Serve `route` as if [`TEST_USER_ID`] were signed in.
    pub(crate) fn session_service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(inject_session)
                .push(route),
        )
    }
}

pub(crate) fn opaque(token: &str) -> OpaqueToken {
    OpaqueToken::from(token.to_owned())
}

pub(crate) fn issued(token: &str) -> IssuedToken {
    IssuedToken {
        token: opaque(token),
        expires_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_user(id: i64, login: &str) -> UserRecord {
    UserRecord {
        id: UserId::from_i64(id),
        login: login.to_owned(),
        email: format!("{login}@example.com"),
        nickname: login.to_uppercase(),
        is_verified: Some(false),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn authenticated(id: i64, login: &str, nickname: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::from_i64(id),
        login: login.to_owned(),
        nickname: nickname.to_owned(),
    }
}
