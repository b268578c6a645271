//! Session cookies.
//!
//! Signing in issues an opaque token that the server stores hashed. The browser carries
//! it in `orbit_session`; only that cookie is trusted. `orbit_uid` and `orbit_nickname`
//! are set alongside for the front end to read and are never used to identify anyone.

use salvo::{
    http::cookie::{Cookie, SameSite, time::Duration},
    prelude::{Request, Response},
};
use tracing::error;

use orbit_app::auth::{
    AuthenticatedUser, IdentityService, IdentityServiceError, IssuedToken, UserId,
};

pub(crate) const SESSION_COOKIE: &str = "orbit_session";
pub(crate) const USER_ID_COOKIE: &str = "orbit_uid";
pub(crate) const NICKNAME_COOKIE: &str = "orbit_nickname";

const SESSION_MAX_AGE: Duration = Duration::days(7);

/// The signed-in user as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionUser {
    pub(crate) id: UserId,
    pub(crate) nickname: String,
}

impl From<AuthenticatedUser> for SessionUser {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
        }
    }
}

impl SessionUser {
    /// Look the request's session token up on the server.
    ///
    /// `Ok(None)` for a missing, unknown or expired token.
    pub(crate) async fn resolve(
        req: &Request,
        identity: &dyn IdentityService,
    ) -> Result<Option<Self>, IdentityServiceError> {
        let Some(token) = session_token(req) else {
            return Ok(None);
        };

        match identity.resolve_session(token).await {
            Ok(user) => Ok(Some(user.into())),
            Err(IdentityServiceError::TokenNotFound) => Ok(None),
            Err(error) => {
                error!("session lookup failed: {error}");

                Err(error)
            }
        }
    }
}

/// The raw `orbit_session` value, if any.
pub(crate) fn session_token(req: &Request) -> Option<&str> {
    req.cookie(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
}

pub(crate) fn start_session(
    res: &mut Response,
    user: &AuthenticatedUser,
    session: &IssuedToken,
    secure: bool,
) {
    res.add_cookie(session_cookie(
        SESSION_COOKIE,
        session.token.as_str().to_owned(),
        SESSION_MAX_AGE,
        secure,
    ));
    res.add_cookie(session_cookie(
        USER_ID_COOKIE,
        user.id.to_string(),
        SESSION_MAX_AGE,
        secure,
    ));
    res.add_cookie(session_cookie(
        NICKNAME_COOKIE,
        user.nickname.clone(),
        SESSION_MAX_AGE,
        secure,
    ));
}

/// Overwrite every session cookie with an expired blank.
pub(crate) fn end_session(res: &mut Response, secure: bool) {
    for name in [SESSION_COOKIE, USER_ID_COOKIE, NICKNAME_COOKIE] {
        res.add_cookie(session_cookie(name, String::new(), Duration::ZERO, secure));
    }
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}
