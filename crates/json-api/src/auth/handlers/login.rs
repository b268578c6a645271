//! Login Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use orbit_app::auth::{AuthenticatedUser, IdentityServiceError};

use crate::{
    auth::{errors::into_status_error, session::start_session},
    extensions::*,
    observability::{LoginOutcome, record_login_attempt},
    state::State,
};

/// Login Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Session Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SessionResponse {
    pub user_id: i64,
    pub login: String,
    pub nickname: String,
}

impl From<AuthenticatedUser> for SessionResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.id.into_i64(),
            login: user.login,
            nickname: user.nickname,
        }
    }
}

fn login_outcome(result: &Result<AuthenticatedUser, IdentityServiceError>) -> LoginOutcome {
    match result {
        Ok(_) => LoginOutcome::Success,
        Err(IdentityServiceError::InvalidCredentials) => LoginOutcome::InvalidCredentials,
        Err(IdentityServiceError::EmailNotVerified) => LoginOutcome::EmailNotVerified,
        Err(IdentityServiceError::Hash(_) | IdentityServiceError::Sql(_)) => LoginOutcome::Error,
        Err(_) => LoginOutcome::Rejected,
    }
}

/// Login Handler
///
/// Resolves the credentials and starts a server-side session carried in a cookie.
#[endpoint(
    tags("auth"),
    summary = "Sign In",
    responses(
        (status_code = StatusCode::OK, description = "Signed in"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing login or password"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid login or password"),
        (status_code = StatusCode::FORBIDDEN, description = "Email address not confirmed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "auth.login", skip_all, fields(login = tracing::field::Empty))]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    tracing::Span::current().record("login", request.login.trim());

    let result = state
        .identity
        .authenticate(&request.login, &request.password)
        .await;

    record_login_attempt(login_outcome(&result));

    let user = result.map_err(into_status_error)?;

    let session = state
        .identity
        .start_session(user.id)
        .await
        .map_err(into_status_error)?;

    start_session(res, &user, &session, state.web.secure_cookies);

    Ok(Json(user.into()))
}
