//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    auth::{
        errors::into_status_error,
        session::{end_session, session_token},
    },
    extensions::*,
    state::State,
};

/// Logout Handler
///
/// Revokes the server session and clears the session cookies. Anonymous callers get the
/// same answer.
#[endpoint(
    tags("auth"),
    summary = "Sign Out",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Signed out"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    if let Some(token) = session_token(req) {
        state
            .identity
            .end_session(token)
            .await
            .map_err(into_status_error)?;
    }

    end_session(res, state.web.secure_cookies);

    Ok(StatusCode::NO_CONTENT)
}
