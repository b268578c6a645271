//! Invitation Link Landing Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::QueryParam, prelude::*};

use crate::{
    auth::session::SessionUser, extensions::*, invitations::errors::into_status_error,
    state::State,
};

/// Invitation Link Landing Handler
///
/// Checks the invitation, then sends anonymous visitors to registration and signed-in
/// users to the acceptance page.
#[endpoint(
    tags("invitations"),
    summary = "Open Invitation Link",
    responses(
        (status_code = StatusCode::SEE_OTHER, description = "Redirect to registration or acceptance"),
        (status_code = StatusCode::NOT_FOUND, description = "Invitation not found"),
        (status_code = StatusCode::GONE, description = "Invitation expired"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    token: QueryParam<String, true>,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let token = token.into_inner();
    let token = token.trim();

    state
        .invitations
        .find_invitation(token)
        .await
        .map_err(into_status_error)?;

    let signed_in = SessionUser::resolve(req, state.identity.as_ref())
        .await
        .map_err(|_| StatusError::internal_server_error())?
        .is_some();

    let location = if signed_in {
        state.web.accept_invitation_page(token)
    } else {
        state.web.register_with_invitation(token)
    };

    res.add_header(LOCATION, location, true)
        .or_500("failed to set location header")?;

    Ok(StatusCode::SEE_OTHER)
}
