//! Resend Verification Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{auth::errors::into_status_error, extensions::*, state::State};

/// Resend Verification Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ResendVerificationRequest {
    pub email: String,
}

/// Resend Verification Handler
///
/// Answers `202` whether or not the address belongs to an unverified account.
#[endpoint(
    tags("auth"),
    summary = "Resend Verification Email",
    responses(
        (status_code = StatusCode::ACCEPTED, description = "Request accepted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing email"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ResendVerificationRequest>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let email = json.into_inner().email;

    let issued = state
        .identity
        .resend_verification(&email)
        .await
        .map_err(into_status_error)?;

    if let Some(issued) = issued {
        let link = state.web.verification_link(issued.token.as_str());

        if let Err(source) = state.mailer.send_verification(email.trim(), &link).await {
            warn!("failed to resend verification email: {source}");
        }
    }

    Ok(StatusCode::ACCEPTED)
}
