//! Verify Email Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{auth::errors::into_status_error, extensions::*, state::State};

/// Email Verified Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct EmailVerifiedResponse {
    pub user_id: i64,
}

/// Verify Email Handler
///
/// Redeems the token from a confirmation link. Each link works once.
#[endpoint(
    tags("auth"),
    summary = "Confirm Email Address",
    responses(
        (status_code = StatusCode::OK, description = "Email confirmed"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown link"),
        (status_code = StatusCode::GONE, description = "Link expired or already used"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    token: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<EmailVerifiedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .identity
        .redeem_verification_token(&token.into_inner())
        .await
        .map_err(into_status_error)?;

    info!(user_id = %user, "email address confirmed");

    Ok(Json(EmailVerifiedResponse {
        user_id: user.into_i64(),
    }))
}
