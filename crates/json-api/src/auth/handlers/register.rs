//! Register Handler

use std::{fmt, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use orbit_app::auth::NewRegistration;

use crate::{
    auth::errors::into_status_error,
    extensions::*,
    invitations::{AcceptedInvitationResponse, errors::into_status_error as invitation_error},
    state::State,
};

/// Registration Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub login: String,
    pub email: String,
    pub password: String,
    pub nickname: String,

    /// Invitation to accept once the account exists.
    #[serde(default)]
    pub invitation_token: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("invitation_token", &self.invitation_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Registered Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisteredResponse {
    pub user_id: i64,
    pub login: String,
    pub email: String,

    /// Company joined through `invitation_token`.
    pub invitation: Option<AcceptedInvitationResponse>,

    /// Why `invitation_token` could not be accepted. The account exists regardless.
    pub invitation_error: Option<String>,
}

/// Register Handler
///
/// Creates an unverified account and mails the confirmation link. An optional invitation
/// token is accepted on behalf of the new account.
#[endpoint(
    tags("auth"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "Account created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing fields or weak password"),
        (status_code = StatusCode::CONFLICT, description = "Login or email already registered"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RegisteredResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let registered = state
        .identity
        .register(NewRegistration {
            login: request.login,
            email: request.email,
            password: request.password,
            nickname: request.nickname,
        })
        .await
        .map_err(into_status_error)?;

    let user = registered.user;
    let link = state
        .web
        .verification_link(registered.verification.token.as_str());

    if let Err(source) = state.mailer.send_verification(&user.email, &link).await {
        warn!(user_id = %user.id, "failed to send verification email: {source}");
    }

    let (invitation, invitation_error) = match request
        .invitation_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        None => (None, None),
        Some(token) => match state.invitations.accept_invitation(user.id, token).await {
            Ok(accepted) => {
                info!(
                    user_id = %user.id,
                    company_id = %accepted.invitation.company_id,
                    "registration accepted invitation"
                );

                (Some(accepted.into()), None)
            }
            Err(error) => (None, Some(invitation_error(error).brief)),
        },
    };

    res.status_code(StatusCode::CREATED);

    Ok(Json(RegisteredResponse {
        user_id: user.id.into_i64(),
        login: user.login,
        email: user.email,
        invitation,
        invitation_error,
    }))
}
