//! Create Invitation Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use orbit_app::domain::{
    companies::records::CompanyId,
    invitations::{data::NewInvitation, records::IssuedInvitation},
};

use crate::{extensions::*, invitations::errors::into_status_error, state::State};

/// Create Invitation Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateInvitationRequest {
    pub email: String,

    /// `Employee` or `Partner`
    pub role: String,
}

/// Invitation Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvitationCreatedResponse {
    pub id: i64,
    pub email: String,
    pub company_id: i64,
    pub role: String,
    pub expires_at: String,
}

impl From<&IssuedInvitation> for InvitationCreatedResponse {
    fn from(issued: &IssuedInvitation) -> Self {
        let invitation = &issued.invitation;

        Self {
            id: invitation.id.into_i64(),
            email: invitation.email.clone(),
            company_id: invitation.company_id.into_i64(),
            role: invitation.role.to_string(),
            expires_at: invitation.expires_at.to_string(),
        }
    }
}

/// Create Invitation Handler
///
/// Invites an email address into the company and mails the invitation link.
#[endpoint(
    tags("invitations"),
    summary = "Invite To Company",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Invitation sent"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid email or role"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::FORBIDDEN, description = "Only partners may invite"),
        (status_code = StatusCode::NOT_FOUND, description = "Company not found"),
        (status_code = StatusCode::CONFLICT, description = "Pending invitation or existing worker"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    company: PathParam<i64>,
    json: JsonBody<CreateInvitationRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<InvitationCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let inviter = depot.session_user_or_401()?.id;
    let request = json.into_inner();

    let issued = state
        .invitations
        .create_invitation(
            inviter,
            NewInvitation {
                email: request.email,
                company: CompanyId::from_i64(company.into_inner()),
                role: request.role,
            },
        )
        .await
        .map_err(into_status_error)?;

    let link = state.web.invitation_link(issued.token.as_str());

    if let Err(source) = state
        .mailer
        .send_invitation(
            &issued.invitation.email,
            &issued.company_name,
            issued.invitation.role,
            &link,
        )
        .await
    {
        warn!(
            invitation_id = %issued.invitation.id,
            "failed to send invitation email: {source}"
        );
    }

    res.status_code(StatusCode::CREATED);

    Ok(Json(InvitationCreatedResponse::from(&issued)))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use orbit_app::domain::{
        companies::records::CompanyRole,
        invitations::{
            InvitationsServiceError,
            records::{InvitationRecord, InvitationStatus},
        },
    };

    use crate::test_helpers::{Mocks, TEST_APP_URL, TEST_USER_ID, opaque};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.session_service(
            Router::with_path("companies/{company}/invitations").post(handler),
        )
    }

    fn issued_invitation() -> IssuedInvitation {
        IssuedInvitation {
            token: opaque("invite-me"),
            invitation: InvitationRecord {
                id: 11.into(),
                email: "bob@example.com".to_owned(),
                company_id: CompanyId::from_i64(3),
                invited_by: TEST_USER_ID,
                role: CompanyRole::Partner,
                status: InvitationStatus::Pending,
                expires_at: Timestamp::UNIX_EPOCH,
                created_at: Timestamp::UNIX_EPOCH,
                accepted_at: None,
                accepted_by: None,
            },
            company_name: "Acme".to_owned(),
        }
    }

    #[tokio::test]
    async fn partner_invites_and_link_is_mailed() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_create_invitation()
            .once()
            .withf(|inviter, invitation| {
                *inviter == TEST_USER_ID
                    && *invitation
                        == NewInvitation {
                            email: "Bob@Example.com".to_owned(),
                            company: CompanyId::from_i64(3),
                            role: "Partner".to_owned(),
                        }
            })
            .return_once(|_, _| Ok(issued_invitation()));

        mocks
            .mailer
            .expect_send_invitation()
            .once()
            .withf(|to, company, role, link| {
                to == "bob@example.com"
                    && company == "Acme"
                    && *role == CompanyRole::Partner
                    && link == format!("{TEST_APP_URL}/accept-invitation?token=invite-me")
            })
            .return_once(|_, _, _, _| Ok(()));

        let mut res = TestClient::post("http://example.com/companies/3/invitations")
            .json(&json!({ "email": "Bob@Example.com", "role": "Partner" }))
            .send(&make_service(mocks))
            .await;

        let body: InvitationCreatedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.id, 11);
        assert_eq!(body.email, "bob@example.com");
        assert_eq!(body.role, "Partner");

        Ok(())
    }

    #[tokio::test]
    async fn employees_cannot_invite() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_create_invitation()
            .once()
            .return_once(|_, _| Err(InvitationsServiceError::Forbidden));

        mocks.mailer.expect_send_invitation().never();

        let res = TestClient::post("http://example.com/companies/3/invitations")
            .json(&json!({ "email": "bob@example.com", "role": "Employee" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn pending_invitation_is_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_create_invitation()
            .once()
            .return_once(|_, _| Err(InvitationsServiceError::DuplicateInvitation));

        let res = TestClient::post("http://example.com/companies/3/invitations")
            .json(&json!({ "email": "bob@example.com", "role": "Employee" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_role_is_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_create_invitation()
            .once()
            .return_once(|_, _| Err(InvitationsServiceError::InvalidRole));

        let res = TestClient::post("http://example.com/companies/3/invitations")
            .json(&json!({ "email": "bob@example.com", "role": "Owner" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
