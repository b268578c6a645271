//! Accept Invitation Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extensions::*,
    invitations::{AcceptedInvitationResponse, errors::into_status_error},
    state::State,
};

/// Accept Invitation Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AcceptInvitationRequest {
    pub token: String,
}

/// Accept Invitation Handler
///
/// Consumes the invitation for the signed-in user and grants its role.
#[endpoint(
    tags("invitations"),
    summary = "Accept Invitation",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Invitation accepted"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Sign in required"),
        (status_code = StatusCode::FORBIDDEN, description = "Invitation belongs to another email"),
        (status_code = StatusCode::NOT_FOUND, description = "Invitation not found"),
        (status_code = StatusCode::CONFLICT, description = "Invitation already used"),
        (status_code = StatusCode::GONE, description = "Invitation expired"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AcceptInvitationRequest>,
    depot: &mut Depot,
) -> Result<Json<AcceptedInvitationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.session_user_or_401()?.id;

    let accepted = state
        .invitations
        .accept_invitation(user, json.into_inner().token.trim())
        .await
        .map_err(into_status_error)?;

    info!(
        user_id = %user,
        company_id = %accepted.invitation.company_id,
        outcome = ?accepted.outcome,
        "invitation accepted"
    );

    Ok(Json(accepted.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use orbit_app::domain::{
        companies::records::{CompanyId, CompanyRole},
        invitations::{
            InvitationsServiceError,
            records::{AcceptOutcome, AcceptedInvitation, InvitationRecord, InvitationStatus},
        },
    };

    use crate::test_helpers::{Mocks, TEST_USER_ID};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.session_service(Router::with_path("invitations/accept").post(handler))
    }

    fn accepted(outcome: AcceptOutcome) -> AcceptedInvitation {
        AcceptedInvitation {
            invitation: InvitationRecord {
                id: 1.into(),
                email: "tester@example.com".to_owned(),
                company_id: CompanyId::from_i64(3),
                invited_by: 9.into(),
                role: CompanyRole::Partner,
                status: InvitationStatus::Accepted,
                expires_at: Timestamp::UNIX_EPOCH,
                created_at: Timestamp::UNIX_EPOCH,
                accepted_at: Some(Timestamp::UNIX_EPOCH),
                accepted_by: Some(TEST_USER_ID),
            },
            outcome,
        }
    }

    #[tokio::test]
    async fn accepting_grants_the_role() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_accept_invitation()
            .once()
            .withf(|user, token| *user == TEST_USER_ID && token == "invite-me")
            .return_once(|_, _| Ok(accepted(AcceptOutcome::Joined)));

        let mut res = TestClient::post("http://example.com/invitations/accept")
            .json(&json!({ "token": " invite-me " }))
            .send(&make_service(mocks))
            .await;

        let body: AcceptedInvitationResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.company_id, 3);
        assert_eq!(body.role, "Partner");
        assert_eq!(body.outcome, "joined");

        Ok(())
    }

    #[tokio::test]
    async fn existing_member_is_informational() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_accept_invitation()
            .once()
            .return_once(|_, _| Ok(accepted(AcceptOutcome::AlreadyMember)));

        let mut res = TestClient::post("http://example.com/invitations/accept")
            .json(&json!({ "token": "invite-me" }))
            .send(&make_service(mocks))
            .await;

        let body: AcceptedInvitationResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.outcome, "already_member");

        Ok(())
    }

    #[tokio::test]
    async fn used_invitation_is_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_accept_invitation()
            .once()
            .return_once(|_, _| Err(InvitationsServiceError::AlreadyResolved));

        let res = TestClient::post("http://example.com/invitations/accept")
            .json(&json!({ "token": "invite-me" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn other_recipient_is_403() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .invitations
            .expect_accept_invitation()
            .once()
            .return_once(|_, _| Err(InvitationsServiceError::EmailMismatch));

        let res = TestClient::post("http://example.com/invitations/accept")
            .json(&json!({ "token": "invite-me" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
