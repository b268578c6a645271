//! Invitation response bodies shared by several handlers.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use orbit_app::domain::invitations::records::{AcceptOutcome, AcceptedInvitation};

/// Accepted Invitation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AcceptedInvitationResponse {
    pub company_id: i64,

    /// `Employee` or `Partner`
    pub role: String,

    /// `joined`, or `already_member` when the user already held every grant.
    pub outcome: String,
}

impl From<AcceptedInvitation> for AcceptedInvitationResponse {
    fn from(accepted: AcceptedInvitation) -> Self {
        let outcome = match accepted.outcome {
            AcceptOutcome::Joined => "joined",
            AcceptOutcome::AlreadyMember => "already_member",
        };

        Self {
            company_id: accepted.invitation.company_id.into_i64(),
            role: accepted.invitation.role.to_string(),
            outcome: outcome.to_owned(),
        }
    }
}
