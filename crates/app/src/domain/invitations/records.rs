//! Invitation Records

use jiff::Timestamp;

use crate::{
    auth::{OpaqueToken, UserId},
    domain::companies::records::{CompanyId, CompanyRole},
    ids::TypedId,
};

/// Invitation Id
pub type InvitationId = TypedId<InvitationRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

impl InvitationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
        }
    }

    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Invitation Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationRecord {
    pub id: InvitationId,

    /// Trimmed and lowercased.
    pub email: String,

    pub company_id: CompanyId,
    pub invited_by: UserId,
    pub role: CompanyRole,
    pub status: InvitationStatus,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub accepted_by: Option<UserId>,
}

impl InvitationRecord {
    #[must_use]
    pub fn is_past_deadline(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// A created invitation and the raw token to put in the invitation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedInvitation {
    pub token: OpaqueToken,
    pub invitation: InvitationRecord,
    pub company_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// At least one new grant was written.
    Joined,

    /// The user already held every grant the invitation carries.
    AlreadyMember,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedInvitation {
    pub invitation: InvitationRecord,
    pub outcome: AcceptOutcome,
}
