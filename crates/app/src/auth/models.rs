//! Identity models.

use std::fmt;

use jiff::Timestamp;
use zeroize::Zeroizing;

use crate::{auth::token::IssuedToken, ids::TypedId};

/// User Id
pub type UserId = TypedId<UserRecord>;

/// User Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub login: String,
    pub email: String,
    pub nickname: String,

    /// `None` for accounts created before verification existed.
    pub is_verified: Option<bool>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Stored credential row, read only during authentication.
pub(crate) struct CredentialRecord {
    pub id: UserId,
    pub login: String,
    pub nickname: String,
    pub password: Zeroizing<String>,
    pub is_verified: Option<bool>,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password", &"**redacted**")
            .field("is_verified", &self.is_verified)
            .finish_non_exhaustive()
    }
}

/// Identity returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub login: String,
    pub nickname: String,
}

impl From<CredentialRecord> for AuthenticatedUser {
    fn from(credential: CredentialRecord) -> Self {
        Self {
            id: credential.id,
            login: credential.login,
            nickname: credential.nickname,
        }
    }
}

/// Self-service registration input.
#[derive(Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub login: String,
    pub email: String,
    pub password: String,
    pub nickname: String,
}

impl fmt::Debug for NewRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewRegistration")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .finish_non_exhaustive()
    }
}

/// Normalised user insert payload.
#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub login: String,
    pub email: String,
    pub nickname: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub user: UserRecord,
    pub verification: IssuedToken,
}

/// Verification token state, used to classify a failed redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VerificationTokenState {
    pub user_id: UserId,
    pub consumed: bool,
    pub expired: bool,
}

/// Trim and lowercase an email address for storage and comparison.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[must_use]
pub fn looks_like_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}
