//! Vault Records

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use zeroize::Zeroizing;

use crate::{
    auth::{OpaqueToken, UserId},
    domain::companies::records::ProjectId,
    ids::TypedId,
};

/// Secret Id
pub type SecretId = TypedId<ProjectSecretRecord>;

/// Secret metadata. Values are only handed out by reveal and copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSecretRecord {
    pub id: SecretId,
    pub project_id: ProjectId,
    pub key: String,
    pub description: Option<String>,
    pub created_by: UserId,

    /// Creator's display name.
    pub created_by_name: String,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Plaintext secret value, wiped on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(**redacted**)")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAccessAction {
    View,
    Copy,
}

impl SecretAccessAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Copy => "copy",
        }
    }

    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Self::View),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }
}

impl fmt::Display for SecretAccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret access log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretAccessRecord {
    pub secret_id: SecretId,
    pub user_id: UserId,
    pub user_name: String,
    pub action: SecretAccessAction,
    pub created_at: Timestamp,
}

/// Result of a successful master password check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultUnlock {
    pub token: OpaqueToken,

    /// Inactivity window after which the vault token stops working.
    pub idle_timeout: SignedDuration,
}
