//! Vault Data

use crate::{
    auth::{OpaqueToken, UserId},
    domain::{companies::records::ProjectId, vault::records::SecretValue},
};

/// Proof of an unlocked vault: who is acting, on which project, with which vault token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultGrant {
    pub actor: UserId,
    pub project: ProjectId,
    pub token: OpaqueToken,
}

/// New Secret Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSecret {
    pub key: String,
    pub value: SecretValue,
    pub description: Option<String>,
}

/// Secret Update Data. The key is immutable; a `None` description keeps the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretUpdate {
    pub value: SecretValue,
    pub description: Option<String>,
}
