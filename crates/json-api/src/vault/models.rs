//! Vault response bodies.

use std::fmt;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use orbit_app::domain::vault::records::{ProjectSecretRecord, SecretAccessRecord, SecretValue};

/// Secret metadata. Values are only returned by reveal and copy.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SecretResponse {
    pub id: i64,
    pub key: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub created_by_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectSecretRecord> for SecretResponse {
    fn from(secret: ProjectSecretRecord) -> Self {
        Self {
            id: secret.id.into_i64(),
            key: secret.key,
            description: secret.description,
            created_by: secret.created_by.into_i64(),
            created_by_name: secret.created_by_name,
            created_at: secret.created_at.to_string(),
            updated_at: secret.updated_at.to_string(),
        }
    }
}

/// Secret Value Response
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct SecretValueResponse {
    pub value: String,
}

impl fmt::Debug for SecretValueResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValueResponse(**redacted**)")?;
        Ok(())
    }
}

impl From<SecretValue> for SecretValueResponse {
    fn from(value: SecretValue) -> Self {
        Self {
            value: value.expose().to_owned(),
        }
    }
}

/// Access Log Entry Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SecretAccessResponse {
    pub user_id: i64,
    pub user_name: String,

    /// `view` or `copy`
    pub action: String,

    pub created_at: String,
}

impl From<SecretAccessRecord> for SecretAccessResponse {
    fn from(entry: SecretAccessRecord) -> Self {
        Self {
            user_id: entry.user_id.into_i64(),
            user_name: entry.user_name,
            action: entry.action.to_string(),
            created_at: entry.created_at.to_string(),
        }
    }
}
