//! Vault grant extraction.

use salvo::prelude::{Depot, Request, StatusError};

use orbit_app::{
    auth::OpaqueToken,
    domain::{companies::records::ProjectId, vault::data::VaultGrant},
};

use crate::extensions::*;

/// Header carrying the token returned by unlock.
pub(crate) const VAULT_TOKEN_HEADER: &str = "x-vault-token";

/// Build the grant for the signed-in user. A missing token means the vault is locked.
pub(crate) fn vault_grant(
    req: &Request,
    depot: &Depot,
    project: i64,
) -> Result<VaultGrant, StatusError> {
    let actor = depot.session_user_or_401()?.id;

    let token = req
        .header::<String>(VAULT_TOKEN_HEADER)
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| StatusError::locked().brief("Vault is locked"))?;

    Ok(VaultGrant {
        actor,
        project: ProjectId::from_i64(project),
        token: OpaqueToken::from(token),
    })
}
