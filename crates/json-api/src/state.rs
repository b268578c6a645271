//! State

use std::sync::Arc;

use orbit_app::{
    auth::IdentityService,
    context::AppContext,
    domain::{invitations::InvitationsService, vault::VaultService},
};

use crate::mailer::Mailer;

/// Browser-facing settings: where links point and how cookies are marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WebSettings {
    /// Public base URL without a trailing slash.
    pub(crate) app_url: String,
    pub(crate) secure_cookies: bool,
}

impl WebSettings {
    /// `<app_url>/verify?token=<token>`
    pub(crate) fn verification_link(&self, token: &str) -> String {
        format!("{}/verify?token={token}", self.app_url)
    }

    /// `<app_url>/accept-invitation?token=<token>`
    pub(crate) fn invitation_link(&self, token: &str) -> String {
        format!("{}/accept-invitation?token={token}", self.app_url)
    }

    pub(crate) fn register_with_invitation(&self, token: &str) -> String {
        format!("{}/register?invitation={token}", self.app_url)
    }

    pub(crate) fn accept_invitation_page(&self, token: &str) -> String {
        format!("{}/invitations/accept?token={token}", self.app_url)
    }
}

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) identity: Arc<dyn IdentityService>,
    pub(crate) invitations: Arc<dyn InvitationsService>,
    pub(crate) vault: Arc<dyn VaultService>,
    pub(crate) mailer: Arc<dyn Mailer>,
    pub(crate) web: WebSettings,
}

impl State {
    #[must_use]
    pub(crate) fn new(
        identity: Arc<dyn IdentityService>,
        invitations: Arc<dyn InvitationsService>,
        vault: Arc<dyn VaultService>,
        mailer: Arc<dyn Mailer>,
        web: WebSettings,
    ) -> Self {
        Self {
            identity,
            invitations,
            vault,
            mailer,
            web,
        }
    }

    #[must_use]
    pub(crate) fn from_app_context(
        app: &AppContext,
        mailer: Arc<dyn Mailer>,
        web: WebSettings,
    ) -> Arc<Self> {
        Arc::new(Self::new(
            app.identity.clone(),
            app.invitations.clone(),
            app.vault.clone(),
            mailer,
            web,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_built_from_the_app_url() {
        let web = WebSettings {
            app_url: "https://crm.example.com".to_owned(),
            secure_cookies: true,
        };

        assert_eq!(
            web.verification_link("abc"),
            "https://crm.example.com/verify?token=abc"
        );
        assert_eq!(
            web.invitation_link("abc"),
            "https://crm.example.com/accept-invitation?token=abc"
        );
        assert_eq!(
            web.register_with_invitation("abc"),
            "https://crm.example.com/register?invitation=abc"
        );
        assert_eq!(
            web.accept_invitation_page("abc"),
            "https://crm.example.com/invitations/accept?token=abc"
        );
    }
}
