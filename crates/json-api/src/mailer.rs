//! Outgoing mail.
//!
//! Only the link delivery contract lives here; the default mailer writes each link to the
//! log so a transport can be plugged in later.

use std::error::Error;

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use orbit_app::domain::companies::records::CompanyRole;

pub(crate) type MailerError = Box<dyn Error + Send + Sync>;

#[automock]
#[async_trait]
pub(crate) trait Mailer: Send + Sync {
    /// Deliver an email confirmation link.
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailerError>;

    /// Deliver a company invitation link.
    async fn send_invitation(
        &self,
        to: &str,
        company: &str,
        role: CompanyRole,
        link: &str,
    ) -> Result<(), MailerError>;
}

/// Logs links instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailerError> {
        info!(to, link, "verification email");

        Ok(())
    }

    async fn send_invitation(
        &self,
        to: &str,
        company: &str,
        role: CompanyRole,
        link: &str,
    ) -> Result<(), MailerError> {
        info!(to, company, role = %role, link, "invitation email");

        Ok(())
    }
}
