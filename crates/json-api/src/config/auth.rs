//! Auth Config

use clap::Args;
use jiff::SignedDuration;

/// Account, session cookie and link settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Public base URL used to build verification and invitation links
    #[arg(long, env = "APP_URL", default_value = "http://localhost:8698")]
    pub app_url: String,

    /// bcrypt work factor for account and master passwords
    #[arg(long, env = "BCRYPT_COST", default_value_t = 12_u32)]
    pub bcrypt_cost: u32,

    /// Mark session cookies `Secure` (enable in production)
    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    pub secure_cookies: bool,

    /// Lifetime of email verification links in hours
    #[arg(long, env = "VERIFICATION_TTL_HOURS", default_value_t = 24_i64)]
    pub verification_ttl_hours: i64,

    /// Lifetime of invitation links in days
    #[arg(long, env = "INVITATION_TTL_DAYS", default_value_t = 7_i64)]
    pub invitation_ttl_days: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn verification_ttl(&self) -> SignedDuration {
        SignedDuration::from_hours(self.verification_ttl_hours)
    }

    #[must_use]
    pub fn invitation_ttl(&self) -> SignedDuration {
        SignedDuration::from_hours(self.invitation_ttl_days.saturating_mul(24))
    }
}
