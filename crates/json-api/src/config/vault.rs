//! Vault Config

use clap::Args;
use jiff::SignedDuration;

/// Secret vault settings.
#[derive(Debug, Args)]
pub struct VaultConfig {
    /// Seconds of inactivity after which an unlocked vault locks again
    #[arg(long, env = "VAULT_IDLE_TIMEOUT_SECONDS", default_value_t = 300_i64)]
    pub vault_idle_timeout_seconds: i64,
}

impl VaultConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> SignedDuration {
        SignedDuration::from_secs(self.vault_idle_timeout_seconds)
    }
}
