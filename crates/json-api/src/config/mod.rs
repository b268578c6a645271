//! Server configuration module

use clap::Parser;

use orbit_app::context::AppSettings;

use crate::{
    config::{
        auth::AuthConfig,
        db::DatabaseConfig,
        observability::{LoggingConfig, ObservabilityConfig},
        server::ServerRuntimeConfig,
        vault::VaultConfig,
    },
    state::WebSettings,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod vault;

/// Orbit JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "orbit-json", about = "Orbit JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Accounts, sessions and links.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Secret vault settings.
    #[command(flatten)]
    pub vault: VaultConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings used to build the application services.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        let mut settings = AppSettings::new(self.database.settings());

        settings.migrate = self.database.migrate;
        settings.bcrypt_cost = self.auth.bcrypt_cost;
        settings.verification_ttl = self.auth.verification_ttl();
        settings.invitation_ttl = self.auth.invitation_ttl();
        settings.vault_idle_timeout = self.vault.idle_timeout();

        settings
    }

    #[must_use]
    pub(crate) fn web_settings(&self) -> WebSettings {
        WebSettings {
            app_url: self.auth.app_url.trim_end_matches('/').to_owned(),
            secure_cookies: self.auth.secure_cookies,
        }
    }
}
