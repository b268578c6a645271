//! App Context

use std::sync::Arc;

use jiff::SignedDuration;
use thiserror::Error;

use crate::{
    auth::{DEFAULT_VERIFICATION_TTL, IdentityService, PgIdentityService, password::PasswordHasher},
    database::{self, DatabaseSettings, Db},
    domain::{
        companies::{CompaniesService, PgCompaniesService},
        invitations::{DEFAULT_INVITATION_TTL, InvitationsService, PgInvitationsService},
        vault::{DEFAULT_IDLE_TIMEOUT, PgVaultService, VaultService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// Everything needed to build the services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database: DatabaseSettings,

    /// Apply pending migrations on startup.
    pub migrate: bool,

    /// bcrypt work factor for account and master passwords.
    pub bcrypt_cost: u32,

    pub verification_ttl: SignedDuration,
    pub invitation_ttl: SignedDuration,
    pub vault_idle_timeout: SignedDuration,
}

impl AppSettings {
    #[must_use]
    pub fn new(database: DatabaseSettings) -> Self {
        Self {
            database,
            migrate: false,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            verification_ttl: DEFAULT_VERIFICATION_TTL,
            invitation_ttl: DEFAULT_INVITATION_TTL,
            vault_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub db: Db,
    pub identity: Arc<dyn IdentityService>,
    pub companies: Arc<dyn CompaniesService>,
    pub invitations: Arc<dyn InvitationsService>,
    pub vault: Arc<dyn VaultService>,
}

impl AppContext {
    /// Connect to the database and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when the database is unreachable or migrations fail.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database)
            .await
            .map_err(AppInitError::Database)?;

        if settings.migrate {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        Ok(Self::from_db(Db::new(pool), settings))
    }

    #[must_use]
    pub fn from_db(db: Db, settings: &AppSettings) -> Self {
        let hasher = PasswordHasher::new(settings.bcrypt_cost);

        Self {
            identity: Arc::new(PgIdentityService::new(
                db.clone(),
                hasher,
                settings.verification_ttl,
            )),
            companies: Arc::new(PgCompaniesService::new(db.clone())),
            invitations: Arc::new(PgInvitationsService::new(
                db.clone(),
                settings.invitation_ttl,
            )),
            vault: Arc::new(PgVaultService::new(
                db.clone(),
                hasher,
                settings.vault_idle_timeout,
            )),
            db,
        }
    }
}
