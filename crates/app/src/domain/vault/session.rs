//! Client-side vault unlock state.
//!
//! A [`VaultSession`] owns one unlock window for one project. Time is always
//! passed in by the caller, so expiry is decided the same way in a UI timer, a
//! CLI loop, or a test.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    auth::UserId,
    domain::{
        companies::records::ProjectId,
        vault::{
            data::{NewSecret, SecretUpdate, VaultGrant},
            errors::VaultServiceError,
            records::{ProjectSecretRecord, SecretAccessRecord, SecretId, SecretValue},
            service::{DEFAULT_IDLE_TIMEOUT, VaultService},
        },
    },
};

#[derive(Debug)]
enum UnlockState {
    Locked,
    Unlocked {
        grant: VaultGrant,
        last_activity_at: Timestamp,
        /// Last time the server saw this grant.
        reported_at: Timestamp,
    },
}

/// Minimum gap between activity reports sent to the server.
pub const ACTIVITY_REPORT_INTERVAL: SignedDuration = SignedDuration::from_secs(30);

pub struct VaultSession<S: ?Sized> {
    service: Arc<S>,
    actor: UserId,
    project: ProjectId,
    idle_timeout: SignedDuration,
    state: UnlockState,
    failed_attempts: u32,
    revealed: FxHashMap<SecretId, SecretValue>,
}

impl<S: ?Sized> std::fmt::Debug for VaultSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("actor", &self.actor)
            .field("project", &self.project)
            .field("idle_timeout", &self.idle_timeout)
            .field("unlocked", &matches!(self.state, UnlockState::Unlocked { .. }))
            .field("failed_attempts", &self.failed_attempts)
            .field("revealed", &self.revealed.len())
            .finish_non_exhaustive()
    }
}

impl<S: VaultService + ?Sized> VaultSession<S> {
    #[must_use]
    pub fn new(service: Arc<S>, actor: UserId, project: ProjectId) -> Self {
        Self {
            service,
            actor,
            project,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            state: UnlockState::Locked,
            failed_attempts: 0,
            revealed: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn project(&self) -> ProjectId {
        self.project
    }

    #[must_use]
    pub fn idle_timeout(&self) -> SignedDuration {
        self.idle_timeout
    }

    /// Consecutive wrong master passwords since the last successful unlock.
    #[must_use]
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Whether the vault is still unlocked at `now`. Locks it if the idle window elapsed.
    pub fn is_unlocked(&mut self, now: Timestamp) -> bool {
        self.expire_if_idle(now);

        matches!(self.state, UnlockState::Unlocked { .. })
    }

    /// When the vault locks itself absent further activity.
    #[must_use]
    pub fn lock_deadline(&self) -> Option<Timestamp> {
        match &self.state {
            UnlockState::Locked => None,
            UnlockState::Unlocked {
                last_activity_at, ..
            } => last_activity_at.checked_add(self.idle_timeout).ok(),
        }
    }

    /// Any user interaction. Returns whether the vault is still unlocked.
    ///
    /// The server's idle window is refreshed too, at most once per
    /// [`ACTIVITY_REPORT_INTERVAL`].
    pub async fn record_activity(&mut self, now: Timestamp) -> bool {
        let Ok(grant) = self.grant(now) else {
            return false;
        };

        let UnlockState::Unlocked { reported_at, .. } = &self.state else {
            return false;
        };

        if now.duration_since(*reported_at) < ACTIVITY_REPORT_INTERVAL {
            return true;
        }

        let result = self.service.touch(&grant).await;

        match self.observe(result) {
            Ok(()) => {
                if let UnlockState::Unlocked { reported_at, .. } = &mut self.state {
                    *reported_at = now;
                }

                true
            }
            Err(VaultServiceError::VaultLocked) => false,
            Err(error) => {
                warn!(project_id = %self.project, "failed to report vault activity: {error}");

                true
            }
        }
    }

    /// Plaintext previously revealed in this unlock window.
    pub fn cached_value(&mut self, now: Timestamp, secret: SecretId) -> Option<&SecretValue> {
        self.expire_if_idle(now);

        self.revealed.get(&secret)
    }

    /// Drop one cached plaintext, e.g. when the user hides it again.
    pub fn hide(&mut self, secret: SecretId) {
        self.revealed.remove(&secret);
    }

    /// Check the master password with the server. An already open grant is
    /// revoked first.
    ///
    /// # Errors
    ///
    /// Returns [`VaultServiceError::WrongMasterPassword`] on a mismatch, which
    /// also counts as a failed attempt, or whatever else the service reports.
    pub async fn unlock(
        &mut self,
        now: Timestamp,
        master_password: &str,
    ) -> Result<(), VaultServiceError> {
        self.lock().await;

        let result = self
            .service
            .unlock(self.actor, self.project, master_password)
            .await;

        match result {
            Ok(unlocked) => {
                self.revealed.clear();
                self.failed_attempts = 0;
                self.idle_timeout = unlocked.idle_timeout;
                self.state = UnlockState::Unlocked {
                    grant: VaultGrant {
                        actor: self.actor,
                        project: self.project,
                        token: unlocked.token,
                    },
                    last_activity_at: now,
                    reported_at: now,
                };

                Ok(())
            }
            Err(error) => {
                if matches!(error, VaultServiceError::WrongMasterPassword) {
                    self.failed_attempts = self.failed_attempts.saturating_add(1);
                }

                Err(error)
            }
        }
    }

    /// Lock now, wiping cached plaintext and revoking the server session.
    pub async fn lock(&mut self) {
        let UnlockState::Unlocked { grant, .. } = self.lock_locally() else {
            return;
        };

        if let Err(error) = self.service.lock(&grant).await {
            warn!(project_id = %self.project, "failed to revoke vault session: {error}");
        }
    }

    /// List secret metadata.
    ///
    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn list_secrets(
        &mut self,
        now: Timestamp,
    ) -> Result<Vec<ProjectSecretRecord>, VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        let result = self.service.list_secrets(&grant).await;

        self.observe(result)
    }

    /// Reveal a secret and keep it in the unlock-window cache.
    ///
    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn reveal_secret(
        &mut self,
        now: Timestamp,
        secret: SecretId,
    ) -> Result<SecretValue, VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        let result = self.service.reveal_secret(&grant, secret).await;

        let value = self.observe(result)?;

        self.revealed.insert(secret, value.clone());

        Ok(value)
    }

    /// Fetch a secret for the clipboard. Not cached.
    ///
    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn copy_secret(
        &mut self,
        now: Timestamp,
        secret: SecretId,
    ) -> Result<SecretValue, VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        let result = self.service.copy_secret(&grant, secret).await;

        self.observe(result)
    }

    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn add_secret(
        &mut self,
        now: Timestamp,
        secret: NewSecret,
    ) -> Result<ProjectSecretRecord, VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        let result = self.service.add_secret(&grant, secret).await;

        self.observe(result)
    }

    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn update_secret(
        &mut self,
        now: Timestamp,
        secret: SecretId,
        update: SecretUpdate,
    ) -> Result<(), VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        self.revealed.remove(&secret);

        let result = self.service.update_secret(&grant, secret, update).await;

        self.observe(result)
    }

    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn delete_secret(
        &mut self,
        now: Timestamp,
        secret: SecretId,
    ) -> Result<(), VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        self.revealed.remove(&secret);

        let result = self.service.delete_secret(&grant, secret).await;

        self.observe(result)
    }

    /// # Errors
    ///
    /// Returns [`VaultServiceError::VaultLocked`] without calling the service
    /// when locked, or whatever the service reports.
    pub async fn list_access_log(
        &mut self,
        now: Timestamp,
        secret: SecretId,
    ) -> Result<Vec<SecretAccessRecord>, VaultServiceError> {
        let grant = self.grant_for_call(now)?;

        let result = self.service.list_access_log(&grant, secret).await;

        self.observe(result)
    }

    /// Count `now` as activity and hand out the grant, or fail fast when locked.
    fn grant(&mut self, now: Timestamp) -> Result<VaultGrant, VaultServiceError> {
        self.expire_if_idle(now);

        match &mut self.state {
            UnlockState::Locked => Err(VaultServiceError::VaultLocked),
            UnlockState::Unlocked {
                grant,
                last_activity_at,
                ..
            } => {
                *last_activity_at = (*last_activity_at).max(now);

                Ok(grant.clone())
            }
        }
    }

    /// [`Self::grant`] for a service call, which refreshes the server's idle window on its own.
    fn grant_for_call(&mut self, now: Timestamp) -> Result<VaultGrant, VaultServiceError> {
        let grant = self.grant(now)?;

        if let UnlockState::Unlocked { reported_at, .. } = &mut self.state {
            *reported_at = (*reported_at).max(now);
        }

        Ok(grant)
    }

    fn expire_if_idle(&mut self, now: Timestamp) {
        let UnlockState::Unlocked {
            last_activity_at, ..
        } = &self.state
        else {
            return;
        };

        if now.duration_since(*last_activity_at) > self.idle_timeout {
            debug!(project_id = %self.project, "vault locked after inactivity");

            self.lock_locally();
        }
    }

    /// The server saying the vault is locked is authoritative.
    fn observe<T>(&mut self, result: Result<T, VaultServiceError>) -> Result<T, VaultServiceError> {
        if matches!(result, Err(VaultServiceError::VaultLocked)) {
            self.lock_locally();
        }

        result
    }

    fn lock_locally(&mut self) -> UnlockState {
        self.revealed.clear();

        std::mem::replace(&mut self.state, UnlockState::Locked)
    }
}
