//! Identity service.

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::{
    auth::{
        errors::IdentityServiceError,
        models::{
            AuthenticatedUser, CredentialRecord, NewRegistration, NewUser, RegisteredUser, UserId,
            UserRecord, looks_like_email, normalize_email,
        },
        password::{PasswordHasher, StoredCredential, is_strong_enough, legacy_matches},
        repository::PgIdentityRepository,
        token::{IssuedToken, generate_token, hash_token},
    },
    database::Db,
};

/// Lifetime of an email verification token.
pub const DEFAULT_VERIFICATION_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Lifetime of a sign-in session.
pub const SESSION_TTL: SignedDuration = SignedDuration::from_hours(7 * 24);

#[derive(Debug, Clone)]
pub struct PgIdentityService {
    db: Db,
    repository: PgIdentityRepository,
    hasher: PasswordHasher,
    verification_ttl: SignedDuration,
}

impl PgIdentityService {
    #[must_use]
    pub fn new(db: Db, hasher: PasswordHasher, verification_ttl: SignedDuration) -> Self {
        Self {
            db,
            repository: PgIdentityRepository::new(),
            hasher,
            verification_ttl,
        }
    }

    /// Re-hash a verified plaintext credential. Failures are logged, never surfaced.
    async fn migrate_legacy_credential(&self, credential: &CredentialRecord, password: &str) {
        let hash = match self.hasher.hash(password).await {
            Ok(hash) => hash,
            Err(error) => {
                warn!(user_id = %credential.id, "failed to hash legacy credential: {error}");

                return;
            }
        };

        match self
            .repository
            .replace_legacy_password(self.db.pool(), credential.id, &credential.password, &hash)
            .await
        {
            Ok(0) => debug!(user_id = %credential.id, "legacy credential already migrated"),
            Ok(_) => info!(user_id = %credential.id, "migrated legacy credential to bcrypt"),
            Err(error) => {
                warn!(user_id = %credential.id, "failed to store migrated credential: {error}");
            }
        }
    }

    async fn issue_token_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<IssuedToken, IdentityServiceError> {
        let token = generate_token();
        let expires_at = Timestamp::now() + self.verification_ttl;

        self.repository
            .replace_verification_token(tx, user, &token.hash(), expires_at)
            .await?;

        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl IdentityService for PgIdentityService {
    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityServiceError> {
        let login = login.trim();

        if login.is_empty() || password.is_empty() {
            return Err(IdentityServiceError::MissingFields);
        }

        let Some(credential) = self
            .repository
            .find_credential_by_login(self.db.pool(), login)
            .await?
        else {
            self.hasher.burn(password).await;

            debug!(login, "login rejected: unknown login");

            return Err(IdentityServiceError::InvalidCredentials);
        };

        match StoredCredential::classify(&credential.password) {
            StoredCredential::Hashed(hash) => {
                let matches = match self.hasher.verify(password, hash).await {
                    Ok(matches) => matches,
                    Err(error) => {
                        warn!(user_id = %credential.id, "stored credential is unusable: {error}");

                        false
                    }
                };

                if !matches {
                    debug!(user_id = %credential.id, "login rejected: password mismatch");

                    return Err(IdentityServiceError::InvalidCredentials);
                }

                if credential.is_verified != Some(true) {
                    return Err(IdentityServiceError::EmailNotVerified);
                }
            }
            StoredCredential::Legacy(stored) => {
                if !legacy_matches(stored, password) {
                    debug!(user_id = %credential.id, "login rejected: password mismatch");

                    return Err(IdentityServiceError::InvalidCredentials);
                }

                // Accounts that predate verification carry NULL and may log in.
                if credential.is_verified == Some(false) {
                    return Err(IdentityServiceError::EmailNotVerified);
                }

                self.migrate_legacy_credential(&credential, password).await;
            }
        }

        Ok(credential.into())
    }

    async fn register(
        &self,
        registration: NewRegistration,
    ) -> Result<RegisteredUser, IdentityServiceError> {
        let login = registration.login.trim();
        let email = normalize_email(&registration.email);
        let nickname = registration.nickname.trim();

        if login.is_empty()
            || nickname.is_empty()
            || registration.password.is_empty()
            || !looks_like_email(&email)
        {
            return Err(IdentityServiceError::MissingFields);
        }

        if !is_strong_enough(&registration.password) {
            return Err(IdentityServiceError::WeakPassword);
        }

        let password_hash = self.hasher.hash(&registration.password).await?;

        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .create_user(
                &mut tx,
                &NewUser {
                    login: login.to_string(),
                    email,
                    nickname: nickname.to_string(),
                    password_hash,
                },
            )
            .await?;

        let verification = self.issue_token_in(&mut tx, user.id).await?;

        tx.commit().await?;

        info!(user_id = %user.id, "registered user");

        Ok(RegisteredUser { user, verification })
    }

    async fn issue_verification_token(
        &self,
        user: UserId,
    ) -> Result<IssuedToken, IdentityServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.find_user(&mut tx, user).await?;

        let issued = self.issue_token_in(&mut tx, user).await?;

        tx.commit().await?;

        Ok(issued)
    }

    async fn resend_verification(
        &self,
        email: &str,
    ) -> Result<Option<IssuedToken>, IdentityServiceError> {
        let email = normalize_email(email);

        if email.is_empty() {
            return Err(IdentityServiceError::MissingFields);
        }

        let mut tx = self.db.begin().await?;

        let Some(user) = self.repository.find_user_by_email(&mut tx, &email).await? else {
            return Ok(None);
        };

        if user.is_verified == Some(true) {
            return Ok(None);
        }

        let issued = self.issue_token_in(&mut tx, user.id).await?;

        tx.commit().await?;

        Ok(Some(issued))
    }

    async fn redeem_verification_token(&self, token: &str) -> Result<UserId, IdentityServiceError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(IdentityServiceError::TokenNotFound);
        }

        let token_hash = hash_token(token);

        let mut tx = self.db.begin().await?;

        let Some(user) = self
            .repository
            .consume_verification_token(&mut tx, &token_hash)
            .await?
        else {
            let state = self
                .repository
                .find_verification_token_state(&mut tx, &token_hash)
                .await?;

            return Err(match state {
                None => IdentityServiceError::TokenNotFound,
                Some(state) => {
                    debug!(
                        user_id = %state.user_id,
                        consumed = state.consumed,
                        expired = state.expired,
                        "verification token rejected"
                    );

                    IdentityServiceError::TokenExpired
                }
            });
        };

        self.repository.mark_user_verified(&mut tx, user).await?;

        tx.commit().await?;

        info!(user_id = %user, "verified email address");

        Ok(user)
    }

    async fn find_user(&self, user: UserId) -> Result<UserRecord, IdentityServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.find_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn start_session(&self, user: UserId) -> Result<IssuedToken, IdentityServiceError> {
        let token = generate_token();
        let expires_at = Timestamp::now() + SESSION_TTL;

        self.repository
            .create_session(self.db.pool(), user, &token.hash(), expires_at)
            .await?;

        debug!(user_id = %user, "started session");

        Ok(IssuedToken { token, expires_at })
    }

    async fn resolve_session(&self, token: &str) -> Result<AuthenticatedUser, IdentityServiceError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(IdentityServiceError::TokenNotFound);
        }

        self.repository
            .find_session_user(self.db.pool(), &hash_token(token))
            .await?
            .ok_or(IdentityServiceError::TokenNotFound)
    }

    async fn end_session(&self, token: &str) -> Result<(), IdentityServiceError> {
        let token = token.trim();

        if token.is_empty() {
            return Ok(());
        }

        self.repository
            .delete_session(self.db.pool(), &hash_token(token))
            .await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Login, registration and email verification.
pub trait IdentityService: Send + Sync {
    /// Resolves a login/password pair to a user, migrating plaintext credentials on success.
    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityServiceError>;

    /// Creates an unverified account and its first verification token.
    async fn register(
        &self,
        registration: NewRegistration,
    ) -> Result<RegisteredUser, IdentityServiceError>;

    /// Replaces every outstanding verification token of the user with a fresh one.
    async fn issue_verification_token(
        &self,
        user: UserId,
    ) -> Result<IssuedToken, IdentityServiceError>;

    /// Issues a fresh token for an unverified account. `None` for unknown or verified emails.
    async fn resend_verification(
        &self,
        email: &str,
    ) -> Result<Option<IssuedToken>, IdentityServiceError>;

    /// Consumes a verification token and marks its user verified.
    async fn redeem_verification_token(&self, token: &str) -> Result<UserId, IdentityServiceError>;

    async fn find_user(&self, user: UserId) -> Result<UserRecord, IdentityServiceError>;

    /// Opens a server-side session and returns the raw cookie token.
    async fn start_session(&self, user: UserId) -> Result<IssuedToken, IdentityServiceError>;

    /// Resolves a session token. Unknown or expired tokens are `TokenNotFound`.
    async fn resolve_session(&self, token: &str) -> Result<AuthenticatedUser, IdentityServiceError>;

    /// Revokes a session. Unknown tokens are ignored.
    async fn end_session(&self, token: &str) -> Result<(), IdentityServiceError>;
}
