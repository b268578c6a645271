//! Vault service.

use async_trait::async_trait;
use jiff::SignedDuration;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::{
    auth::{
        UserId,
        password::{PasswordHasher, is_strong_enough},
        token::generate_token,
    },
    database::Db,
    domain::{
        companies::{
            records::{CompanyAccess, ProjectId},
            repository::PgCompaniesRepository,
        },
        vault::{
            data::{NewSecret, SecretUpdate, VaultGrant},
            errors::VaultServiceError,
            records::{
                ProjectSecretRecord, SecretAccessAction, SecretAccessRecord, SecretId,
                SecretValue, VaultUnlock,
            },
            repository::{NewSecretRow, PgVaultRepository},
        },
    },
};

/// Inactivity window of an unlocked vault.
pub const DEFAULT_IDLE_TIMEOUT: SignedDuration = SignedDuration::from_mins(5);

#[derive(Debug, Clone)]
pub struct PgVaultService {
    db: Db,
    repository: PgVaultRepository,
    companies: PgCompaniesRepository,
    hasher: PasswordHasher,
    idle_timeout: SignedDuration,
}

impl PgVaultService {
    #[must_use]
    pub fn new(db: Db, hasher: PasswordHasher, idle_timeout: SignedDuration) -> Self {
        Self {
            db,
            repository: PgVaultRepository::new(),
            companies: PgCompaniesRepository::new(),
            hasher,
            idle_timeout,
        }
    }

    /// Resolve the actor's standing in the project's company.
    async fn project_access(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: UserId,
        project: ProjectId,
    ) -> Result<CompanyAccess, VaultServiceError> {
        let project = self.companies.find_project(tx, project).await?;

        let access = self
            .companies
            .access(tx, actor, project.company_id)
            .await?;

        if !access.has_access() {
            return Err(VaultServiceError::Forbidden);
        }

        Ok(access)
    }

    /// Check company access and refresh the vault session, or fail with `VaultLocked`.
    async fn authorize(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        grant: &VaultGrant,
    ) -> Result<(), VaultServiceError> {
        self.project_access(tx, grant.actor, grant.project).await?;

        let active = self
            .repository
            .touch_session(
                tx,
                &grant.token.hash(),
                grant.project,
                grant.actor,
                self.idle_timeout,
            )
            .await?;

        if !active {
            debug!(project_id = %grant.project, user_id = %grant.actor, "vault session idle or unknown");

            return Err(VaultServiceError::VaultLocked);
        }

        Ok(())
    }

    async fn read_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
        action: SecretAccessAction,
    ) -> Result<SecretValue, VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        let (key, value) = self
            .repository
            .find_secret_value(&mut tx, grant.project, secret)
            .await?;

        tx.commit().await?;

        self.record_access(grant, secret, key, action);

        Ok(value)
    }

    /// Append to the access log without holding up the caller.
    fn record_access(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
        key: String,
        action: SecretAccessAction,
    ) {
        let pool = self.db.pool().clone();
        let repository = self.repository.clone();
        let project = grant.project;
        let actor = grant.actor;

        tokio::spawn(async move {
            if let Err(error) = repository
                .record_access(&pool, project, secret, &key, actor, action)
                .await
            {
                warn!(
                    secret_id = %secret,
                    user_id = %actor,
                    %action,
                    "failed to record secret access: {error}"
                );
            }
        });
    }
}

#[async_trait]
impl VaultService for PgVaultService {
    async fn set_master_password(
        &self,
        actor: UserId,
        project: ProjectId,
        password: &str,
    ) -> Result<(), VaultServiceError> {
        if password.is_empty() {
            return Err(VaultServiceError::MissingFields);
        }

        if !is_strong_enough(password) {
            return Err(VaultServiceError::WeakPassword);
        }

        let mut tx = self.db.begin().await?;

        if !self.project_access(&mut tx, actor, project).await?.is_partner() {
            return Err(VaultServiceError::Forbidden);
        }

        tx.commit().await?;

        let hash = self.hasher.hash(password).await?;

        let mut tx = self.db.begin().await?;

        let revoked = self
            .repository
            .set_master_password(&mut tx, project, &hash)
            .await?;

        tx.commit().await?;

        info!(project_id = %project, user_id = %actor, revoked, "set vault master password");

        Ok(())
    }

    async fn unlock(
        &self,
        actor: UserId,
        project: ProjectId,
        master_password: &str,
    ) -> Result<VaultUnlock, VaultServiceError> {
        if master_password.is_empty() {
            return Err(VaultServiceError::MissingFields);
        }

        let mut tx = self.db.begin().await?;

        self.project_access(&mut tx, actor, project).await?;

        let hash = self
            .repository
            .find_master_password_hash(&mut tx, project)
            .await?;

        tx.commit().await?;

        let Some(hash) = hash else {
            warn!(project_id = %project, "unlock attempted on a vault without a master password");

            return Err(VaultServiceError::WrongMasterPassword);
        };

        if !self.hasher.verify(master_password, &hash).await? {
            info!(project_id = %project, user_id = %actor, "vault unlock rejected");

            return Err(VaultServiceError::WrongMasterPassword);
        }

        let token = generate_token();

        let mut tx = self.db.begin().await?;

        self.repository
            .create_session(&mut tx, &token.hash(), project, actor, self.idle_timeout)
            .await?;

        tx.commit().await?;

        debug!(project_id = %project, user_id = %actor, "vault unlocked");

        Ok(VaultUnlock {
            token,
            idle_timeout: self.idle_timeout,
        })
    }

    async fn lock(&self, grant: &VaultGrant) -> Result<(), VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository
            .delete_session(&mut tx, &grant.token.hash(), grant.project, grant.actor)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn touch(&self, grant: &VaultGrant) -> Result<(), VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn list_secrets(
        &self,
        grant: &VaultGrant,
    ) -> Result<Vec<ProjectSecretRecord>, VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        let secrets = self.repository.list_secrets(&mut tx, grant.project).await?;

        tx.commit().await?;

        Ok(secrets)
    }

    async fn reveal_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<SecretValue, VaultServiceError> {
        self.read_secret(grant, secret, SecretAccessAction::View)
            .await
    }

    async fn copy_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<SecretValue, VaultServiceError> {
        self.read_secret(grant, secret, SecretAccessAction::Copy)
            .await
    }

    async fn add_secret(
        &self,
        grant: &VaultGrant,
        secret: NewSecret,
    ) -> Result<ProjectSecretRecord, VaultServiceError> {
        let key = secret.key.trim();

        if key.is_empty() {
            return Err(VaultServiceError::MissingFields);
        }

        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        if self
            .repository
            .secret_key_exists(&mut tx, grant.project, key)
            .await?
        {
            return Err(VaultServiceError::DuplicateKey);
        }

        let created = self
            .repository
            .create_secret(
                &mut tx,
                NewSecretRow {
                    project: grant.project,
                    key,
                    value: secret.value.expose(),
                    description: secret.description.as_deref(),
                    created_by: grant.actor,
                },
            )
            .await?;

        tx.commit().await?;

        info!(secret_id = %created.id, project_id = %grant.project, "added secret");

        Ok(created)
    }

    async fn update_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
        update: SecretUpdate,
    ) -> Result<(), VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        let updated = self
            .repository
            .update_secret(
                &mut tx,
                grant.project,
                secret,
                update.value.expose(),
                update.description.as_deref(),
            )
            .await?;

        if updated == 0 {
            return Err(VaultServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<(), VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        let deleted = self
            .repository
            .delete_secret(&mut tx, grant.project, secret)
            .await?;

        if deleted == 0 {
            return Err(VaultServiceError::NotFound);
        }

        tx.commit().await?;

        info!(secret_id = %secret, project_id = %grant.project, "deleted secret");

        Ok(())
    }

    async fn list_access_log(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<Vec<SecretAccessRecord>, VaultServiceError> {
        let mut tx = self.db.begin().await?;

        self.authorize(&mut tx, grant).await?;

        if !self
            .repository
            .secret_exists(&mut tx, grant.project, secret)
            .await?
        {
            return Err(VaultServiceError::NotFound);
        }

        let entries = self.repository.list_access(&mut tx, secret).await?;

        tx.commit().await?;

        Ok(entries)
    }
}

#[automock]
#[async_trait]
/// Master-password-gated project secrets.
pub trait VaultService: Send + Sync {
    /// Replaces the project's master password and revokes open vault sessions. Partners only.
    async fn set_master_password(
        &self,
        actor: UserId,
        project: ProjectId,
        password: &str,
    ) -> Result<(), VaultServiceError>;

    /// Checks the master password and opens a vault session.
    async fn unlock(
        &self,
        actor: UserId,
        project: ProjectId,
        master_password: &str,
    ) -> Result<VaultUnlock, VaultServiceError>;

    /// Ends a vault session. Unknown sessions are ignored.
    async fn lock(&self, grant: &VaultGrant) -> Result<(), VaultServiceError>;

    /// Records user activity on an open vault, pushing back its idle deadline.
    async fn touch(&self, grant: &VaultGrant) -> Result<(), VaultServiceError>;

    async fn list_secrets(
        &self,
        grant: &VaultGrant,
    ) -> Result<Vec<ProjectSecretRecord>, VaultServiceError>;

    /// Returns a secret value and logs a `view`.
    async fn reveal_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<SecretValue, VaultServiceError>;

    /// Returns a secret value and logs a `copy`.
    async fn copy_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<SecretValue, VaultServiceError>;

    async fn add_secret(
        &self,
        grant: &VaultGrant,
        secret: NewSecret,
    ) -> Result<ProjectSecretRecord, VaultServiceError>;

    async fn update_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
        update: SecretUpdate,
    ) -> Result<(), VaultServiceError>;

    async fn delete_secret(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<(), VaultServiceError>;

    /// Most recent access first.
    async fn list_access_log(
        &self,
        grant: &VaultGrant,
        secret: SecretId,
    ) -> Result<Vec<SecretAccessRecord>, VaultServiceError>;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::{
        auth::UserRecord,
        domain::companies::records::{CompanyRecord, ProjectRecord},
        test::TestContext,
    };

    use super::*;

    const MASTER_PASSWORD: &str = "vault master password";

    struct Fixture {
        ctx: TestContext,
        partner: UserRecord,
        company: CompanyRecord,
        project: ProjectRecord,
    }

    async fn fixture() -> Result<Fixture, Box<dyn std::error::Error>> {
        let ctx = TestContext::new().await;
        let partner = ctx.register_verified_user("paula").await?;
        let company = ctx.create_company(partner.id).await?;
        let project = ctx.create_project(company.id).await?;

        ctx.vault
            .set_master_password(partner.id, project.id, MASTER_PASSWORD)
            .await?;

        Ok(Fixture {
            ctx,
            partner,
            company,
            project,
        })
    }

    async fn unlock(fixture: &Fixture, actor: UserId) -> Result<VaultGrant, VaultServiceError> {
        let unlocked = fixture
            .ctx
            .vault
            .unlock(actor, fixture.project.id, MASTER_PASSWORD)
            .await?;

        Ok(VaultGrant {
            actor,
            project: fixture.project.id,
            token: unlocked.token,
        })
    }

    fn new_secret(key: &str, value: &str) -> NewSecret {
        NewSecret {
            key: key.to_string(),
            value: SecretValue::new(value),
            description: Some(format!("{key} credentials")),
        }
    }

    async fn wait_for_access_log(
        fixture: &Fixture,
        grant: &VaultGrant,
        secret: SecretId,
        expected: usize,
    ) -> Result<Vec<SecretAccessRecord>, VaultServiceError> {
        for _ in 0..100 {
            let entries = fixture.ctx.vault.list_access_log(grant, secret).await?;

            if entries.len() >= expected {
                return Ok(entries);
            }

            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        fixture.ctx.vault.list_access_log(grant, secret).await
    }

    #[tokio::test]
    async fn unlock_requires_the_master_password() -> TestResult {
        let fixture = fixture().await?;

        let wrong = fixture
            .ctx
            .vault
            .unlock(fixture.partner.id, fixture.project.id, "not the password")
            .await;

        let right = fixture
            .ctx
            .vault
            .unlock(fixture.partner.id, fixture.project.id, MASTER_PASSWORD)
            .await?;

        assert!(matches!(wrong, Err(VaultServiceError::WrongMasterPassword)));
        assert_eq!(right.idle_timeout, SignedDuration::from_mins(5));

        Ok(())
    }

    #[tokio::test]
    async fn unlock_without_configured_master_password_fails() -> TestResult {
        let fixture = fixture().await?;
        let bare = fixture.ctx.create_project(fixture.company.id).await?;

        let result = fixture
            .ctx
            .vault
            .unlock(fixture.partner.id, bare.id, "anything at all")
            .await;

        assert!(matches!(result, Err(VaultServiceError::WrongMasterPassword)));

        Ok(())
    }

    #[tokio::test]
    async fn outsiders_are_forbidden_and_unknown_projects_not_found() -> TestResult {
        let fixture = fixture().await?;
        let outsider = fixture.ctx.register_verified_user("mallory").await?;

        let forbidden = fixture
            .ctx
            .vault
            .unlock(outsider.id, fixture.project.id, MASTER_PASSWORD)
            .await;

        let missing = fixture
            .ctx
            .vault
            .unlock(fixture.partner.id, ProjectId::from_i64(404), MASTER_PASSWORD)
            .await;

        assert!(matches!(forbidden, Err(VaultServiceError::Forbidden)));
        assert!(matches!(missing, Err(VaultServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn only_partners_set_the_master_password() -> TestResult {
        let fixture = fixture().await?;
        let employee = fixture
            .ctx
            .add_employee(fixture.company.id, "erin")
            .await?;

        let by_employee = fixture
            .ctx
            .vault
            .set_master_password(employee.id, fixture.project.id, "a brand new password")
            .await;

        let too_short = fixture
            .ctx
            .vault
            .set_master_password(fixture.partner.id, fixture.project.id, "short")
            .await;

        assert!(matches!(by_employee, Err(VaultServiceError::Forbidden)));
        assert!(matches!(too_short, Err(VaultServiceError::WeakPassword)));

        // Employees may still use the vault.
        let grant = unlock(&fixture, employee.id).await?;

        assert!(fixture.ctx.vault.list_secrets(&grant).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn changing_the_master_password_revokes_open_sessions() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        fixture
            .ctx
            .vault
            .set_master_password(fixture.partner.id, fixture.project.id, "rotated password")
            .await?;

        let result = fixture.ctx.vault.list_secrets(&grant).await;

        assert!(matches!(result, Err(VaultServiceError::VaultLocked)));

        Ok(())
    }

    #[tokio::test]
    async fn secrets_are_listed_by_key_with_creator_name() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("smtp", "mail-pass"))
            .await?;
        let added = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("aws", "aws-key"))
            .await?;

        let secrets = fixture.ctx.vault.list_secrets(&grant).await?;
        let keys: Vec<&str> = secrets.iter().map(|s| s.key.as_str()).collect();

        assert_eq!(keys, ["aws", "smtp"]);
        assert_eq!(added.created_by, fixture.partner.id);
        assert_eq!(added.created_by_name, fixture.partner.nickname);
        assert_eq!(added.description.as_deref(), Some("aws credentials"));

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_key_writes_nothing() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("db", "first"))
            .await?;

        let result = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("  db ", "second"))
            .await;

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM project_secrets")
            .fetch_one(fixture.ctx.db.pool())
            .await?;

        assert!(matches!(result, Err(VaultServiceError::DuplicateKey)));
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn blank_key_is_missing_fields() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        let result = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("   ", "value"))
            .await;

        assert!(matches!(result, Err(VaultServiceError::MissingFields)));

        Ok(())
    }

    #[tokio::test]
    async fn reveal_and_copy_are_logged() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;
        let secret = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("db", "s3cr3t"))
            .await?;

        let listed = fixture.ctx.vault.list_secrets(&grant).await?;
        let revealed = fixture.ctx.vault.reveal_secret(&grant, secret.id).await?;

        assert_eq!(listed.len(), 1);
        assert_eq!(revealed.expose(), "s3cr3t");

        wait_for_access_log(&fixture, &grant, secret.id, 1).await?;

        let copied = fixture.ctx.vault.copy_secret(&grant, secret.id).await?;

        assert_eq!(copied.expose(), "s3cr3t");

        let log = wait_for_access_log(&fixture, &grant, secret.id, 2).await?;
        let actions: Vec<SecretAccessAction> = log.iter().map(|entry| entry.action).collect();

        assert_eq!(actions, [SecretAccessAction::Copy, SecretAccessAction::View]);
        assert!(log.iter().all(|entry| entry.user_id == fixture.partner.id));
        assert!(log.iter().all(|entry| entry.user_name == fixture.partner.nickname));

        Ok(())
    }

    #[tokio::test]
    async fn idle_session_is_locked() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        sqlx::query(
            "UPDATE vault_sessions SET last_activity_at = now() - interval '5 minutes 1 second'",
        )
        .execute(fixture.ctx.db.pool())
        .await?;

        let result = fixture.ctx.vault.list_secrets(&grant).await;

        assert!(matches!(result, Err(VaultServiceError::VaultLocked)));

        Ok(())
    }

    #[tokio::test]
    async fn activity_keeps_the_session_alive() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        sqlx::query("UPDATE vault_sessions SET last_activity_at = now() - interval '4 minutes'")
            .execute(fixture.ctx.db.pool())
            .await?;

        fixture.ctx.vault.list_secrets(&grant).await?;

        let idle: bool = sqlx::query_scalar(
            "SELECT last_activity_at < now() - interval '1 minute' FROM vault_sessions",
        )
        .fetch_one(fixture.ctx.db.pool())
        .await?;

        assert!(!idle, "listing secrets should refresh last activity");

        Ok(())
    }

    #[tokio::test]
    async fn reported_activity_extends_the_idle_deadline() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;
        let pool = fixture.ctx.db.pool();

        // four minutes after unlocking
        sqlx::query("UPDATE vault_sessions SET last_activity_at = now() - interval '4 minutes'")
            .execute(pool)
            .await?;

        fixture.ctx.vault.touch(&grant).await?;

        // six minutes after unlocking
        sqlx::query(
            "UPDATE vault_sessions SET last_activity_at = last_activity_at - interval '2 minutes'",
        )
        .execute(pool)
        .await?;

        fixture.ctx.vault.list_secrets(&grant).await?;

        Ok(())
    }

    #[tokio::test]
    async fn touching_an_idle_vault_fails() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        sqlx::query("UPDATE vault_sessions SET last_activity_at = now() - interval '6 minutes'")
            .execute(fixture.ctx.db.pool())
            .await?;

        let result = fixture.ctx.vault.touch(&grant).await;

        assert!(matches!(result, Err(VaultServiceError::VaultLocked)));

        Ok(())
    }

    #[tokio::test]
    async fn locked_or_foreign_tokens_are_rejected() -> TestResult {
        let fixture = fixture().await?;
        let employee = fixture
            .ctx
            .add_employee(fixture.company.id, "erin")
            .await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        let borrowed = VaultGrant {
            actor: employee.id,
            ..grant.clone()
        };

        let borrowed_result = fixture.ctx.vault.list_secrets(&borrowed).await;

        fixture.ctx.vault.lock(&grant).await?;
        fixture.ctx.vault.lock(&grant).await?;

        let locked_result = fixture.ctx.vault.list_secrets(&grant).await;

        assert!(matches!(borrowed_result, Err(VaultServiceError::VaultLocked)));
        assert!(matches!(locked_result, Err(VaultServiceError::VaultLocked)));

        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_value_and_keeps_description() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;
        let secret = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("db", "old"))
            .await?;

        fixture
            .ctx
            .vault
            .update_secret(
                &grant,
                secret.id,
                SecretUpdate {
                    value: SecretValue::new("new"),
                    description: None,
                },
            )
            .await?;

        let listed = fixture.ctx.vault.list_secrets(&grant).await?;
        let revealed = fixture.ctx.vault.reveal_secret(&grant, secret.id).await?;

        assert_eq!(revealed.expose(), "new");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description.as_deref(), Some("db credentials"));
        assert!(listed[0].updated_at >= secret.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_or_foreign_secret_is_not_found() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;

        let other_project = fixture.ctx.create_project(fixture.company.id).await?;
        fixture
            .ctx
            .vault
            .set_master_password(fixture.partner.id, other_project.id, MASTER_PASSWORD)
            .await?;
        let other_unlock = fixture
            .ctx
            .vault
            .unlock(fixture.partner.id, other_project.id, MASTER_PASSWORD)
            .await?;
        let other_grant = VaultGrant {
            actor: fixture.partner.id,
            project: other_project.id,
            token: other_unlock.token,
        };
        let foreign = fixture
            .ctx
            .vault
            .add_secret(&other_grant, new_secret("db", "elsewhere"))
            .await?;

        let reveal = fixture.ctx.vault.reveal_secret(&grant, foreign.id).await;
        let update = fixture
            .ctx
            .vault
            .update_secret(
                &grant,
                SecretId::from_i64(404),
                SecretUpdate {
                    value: SecretValue::new("x"),
                    description: None,
                },
            )
            .await;
        let delete = fixture
            .ctx
            .vault
            .delete_secret(&grant, foreign.id)
            .await;
        let log = fixture.ctx.vault.list_access_log(&grant, foreign.id).await;

        assert!(matches!(reveal, Err(VaultServiceError::NotFound)));
        assert!(matches!(update, Err(VaultServiceError::NotFound)));
        assert!(matches!(delete, Err(VaultServiceError::NotFound)));
        assert!(matches!(log, Err(VaultServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn deleted_secret_is_gone() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;
        let secret = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("db", "value"))
            .await?;

        fixture.ctx.vault.delete_secret(&grant, secret.id).await?;

        let reveal = fixture.ctx.vault.reveal_secret(&grant, secret.id).await;

        assert!(matches!(reveal, Err(VaultServiceError::NotFound)));
        assert!(fixture.ctx.vault.list_secrets(&grant).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn access_log_outlives_the_secret() -> TestResult {
        let fixture = fixture().await?;
        let grant = unlock(&fixture, fixture.partner.id).await?;
        let secret = fixture
            .ctx
            .vault
            .add_secret(&grant, new_secret("smtp", "value"))
            .await?;

        fixture.ctx.vault.reveal_secret(&grant, secret.id).await?;
        wait_for_access_log(&fixture, &grant, secret.id, 1).await?;

        fixture.ctx.vault.delete_secret(&grant, secret.id).await?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT secret_key, action FROM secret_access_log WHERE secret_id = $1",
        )
        .bind(secret.id.into_i64())
        .fetch_all(fixture.ctx.db.pool())
        .await?;

        assert_eq!(rows, vec![("smtp".to_string(), "view".to_string())]);

        Ok(())
    }
}
