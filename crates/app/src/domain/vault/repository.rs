//! Vault Repository

use jiff::SignedDuration;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, PgPool, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};

use crate::{
    auth::UserId,
    domain::{
        companies::records::ProjectId,
        vault::records::{
            ProjectSecretRecord, SecretAccessAction, SecretAccessRecord, SecretId, SecretValue,
        },
    },
};

const FIND_MASTER_PASSWORD_HASH_SQL: &str = include_str!("sql/find_master_password_hash.sql");
const SET_MASTER_PASSWORD_SQL: &str = include_str!("sql/set_master_password.sql");
const DELETE_PROJECT_VAULT_SESSIONS_SQL: &str =
    include_str!("sql/delete_project_vault_sessions.sql");
const CREATE_VAULT_SESSION_SQL: &str = include_str!("sql/create_vault_session.sql");
const PURGE_IDLE_VAULT_SESSIONS_SQL: &str = include_str!("sql/purge_idle_vault_sessions.sql");
const TOUCH_VAULT_SESSION_SQL: &str = include_str!("sql/touch_vault_session.sql");
const DELETE_VAULT_SESSION_SQL: &str = include_str!("sql/delete_vault_session.sql");
const LIST_SECRETS_SQL: &str = include_str!("sql/list_secrets.sql");
const FIND_SECRET_VALUE_SQL: &str = include_str!("sql/find_secret_value.sql");
const SECRET_EXISTS_SQL: &str = include_str!("sql/secret_exists.sql");
const SECRET_KEY_EXISTS_SQL: &str = include_str!("sql/secret_key_exists.sql");
const CREATE_SECRET_SQL: &str = include_str!("sql/create_secret.sql");
const UPDATE_SECRET_SQL: &str = include_str!("sql/update_secret.sql");
const DELETE_SECRET_SQL: &str = include_str!("sql/delete_secret.sql");
const RECORD_SECRET_ACCESS_SQL: &str = include_str!("sql/record_secret_access.sql");
const LIST_SECRET_ACCESS_SQL: &str = include_str!("sql/list_secret_access.sql");

#[derive(Debug, Clone)]
pub(crate) struct NewSecretRow<'a> {
    pub project: ProjectId,
    pub key: &'a str,
    pub value: &'a str,
    pub description: Option<&'a str>,
    pub created_by: UserId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVaultRepository;

impl PgVaultRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_master_password_hash(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
    ) -> Result<Option<String>, sqlx::Error> {
        query_scalar::<Postgres, Option<String>>(FIND_MASTER_PASSWORD_HASH_SQL)
            .bind(project.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    /// Store a new master password hash and revoke every open vault session of the project.
    pub(crate) async fn set_master_password(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
        hash: &str,
    ) -> Result<u64, sqlx::Error> {
        query(SET_MASTER_PASSWORD_SQL)
            .bind(project.into_i64())
            .bind(hash)
            .execute(&mut **tx)
            .await?;

        let revoked = query(DELETE_PROJECT_VAULT_SESSIONS_SQL)
            .bind(project.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(revoked)
    }

    pub(crate) async fn create_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
        project: ProjectId,
        user: UserId,
        idle_timeout: SignedDuration,
    ) -> Result<(), sqlx::Error> {
        query(PURGE_IDLE_VAULT_SESSIONS_SQL)
            .bind(project.into_i64())
            .bind(user.into_i64())
            .bind(idle_timeout.as_secs_f64())
            .execute(&mut **tx)
            .await?;

        query(CREATE_VAULT_SESSION_SQL)
            .bind(token_hash)
            .bind(project.into_i64())
            .bind(user.into_i64())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Refresh a session still inside its idle window. `false` when the
    /// session is unknown or has gone idle.
    pub(crate) async fn touch_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
        project: ProjectId,
        user: UserId,
        idle_timeout: SignedDuration,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(TOUCH_VAULT_SESSION_SQL)
            .bind(token_hash)
            .bind(project.into_i64())
            .bind(user.into_i64())
            .bind(idle_timeout.as_secs_f64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn delete_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
        project: ProjectId,
        user: UserId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_VAULT_SESSION_SQL)
            .bind(token_hash)
            .bind(project.into_i64())
            .bind(user.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_secrets(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
    ) -> Result<Vec<ProjectSecretRecord>, sqlx::Error> {
        query_as::<Postgres, ProjectSecretRecord>(LIST_SECRETS_SQL)
            .bind(project.into_i64())
            .fetch_all(&mut **tx)
            .await
    }

    /// Key and value of a secret, for reveal and copy.
    pub(crate) async fn find_secret_value(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
        secret: SecretId,
    ) -> Result<(String, SecretValue), sqlx::Error> {
        let (key, value) = query_as::<Postgres, (String, String)>(FIND_SECRET_VALUE_SQL)
            .bind(secret.into_i64())
            .bind(project.into_i64())
            .fetch_one(&mut **tx)
            .await?;

        Ok((key, SecretValue::new(value)))
    }

    pub(crate) async fn secret_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
        secret: SecretId,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(SECRET_EXISTS_SQL)
            .bind(secret.into_i64())
            .bind(project.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn secret_key_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
        key: &str,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(SECRET_KEY_EXISTS_SQL)
            .bind(project.into_i64())
            .bind(key)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_secret(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        secret: NewSecretRow<'_>,
    ) -> Result<ProjectSecretRecord, sqlx::Error> {
        query_as::<Postgres, ProjectSecretRecord>(CREATE_SECRET_SQL)
            .bind(secret.project.into_i64())
            .bind(secret.key)
            .bind(secret.value)
            .bind(secret.description)
            .bind(secret.created_by.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_secret(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
        secret: SecretId,
        value: &str,
        description: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_SECRET_SQL)
            .bind(secret.into_i64())
            .bind(project.into_i64())
            .bind(value)
            .bind(description)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_secret(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
        secret: SecretId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_SECRET_SQL)
            .bind(secret.into_i64())
            .bind(project.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Runs outside any request transaction.
    pub(crate) async fn record_access(
        &self,
        pool: &PgPool,
        project: ProjectId,
        secret: SecretId,
        key: &str,
        user: UserId,
        action: SecretAccessAction,
    ) -> Result<(), sqlx::Error> {
        query(RECORD_SECRET_ACCESS_SQL)
            .bind(project.into_i64())
            .bind(secret.into_i64())
            .bind(key)
            .bind(user.into_i64())
            .bind(action.as_str())
            .execute(pool)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_access(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        secret: SecretId,
    ) -> Result<Vec<SecretAccessRecord>, sqlx::Error> {
        query_as::<Postgres, SecretAccessRecord>(LIST_SECRET_ACCESS_SQL)
            .bind(secret.into_i64())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProjectSecretRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: SecretId::from_i64(row.try_get("id")?),
            project_id: ProjectId::from_i64(row.try_get("project_id")?),
            key: row.try_get("key")?,
            description: row.try_get("description")?,
            created_by: UserId::from_i64(row.try_get("created_by")?),
            created_by_name: row.try_get("created_by_name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SecretAccessRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let action: String = row.try_get("action")?;

        Ok(Self {
            secret_id: SecretId::from_i64(row.try_get("secret_id")?),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            user_name: row.try_get("user_name")?,
            action: SecretAccessAction::from_db(&action).ok_or_else(|| {
                sqlx::Error::ColumnDecode {
                    index: "action".to_string(),
                    source: format!("unknown secret access action {action:?}").into(),
                }
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
