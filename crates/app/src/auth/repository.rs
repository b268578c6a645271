//! Identity repository.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, PgPool, Postgres, Row, Transaction, postgres::PgRow, query, query_as,
    query_scalar,
};
use zeroize::Zeroizing;

use crate::auth::models::{
    AuthenticatedUser, CredentialRecord, NewUser, UserId, UserRecord, VerificationTokenState,
};

const FIND_CREDENTIAL_BY_LOGIN_SQL: &str = include_str!("sql/find_credential_by_login.sql");
const REPLACE_LEGACY_PASSWORD_SQL: &str = include_str!("sql/replace_legacy_password.sql");
const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const DELETE_VERIFICATION_TOKENS_SQL: &str = include_str!("sql/delete_verification_tokens.sql");
const CREATE_VERIFICATION_TOKEN_SQL: &str = include_str!("sql/create_verification_token.sql");
const CONSUME_VERIFICATION_TOKEN_SQL: &str = include_str!("sql/consume_verification_token.sql");
const FIND_VERIFICATION_TOKEN_STATE_SQL: &str =
    include_str!("sql/find_verification_token_state.sql");
const MARK_USER_VERIFIED_SQL: &str = include_str!("sql/mark_user_verified.sql");
const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const FIND_SESSION_USER_SQL: &str = include_str!("sql/find_session_user.sql");
const DELETE_SESSION_SQL: &str = include_str!("sql/delete_session.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgIdentityRepository;

impl PgIdentityRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_credential_by_login(
        &self,
        pool: &PgPool,
        login: &str,
    ) -> Result<Option<CredentialRecord>, sqlx::Error> {
        query_as::<Postgres, CredentialRecord>(FIND_CREDENTIAL_BY_LOGIN_SQL)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    /// Swap a plaintext credential for its hash, only if it is still the
    /// plaintext we verified against. Returns the number of rows updated.
    pub(crate) async fn replace_legacy_password(
        &self,
        pool: &PgPool,
        user: UserId,
        legacy: &str,
        hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REPLACE_LEGACY_PASSWORD_SQL)
            .bind(user.into_i64())
            .bind(legacy)
            .bind(hash)
            .execute(pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn find_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_SQL)
            .bind(user.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(&user.login)
            .bind(&user.email)
            .bind(&user.nickname)
            .bind(&user.password_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn replace_verification_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(DELETE_VERIFICATION_TOKENS_SQL)
            .bind(user.into_i64())
            .execute(&mut **tx)
            .await?;

        query(CREATE_VERIFICATION_TOKEN_SQL)
            .bind(user.into_i64())
            .bind(token_hash)
            .bind(SqlxTimestamp::from(expires_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Claim an unconsumed, unexpired token. `None` when nothing was claimed.
    pub(crate) async fn consume_verification_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<UserId>, sqlx::Error> {
        let user_id = query_scalar::<Postgres, i64>(CONSUME_VERIFICATION_TOKEN_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(user_id.map(UserId::from_i64))
    }

    pub(crate) async fn find_verification_token_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<VerificationTokenState>, sqlx::Error> {
        query_as::<Postgres, VerificationTokenState>(FIND_VERIFICATION_TOKEN_STATE_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn mark_user_verified(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<(), sqlx::Error> {
        query(MARK_USER_VERIFIED_SQL)
            .bind(user.into_i64())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn create_session(
        &self,
        pool: &PgPool,
        user: UserId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_SESSION_SQL)
            .bind(user.into_i64())
            .bind(token_hash)
            .bind(SqlxTimestamp::from(expires_at))
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Owner of an unexpired session.
    pub(crate) async fn find_session_user(
        &self,
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<AuthenticatedUser>, sqlx::Error> {
        query_as::<Postgres, AuthenticatedUser>(FIND_SESSION_USER_SQL)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    pub(crate) async fn delete_session(
        &self,
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<(), sqlx::Error> {
        query(DELETE_SESSION_SQL)
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: UserId::from_i64(row.try_get("id")?),
            login: row.try_get("login")?,
            email: row.try_get("email")?,
            nickname: row.try_get("nickname")?,
            is_verified: row.try_get("is_verified")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AuthenticatedUser {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: UserId::from_i64(row.try_get("id")?),
            login: row.try_get("login")?,
            nickname: row.try_get("nickname")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CredentialRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: UserId::from_i64(row.try_get("id")?),
            login: row.try_get("login")?,
            nickname: row.try_get("nickname")?,
            password: Zeroizing::new(row.try_get("password")?),
            is_verified: row.try_get("is_verified")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VerificationTokenState {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_id: UserId::from_i64(row.try_get("user_id")?),
            consumed: row.try_get("consumed")?,
            expired: row.try_get("expired")?,
        })
    }
}
