//! Invitations Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};

use crate::{
    auth::UserId,
    domain::{
        companies::records::{CompanyId, CompanyRole},
        invitations::records::{InvitationId, InvitationRecord, InvitationStatus},
    },
};

const CREATE_INVITATION_SQL: &str = include_str!("sql/create_invitation.sql");
const FIND_INVITATION_BY_TOKEN_HASH_SQL: &str =
    include_str!("sql/find_invitation_by_token_hash.sql");
const CLAIM_INVITATION_SQL: &str = include_str!("sql/claim_invitation.sql");
const EXPIRE_INVITATION_SQL: &str = include_str!("sql/expire_invitation.sql");
const EXPIRE_STALE_INVITATIONS_SQL: &str = include_str!("sql/expire_stale_invitations.sql");
const HAS_PENDING_INVITATION_SQL: &str = include_str!("sql/has_pending_invitation.sql");
const EMAIL_IS_WORKER_SQL: &str = include_str!("sql/email_is_worker.sql");
const FIND_USER_EMAIL_SQL: &str = include_str!("sql/find_user_email.sql");

#[derive(Debug, Clone)]
pub(crate) struct NewInvitationRow<'a> {
    pub email: &'a str,
    pub company: CompanyId,
    pub invited_by: UserId,
    pub role: CompanyRole,
    pub token_hash: &'a str,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInvitationsRepository;

impl PgInvitationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_invitation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        invitation: NewInvitationRow<'_>,
    ) -> Result<InvitationRecord, sqlx::Error> {
        query_as::<Postgres, InvitationRecord>(CREATE_INVITATION_SQL)
            .bind(invitation.email)
            .bind(invitation.company.into_i64())
            .bind(invitation.invited_by.into_i64())
            .bind(invitation.role.as_str())
            .bind(invitation.token_hash)
            .bind(SqlxTimestamp::from(invitation.expires_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_token_hash(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<InvitationRecord>, sqlx::Error> {
        query_as::<Postgres, InvitationRecord>(FIND_INVITATION_BY_TOKEN_HASH_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a pending, unexpired invitation to `accepted`. `None` when another
    /// request got there first or the deadline passed in the meantime.
    pub(crate) async fn claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        invitation: InvitationId,
        user: UserId,
    ) -> Result<Option<InvitationRecord>, sqlx::Error> {
        query_as::<Postgres, InvitationRecord>(CLAIM_INVITATION_SQL)
            .bind(invitation.into_i64())
            .bind(user.into_i64())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn expire(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        invitation: InvitationId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(EXPIRE_INVITATION_SQL)
            .bind(invitation.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn expire_stale(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        company: CompanyId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(EXPIRE_STALE_INVITATIONS_SQL)
            .bind(email)
            .bind(company.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn has_pending(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        company: CompanyId,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(HAS_PENDING_INVITATION_SQL)
            .bind(email)
            .bind(company.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn email_is_worker(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        company: CompanyId,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(EMAIL_IS_WORKER_SQL)
            .bind(email)
            .bind(company.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<String, sqlx::Error> {
        query_scalar::<Postgres, String>(FIND_USER_EMAIL_SQL)
            .bind(user.into_i64())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for InvitationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            id: InvitationId::from_i64(row.try_get("id")?),
            email: row.try_get("email")?,
            company_id: CompanyId::from_i64(row.try_get("company_id")?),
            invited_by: UserId::from_i64(row.try_get("invited_by_user_id")?),
            role: role.parse::<CompanyRole>().map_err(|unknown| sqlx::Error::ColumnDecode {
                index: "role".to_string(),
                source: format!("unknown company role {:?}", unknown.0).into(),
            })?,
            status: InvitationStatus::from_db(&status).ok_or_else(|| {
                sqlx::Error::ColumnDecode {
                    index: "status".to_string(),
                    source: format!("unknown invitation status {status:?}").into(),
                }
            })?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            accepted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("accepted_at")?
                .map(SqlxTimestamp::to_jiff),
            accepted_by: row
                .try_get::<Option<i64>, _>("accepted_by_user_id")?
                .map(UserId::from_i64),
        })
    }
}
