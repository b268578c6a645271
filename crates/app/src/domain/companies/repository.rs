//! Companies Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::UserId,
    domain::companies::records::{
        CompanyAccess, CompanyId, CompanyRecord, ProjectId, ProjectRecord,
    },
};

const COMPANY_ACCESS_SQL: &str = include_str!("sql/company_access.sql");
const CREATE_COMPANY_SQL: &str = include_str!("sql/create_company.sql");
const FIND_COMPANY_SQL: &str = include_str!("sql/find_company.sql");
const ADD_WORKER_SQL: &str = include_str!("sql/add_worker.sql");
const ADD_MEMBER_SQL: &str = include_str!("sql/add_member.sql");
const CREATE_PROJECT_SQL: &str = include_str!("sql/create_project.sql");
const FIND_PROJECT_SQL: &str = include_str!("sql/find_project.sql");

/// Shared by every service that needs to ask who belongs to a company.
#[derive(Debug, Clone, Default)]
pub(crate) struct PgCompaniesRepository;

impl PgCompaniesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn access(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        company: CompanyId,
    ) -> Result<CompanyAccess, sqlx::Error> {
        query_as::<Postgres, CompanyAccess>(COMPANY_ACCESS_SQL)
            .bind(user.into_i64())
            .bind(company.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<CompanyRecord, sqlx::Error> {
        query_as::<Postgres, CompanyRecord>(CREATE_COMPANY_SQL)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_company(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyId,
    ) -> Result<CompanyRecord, sqlx::Error> {
        query_as::<Postgres, CompanyRecord>(FIND_COMPANY_SQL)
            .bind(company.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    /// Returns `true` when a new worker row was written.
    pub(crate) async fn add_worker(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        company: CompanyId,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(ADD_WORKER_SQL)
            .bind(user.into_i64())
            .bind(company.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Returns `true` when a new membership row was written.
    pub(crate) async fn add_member(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        company: CompanyId,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(ADD_MEMBER_SQL)
            .bind(user.into_i64())
            .bind(company.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn create_project(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyId,
        name: &str,
    ) -> Result<ProjectRecord, sqlx::Error> {
        query_as::<Postgres, ProjectRecord>(CREATE_PROJECT_SQL)
            .bind(company.into_i64())
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_project(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectId,
    ) -> Result<ProjectRecord, sqlx::Error> {
        query_as::<Postgres, ProjectRecord>(FIND_PROJECT_SQL)
            .bind(project.into_i64())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CompanyAccess {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            worker: row.try_get("worker")?,
            partner: row.try_get("partner")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CompanyRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: CompanyId::from_i64(row.try_get("id")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProjectRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: ProjectId::from_i64(row.try_get("id")?),
            company_id: CompanyId::from_i64(row.try_get("company_id")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
