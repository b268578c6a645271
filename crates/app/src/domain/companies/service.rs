//! Companies service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    auth::UserId,
    database::Db,
    domain::companies::{
        data::{NewCompany, NewProject},
        errors::CompaniesServiceError,
        records::{CompanyAccess, CompanyId, CompanyRecord, ProjectId, ProjectRecord},
        repository::PgCompaniesRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCompaniesService {
    db: Db,
    repository: PgCompaniesRepository,
}

impl PgCompaniesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCompaniesRepository::new(),
        }
    }
}

#[async_trait]
impl CompaniesService for PgCompaniesService {
    async fn access(
        &self,
        user: UserId,
        company: CompanyId,
    ) -> Result<CompanyAccess, CompaniesServiceError> {
        let mut tx = self.db.begin().await?;

        let access = self.repository.access(&mut tx, user, company).await?;

        tx.commit().await?;

        Ok(access)
    }

    async fn create_company(
        &self,
        company: NewCompany,
    ) -> Result<CompanyRecord, CompaniesServiceError> {
        let name = company.name.trim();

        if name.is_empty() {
            return Err(CompaniesServiceError::MissingFields);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_company(&mut tx, name).await?;

        self.repository
            .add_worker(&mut tx, company.founder, created.id)
            .await?;

        self.repository
            .add_member(&mut tx, company.founder, created.id)
            .await?;

        tx.commit().await?;

        info!(company_id = %created.id, founder = %company.founder, "created company");

        Ok(created)
    }

    async fn create_project(
        &self,
        project: NewProject,
    ) -> Result<ProjectRecord, CompaniesServiceError> {
        let name = project.name.trim();

        if name.is_empty() {
            return Err(CompaniesServiceError::MissingFields);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_project(&mut tx, project.company, name)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_project(&self, project: ProjectId) -> Result<ProjectRecord, CompaniesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.find_project(&mut tx, project).await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
/// Company membership lookups and bootstrap.
pub trait CompaniesService: Send + Sync {
    /// Whether `user` is a worker and/or Partner of `company`.
    async fn access(
        &self,
        user: UserId,
        company: CompanyId,
    ) -> Result<CompanyAccess, CompaniesServiceError>;

    /// Creates a company with its founding Partner.
    async fn create_company(
        &self,
        company: NewCompany,
    ) -> Result<CompanyRecord, CompaniesServiceError>;

    async fn create_project(
        &self,
        project: NewProject,
    ) -> Result<ProjectRecord, CompaniesServiceError>;

    async fn find_project(&self, project: ProjectId) -> Result<ProjectRecord, CompaniesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn founder_is_worker_and_partner() -> TestResult {
        let ctx = TestContext::new().await;
        let founder = ctx.register_verified_user("alice").await?;

        let company = ctx
            .companies
            .create_company(NewCompany {
                name: "  Acme  ".to_string(),
                founder: founder.id,
            })
            .await?;

        let access = ctx.companies.access(founder.id, company.id).await?;

        assert_eq!(company.name, "Acme");
        assert_eq!(
            access,
            CompanyAccess {
                worker: true,
                partner: true
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn outsider_has_no_access() -> TestResult {
        let ctx = TestContext::new().await;
        let founder = ctx.register_verified_user("alice").await?;
        let outsider = ctx.register_verified_user("mallory").await?;
        let company = ctx.create_company(founder.id).await?;

        let access = ctx.companies.access(outsider.id, company.id).await?;

        assert!(!access.has_access());

        Ok(())
    }

    #[tokio::test]
    async fn create_company_requires_a_name() -> TestResult {
        let ctx = TestContext::new().await;
        let founder = ctx.register_verified_user("alice").await?;

        let result = ctx
            .companies
            .create_company(NewCompany {
                name: "   ".to_string(),
                founder: founder.id,
            })
            .await;

        assert!(matches!(result, Err(CompaniesServiceError::MissingFields)));

        Ok(())
    }

    #[tokio::test]
    async fn create_company_with_unknown_founder_is_invalid_reference() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .companies
            .create_company(NewCompany {
                name: "Ghost Co".to_string(),
                founder: UserId::from_i64(404),
            })
            .await;

        assert!(matches!(
            result,
            Err(CompaniesServiceError::InvalidReference)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn projects_belong_to_their_company() -> TestResult {
        let ctx = TestContext::new().await;
        let founder = ctx.register_verified_user("alice").await?;
        let company = ctx.create_company(founder.id).await?;

        let project = ctx
            .companies
            .create_project(NewProject {
                company: company.id,
                name: "Website".to_string(),
            })
            .await?;

        let found = ctx.companies.find_project(project.id).await?;

        assert_eq!(found, project);
        assert_eq!(found.company_id, company.id);

        Ok(())
    }

    #[tokio::test]
    async fn project_for_unknown_company_is_invalid_reference() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .companies
            .create_project(NewProject {
                company: CompanyId::from_i64(404),
                name: "Orphan".to_string(),
            })
            .await;

        let missing = ctx.companies.find_project(ProjectId::from_i64(404)).await;

        assert!(matches!(
            result,
            Err(CompaniesServiceError::InvalidReference)
        ));
        assert!(matches!(missing, Err(CompaniesServiceError::NotFound)));

        Ok(())
    }
}
