//! Invitations service.

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    auth::{
        UserId, looks_like_email, normalize_email,
        token::{generate_token, hash_token},
    },
    database::Db,
    domain::{
        companies::{records::CompanyRole, repository::PgCompaniesRepository},
        invitations::{
            data::NewInvitation,
            errors::InvitationsServiceError,
            records::{
                AcceptOutcome, AcceptedInvitation, InvitationRecord, InvitationStatus,
                IssuedInvitation,
            },
            repository::{NewInvitationRow, PgInvitationsRepository},
        },
    },
};

/// Lifetime of an invitation link.
pub const DEFAULT_INVITATION_TTL: SignedDuration = SignedDuration::from_hours(7 * 24);

#[derive(Debug, Clone)]
pub struct PgInvitationsService {
    db: Db,
    repository: PgInvitationsRepository,
    companies: PgCompaniesRepository,
    ttl: SignedDuration,
}

impl PgInvitationsService {
    #[must_use]
    pub fn new(db: Db, ttl: SignedDuration) -> Self {
        Self {
            db,
            repository: PgInvitationsRepository::new(),
            companies: PgCompaniesRepository::new(),
            ttl,
        }
    }

    /// Look up an invitation that can still be acted on.
    ///
    /// A pending invitation past its deadline is flipped to `expired` and the
    /// transaction committed before reporting [`InvitationsServiceError::TokenExpired`].
    async fn find_open(
        &self,
        mut tx: Transaction<'static, Postgres>,
        token: &str,
    ) -> Result<(Transaction<'static, Postgres>, InvitationRecord), InvitationsServiceError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(InvitationsServiceError::TokenNotFound);
        }

        let invitation = self
            .repository
            .find_by_token_hash(&mut tx, &hash_token(token))
            .await?
            .ok_or(InvitationsServiceError::TokenNotFound)?;

        match invitation.status {
            InvitationStatus::Accepted => Err(InvitationsServiceError::AlreadyResolved),
            InvitationStatus::Expired => Err(InvitationsServiceError::TokenExpired),
            InvitationStatus::Pending if invitation.is_past_deadline(Timestamp::now()) => {
                self.repository.expire(&mut tx, invitation.id).await?;

                tx.commit().await?;

                debug!(invitation_id = %invitation.id, "expired stale invitation");

                Err(InvitationsServiceError::TokenExpired)
            }
            InvitationStatus::Pending => Ok((tx, invitation)),
        }
    }
}

#[async_trait]
impl InvitationsService for PgInvitationsService {
    async fn create_invitation(
        &self,
        inviter: UserId,
        invitation: NewInvitation,
    ) -> Result<IssuedInvitation, InvitationsServiceError> {
        let email = normalize_email(&invitation.email);

        if !looks_like_email(&email) {
            return Err(InvitationsServiceError::MissingFields);
        }

        let role = invitation
            .role
            .parse::<CompanyRole>()
            .map_err(|_unknown| InvitationsServiceError::InvalidRole)?;

        let mut tx = self.db.begin().await?;

        let company = self
            .companies
            .find_company(&mut tx, invitation.company)
            .await?;

        let access = self.companies.access(&mut tx, inviter, company.id).await?;

        if !access.is_partner() {
            return Err(InvitationsServiceError::Forbidden);
        }

        self.repository
            .expire_stale(&mut tx, &email, company.id)
            .await?;

        if self.repository.has_pending(&mut tx, &email, company.id).await? {
            return Err(InvitationsServiceError::DuplicateInvitation);
        }

        if self
            .repository
            .email_is_worker(&mut tx, &email, company.id)
            .await?
        {
            return Err(InvitationsServiceError::AlreadyMember);
        }

        let token = generate_token();

        let created = self
            .repository
            .create_invitation(
                &mut tx,
                NewInvitationRow {
                    email: &email,
                    company: company.id,
                    invited_by: inviter,
                    role,
                    token_hash: &token.hash(),
                    expires_at: Timestamp::now() + self.ttl,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            invitation_id = %created.id,
            company_id = %company.id,
            role = %role,
            "created invitation"
        );

        Ok(IssuedInvitation {
            token,
            invitation: created,
            company_name: company.name,
        })
    }

    async fn find_invitation(
        &self,
        token: &str,
    ) -> Result<InvitationRecord, InvitationsServiceError> {
        let tx = self.db.begin().await?;

        let (tx, invitation) = self.find_open(tx, token).await?;

        tx.commit().await?;

        Ok(invitation)
    }

    async fn accept_invitation(
        &self,
        user: UserId,
        token: &str,
    ) -> Result<AcceptedInvitation, InvitationsServiceError> {
        let tx = self.db.begin().await?;

        let (mut tx, invitation) = self.find_open(tx, token).await?;

        let user_email = self.repository.find_user_email(&mut tx, user).await?;

        if normalize_email(&user_email) != invitation.email {
            return Err(InvitationsServiceError::EmailMismatch);
        }

        let claimed = self
            .repository
            .claim(&mut tx, invitation.id, user)
            .await?
            .ok_or(InvitationsServiceError::AlreadyResolved)?;

        let mut joined = self
            .companies
            .add_worker(&mut tx, user, claimed.company_id)
            .await?;

        if claimed.role == CompanyRole::Partner {
            joined |= self
                .companies
                .add_member(&mut tx, user, claimed.company_id)
                .await?;
        }

        tx.commit().await?;

        let outcome = if joined {
            AcceptOutcome::Joined
        } else {
            AcceptOutcome::AlreadyMember
        };

        info!(
            invitation_id = %claimed.id,
            user_id = %user,
            company_id = %claimed.company_id,
            ?outcome,
            "accepted invitation"
        );

        Ok(AcceptedInvitation {
            invitation: claimed,
            outcome,
        })
    }
}

#[automock]
#[async_trait]
/// Role-scoped company invitations.
pub trait InvitationsService: Send + Sync {
    /// Invites an email address into a company. Only Partners may invite.
    async fn create_invitation(
        &self,
        inviter: UserId,
        invitation: NewInvitation,
    ) -> Result<IssuedInvitation, InvitationsServiceError>;

    /// Resolves an invitation link to a pending invitation.
    async fn find_invitation(
        &self,
        token: &str,
    ) -> Result<InvitationRecord, InvitationsServiceError>;

    /// Consumes an invitation on behalf of the signed-in user and grants its role.
    async fn accept_invitation(
        &self,
        user: UserId,
        token: &str,
    ) -> Result<AcceptedInvitation, InvitationsServiceError>;
}
