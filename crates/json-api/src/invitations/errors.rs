//! Invitation Errors

use salvo::http::StatusError;
use tracing::error;

use orbit_app::domain::invitations::InvitationsServiceError;

pub(crate) fn into_status_error(error: InvitationsServiceError) -> StatusError {
    match error {
        InvitationsServiceError::MissingFields => {
            StatusError::bad_request().brief("A valid email address is required")
        }
        InvitationsServiceError::InvalidRole => {
            StatusError::bad_request().brief("Role must be Employee or Partner")
        }
        InvitationsServiceError::Forbidden => {
            StatusError::forbidden().brief("Only company partners may invite")
        }
        InvitationsServiceError::NotFound => StatusError::not_found().brief("Company not found"),
        InvitationsServiceError::DuplicateInvitation => StatusError::conflict()
            .brief("A pending invitation already exists for this email"),
        InvitationsServiceError::AlreadyMember => {
            StatusError::conflict().brief("This person already works for the company")
        }
        InvitationsServiceError::TokenNotFound => {
            StatusError::not_found().brief("Invitation not found")
        }
        InvitationsServiceError::TokenExpired => {
            StatusError::gone().brief("Invitation expired")
        }
        InvitationsServiceError::AlreadyResolved => {
            StatusError::conflict().brief("Invitation already used")
        }
        InvitationsServiceError::EmailMismatch => StatusError::forbidden()
            .brief("This invitation was sent to a different email address"),
        InvitationsServiceError::Sql(source) => {
            error!("invitation storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
