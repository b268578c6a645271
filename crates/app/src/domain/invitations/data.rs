//! Invitation Data

use crate::domain::companies::records::CompanyId;

/// New Invitation Data, as submitted by the inviting Partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvitation {
    pub email: String,
    pub company: CompanyId,

    /// `Employee` or `Partner`; parsed by the service.
    pub role: String,
}
