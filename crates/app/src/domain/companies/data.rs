//! Company Data

use crate::{auth::UserId, domain::companies::records::CompanyId};

/// New Company Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,

    /// Becomes both a worker and a Partner of the new company.
    pub founder: UserId,
}

/// New Project Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub company: CompanyId,
    pub name: String,
}
