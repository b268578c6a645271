//! Company Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;

use crate::ids::TypedId;

/// Company Id
pub type CompanyId = TypedId<CompanyRecord>;

/// Project Id
pub type ProjectId = TypedId<ProjectRecord>;

/// Company Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    pub created_at: Timestamp,
}

/// Project Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub company_id: CompanyId,
    pub name: String,
    pub created_at: Timestamp,
}

/// What a user is to a company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyAccess {
    /// Has a worker association (employees and partners alike).
    pub worker: bool,

    /// Holds a Partner membership.
    pub partner: bool,
}

impl CompanyAccess {
    #[must_use]
    pub const fn has_access(self) -> bool {
        self.worker || self.partner
    }

    #[must_use]
    pub const fn is_partner(self) -> bool {
        self.partner
    }
}

/// Role granted by an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyRole {
    Employee,
    Partner,
}

impl CompanyRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Partner => "Partner",
        }
    }
}

impl fmt::Display for CompanyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for CompanyRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.eq_ignore_ascii_case("employee") {
            Ok(Self::Employee)
        } else if value.eq_ignore_ascii_case("partner") {
            Ok(Self::Partner)
        } else {
            Err(UnknownRole(value.to_string()))
        }
    }
}
