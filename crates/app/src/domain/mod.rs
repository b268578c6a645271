//! Orbit Domain Concerns

pub mod companies;
pub mod invitations;
pub mod vault;
