//! Per-project secret vault

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;
pub mod session;

pub use errors::VaultServiceError;
pub use service::*;
pub use session::VaultSession;
