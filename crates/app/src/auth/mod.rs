//! Credential and identity resolution

mod errors;
mod models;
pub mod password;
mod repository;
mod service;
pub mod token;

pub use errors::*;
pub use models::*;
pub use service::*;
pub use token::{IssuedToken, OpaqueToken};
