//! Project secret vault

pub(crate) mod errors;
mod grant;
mod handlers;
mod models;

pub(crate) use handlers::*;
