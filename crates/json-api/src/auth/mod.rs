//! Authentication: login, registration, email verification and session cookies

mod errors;
mod handlers;
pub(crate) mod middleware;
pub(crate) mod session;

pub(crate) use handlers::*;
