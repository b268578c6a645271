//! Auth Handlers

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod register;
pub(crate) mod resend;
pub(crate) mod verify;
