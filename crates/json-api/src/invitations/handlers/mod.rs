//! Invitation Handlers

pub(crate) mod accept;
pub(crate) mod create;
pub(crate) mod landing;
