//! Vault Handlers

pub(crate) mod access_log;
pub(crate) mod activity;
pub(crate) mod copy;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod index;
pub(crate) mod lock;
pub(crate) mod master_password;
pub(crate) mod reveal;
pub(crate) mod unlock;
pub(crate) mod update;
