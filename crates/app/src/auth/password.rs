//! Stored credential classification, bcrypt hashing and legacy comparison.

use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use tracing::debug;
use zeroize::Zeroizing;

/// Minimum accepted length for new passwords, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// How a stored password value is encoded, detected from its shape alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredCredential<'a> {
    Hashed(&'a str),
    Legacy(&'a str),
}

impl<'a> StoredCredential<'a> {
    #[must_use]
    pub fn classify(stored: &'a str) -> Self {
        if BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix)) {
            Self::Hashed(stored)
        } else {
            Self::Legacy(stored)
        }
    }
}

/// Compare a legacy plaintext credential without short-circuiting.
///
/// Both operands are zero-padded to the longer length before the byte
/// comparison, and the original lengths are compared as well, so a prefix
/// never matches.
#[must_use]
pub fn legacy_matches(stored: &str, candidate: &str) -> bool {
    let width = stored.len().max(candidate.len());

    let padded_stored = pad(stored, width);
    let padded_candidate = pad(candidate, width);

    let bytes_equal = padded_stored.as_slice().ct_eq(padded_candidate.as_slice());
    let lengths_equal = stored.len().ct_eq(&candidate.len());

    (bytes_equal & lengths_equal).into()
}

fn pad(value: &str, width: usize) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(
        value
            .bytes()
            .chain(std::iter::repeat(0))
            .take(width)
            .collect(),
    )
}

#[must_use]
pub fn is_strong_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed")]
    Task(#[from] JoinError),
}

/// bcrypt on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns an error if bcrypt rejects the input or the blocking task fails.
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;

        let hash = spawn_blocking(move || bcrypt::hash(password.as_bytes(), cost)).await??;

        Ok(hash)
    }

    /// Check a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed or the blocking task fails.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();

        let matches = spawn_blocking(move || bcrypt::verify(password.as_bytes(), &hash)).await??;

        Ok(matches)
    }

    /// Spend the work of one bcrypt round on a throwaway hash, so an unknown login
    /// costs as much as a wrong password.
    pub async fn burn(&self, password: &str) {
        if let Err(error) = self.hash(password).await {
            debug!("throwaway hash failed: {error}");
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
