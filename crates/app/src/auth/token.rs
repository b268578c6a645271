//! Opaque single-use tokens for email verification and invitations.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jiff::Timestamp;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Number of random bytes behind every token.
pub const TOKEN_BYTES: usize = 32;

/// Raw token handed to the user exactly once. Only its hash is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct OpaqueToken(String);

impl OpaqueToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 hex digest stored in place of the token.
    #[must_use]
    pub fn hash(&self) -> String {
        hash_token(&self.0)
    }
}

impl From<String> for OpaqueToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for OpaqueToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A freshly issued token together with its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: OpaqueToken,
    pub expires_at: Timestamp,
}

/// Generate 256 bits from the OS RNG, URL-safe base64 encoded without padding.
#[must_use]
pub fn generate_token() -> OpaqueToken {
    let mut bytes = [0_u8; TOKEN_BYTES];

    OsRng.fill_bytes(&mut bytes);

    let token = OpaqueToken(URL_SAFE_NO_PAD.encode(bytes));

    bytes.zeroize();

    token
}

#[must_use]
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_url_safe_and_distinct() {
        let first = generate_token();
        let second = generate_token();

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 43, "32 bytes encode to 43 base64 chars");
        assert!(
            first
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn hash_is_stable_hex_digest() {
        let digest = hash_token("abc");

        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(OpaqueToken("abc".to_string()).hash(), digest);
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = generate_token();

        assert_eq!(format!("{token:?}"), "OpaqueToken(**redacted**)");
    }
}
