//! Cryptographically secure random token generation.
//!
//! This module provides secure random generation for:
//! - Authorization codes
//! - Refresh and session tokens
//! - Login flow correlation tokens
//! - MFA backup codes
//!
//! All functions use cryptographically secure random number generators.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;

/// Generates a cryptographically secure random byte array.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates an opaque URL-safe token from `byte_len` random bytes.
///
/// The output is base64url encoded without padding, so it travels in URLs
/// and form bodies untouched.
#[must_use]
pub fn generate_opaque_token(byte_len: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(byte_len))
}

/// Generates a random authorization code.
///
/// 32 random bytes give 256 bits of entropy, well past the 128-bit minimum
/// recommended by RFC 6749 for guessing resistance.
#[must_use]
pub fn generate_auth_code() -> String {
    generate_opaque_token(32)
}

/// Generates a random session token.
#[must_use]
pub fn generate_session_token() -> String {
    generate_opaque_token(32)
}

/// Generates a random login flow correlation token.
#[must_use]
pub fn generate_flow_token() -> String {
    generate_opaque_token(32)
}

/// Generates a single MFA backup code.
///
/// Backup codes are 8 uppercase hex characters (4 random bytes).
#[must_use]
pub fn generate_backup_code() -> String {
    random_bytes(4).iter().map(|b| format!("{b:02X}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_bytes_produces_correct_length() {
        assert_eq!(random_bytes(16).len(), 16);
        assert_eq!(random_bytes(32).len(), 32);
    }

    #[test]
    fn random_bytes_produces_different_values() {
        assert_ne!(random_bytes(32), random_bytes(32));
    }

    #[test]
    fn opaque_token_is_url_safe() {
        let token = generate_opaque_token(32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes encode to 43 characters without padding
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn auth_code_uniqueness() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_auth_code()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn backup_code_format() {
        let code = generate_backup_code();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }
}
