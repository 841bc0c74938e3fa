//! # gk-crypto
//!
//! Cryptographic primitives for Gatekey.
//!
//! ## Modules
//!
//! - [`hash`] - SHA-256, HMAC, and constant-time comparison
//! - [`random`] - Secure random token generation
//! - [`password`] - Argon2id password hashing
//! - [`pkce`] - PKCE challenge verification (RFC 7636)

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod hash;
pub mod password;
pub mod pkce;
pub mod random;

pub use error::{CryptoError, CryptoResult};
pub use hash::{constant_time_eq, hmac_sha256, sha256, sha256_hex};
pub use password::PasswordHasherService;
pub use pkce::{verify_pkce, CodeChallengeMethod};
pub use random::{
    generate_auth_code, generate_backup_code, generate_flow_token, generate_opaque_token,
    generate_session_token, random_bytes,
};
