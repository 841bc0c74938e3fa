//! Password hashing and verification using Argon2id.
//!
//! Passwords are stored as PHC strings. Hashing parameters follow the OWASP
//! recommendation for Argon2id (19 MiB memory, 2 iterations, 1 lane), which
//! meets or exceeds the work factor of a 12-round bcrypt hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{CryptoError, CryptoResult};

const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const HASH_LENGTH: usize = 32;

/// Password hasher using Argon2id.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordHasherService;

impl PasswordHasherService {
    /// Creates a new password hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Hashes a password.
    ///
    /// Returns the PHC-formatted hash string.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn hash(&self, password: &str) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(HASH_LENGTH))
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies a password against a stored hash.
    ///
    /// Comparison is constant-time within the Argon2 verifier.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::VerificationFailed` if the password does not
    /// match, or `CryptoError::Hashing` if the stored hash is malformed.
    pub fn verify(&self, password: &str, hash: &str) -> CryptoResult<()> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| CryptoError::Hashing(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}
