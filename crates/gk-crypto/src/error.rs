//! Crypto error types.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// A credential or proof did not verify.
    #[error("verification failed")]
    VerificationFailed,

    /// Input did not meet the format required by the operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
