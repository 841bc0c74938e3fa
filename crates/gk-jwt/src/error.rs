//! Token signing and verification error types.

use thiserror::Error;

/// Errors that can occur while signing or verifying tokens.
#[derive(Debug, Error)]
pub enum JwtError {
    /// The signing key material could not be loaded.
    #[error("Invalid key material: {0}")]
    Key(String),

    /// Signing a token failed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// The token signature did not verify.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token has expired.
    #[error("Token has expired")]
    Expired,

    /// The token was issued by a different issuer.
    #[error("Token issuer mismatch")]
    IssuerMismatch,

    /// The token is malformed or carries unusable claims.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Result type for token operations.
pub type JwtResult<T> = Result<T, JwtError>;
