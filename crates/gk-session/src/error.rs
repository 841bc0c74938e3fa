//! Session error types.

use gk_storage::StorageError;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cookie failed to decrypt or deserialize.
    #[error("Session cookie invalid")]
    InvalidCookie,

    /// No live server-side session backs the cookie.
    #[error("Session not found or expired")]
    NotAuthenticated,

    /// Storage error.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal error.
    #[error("Internal session error: {0}")]
    Internal(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
