//! Authentication error types.

use std::fmt;

use gk_storage::StorageError;

/// Authentication operation errors.
#[derive(Debug)]
pub enum AuthError {
    /// Invalid email or password. Deliberately covers both the unknown-user
    /// and wrong-password cases so callers cannot tell them apart.
    InvalidCredentials,
    /// User account is deactivated.
    AccountInactive,
    /// No tenant matches the email domain.
    TenantNotFound,
    /// The tenant exists but is deactivated.
    TenantInactive,
    /// TOTP or backup code verification failed.
    InvalidCode,
    /// MFA is already enabled for the user.
    AlreadyEnabled,
    /// MFA is not enabled for the user.
    NotEnabled,
    /// New password fails the complexity policy.
    PasswordPolicyViolation(String),
    /// The login flow token is unknown, expired, or at the wrong stage.
    FlowExpired,
    /// Storage error.
    Storage(StorageError),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::AccountInactive => write!(f, "account is inactive"),
            Self::TenantNotFound => write!(f, "no tenant for email domain"),
            Self::TenantInactive => write!(f, "tenant is inactive"),
            Self::InvalidCode => write!(f, "invalid verification code"),
            Self::AlreadyEnabled => write!(f, "multi-factor authentication is already enabled"),
            Self::NotEnabled => write!(f, "multi-factor authentication is not enabled"),
            Self::PasswordPolicyViolation(msg) => write!(f, "password policy violation: {msg}"),
            Self::FlowExpired => write!(f, "login flow expired"),
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::Internal(msg) => write!(f, "internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
