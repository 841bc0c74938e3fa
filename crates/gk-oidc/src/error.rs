//! Protocol error types.
//!
//! Implements the OAuth 2.0 error taxonomy from RFC 6749 plus the Bearer
//! token errors from RFC 6750.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OAuth 2.0 / OIDC protocol errors.
#[derive(Debug, Error)]
pub enum OidcError {
    /// Invalid request parameters.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// Client authentication failed.
    #[error("invalid_client: {0}")]
    InvalidClient(String),

    /// Invalid, expired, or already-used authorization grant.
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// Client is not authorized for this request.
    #[error("unauthorized_client: {0}")]
    UnauthorizedClient(String),

    /// Unsupported grant type.
    #[error("unsupported_grant_type: {0}")]
    UnsupportedGrantType(String),

    /// Invalid scope.
    #[error("invalid_scope: {0}")]
    InvalidScope(String),

    /// Unsupported response type.
    #[error("unsupported_response_type: {0}")]
    UnsupportedResponseType(String),

    /// Resource owner declined the authorization.
    #[error("access_denied: {0}")]
    AccessDenied(String),

    /// Invalid bearer token.
    #[error("invalid_token: {0}")]
    InvalidToken(String),

    /// Token lacks the required scope.
    #[error("insufficient_scope: {0}")]
    InsufficientScope(String),

    /// Server error.
    #[error("server_error: {0}")]
    ServerError(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OidcError {
    /// Returns the OAuth 2.0 error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidClient(_) => "invalid_client",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::UnauthorizedClient(_) => "unauthorized_client",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::InvalidScope(_) => "invalid_scope",
            Self::UnsupportedResponseType(_) => "unsupported_response_type",
            Self::AccessDenied(_) => "access_denied",
            Self::InvalidToken(_) => "invalid_token",
            Self::InsufficientScope(_) => "insufficient_scope",
            Self::ServerError(_) | Self::Internal(_) => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidGrant(_)
            | Self::InvalidScope(_)
            | Self::UnsupportedGrantType(_)
            | Self::UnsupportedResponseType(_) => 400,
            Self::InvalidClient(_) | Self::InvalidToken(_) => 401,
            Self::AccessDenied(_) | Self::UnauthorizedClient(_) | Self::InsufficientScope(_) => 403,
            Self::ServerError(_) | Self::Internal(_) => 500,
        }
    }

    /// Creates the RFC 6749 error response body.
    ///
    /// Server-side failures carry no description; their detail stays in
    /// the logs.
    #[must_use]
    pub fn to_error_response(&self) -> ErrorResponse {
        let error_description = match self {
            Self::ServerError(_) | Self::Internal(_) => None,
            other => Some(other.to_string()),
        };
        ErrorResponse {
            error: self.error_code().to_string(),
            error_description,
        }
    }
}

impl From<gk_storage::StorageError> for OidcError {
    fn from(e: gk_storage::StorageError) -> Self {
        Self::ServerError(e.to_string())
    }
}

/// OAuth 2.0 error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Result type for protocol operations.
pub type OidcResult<T> = Result<T, OidcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_and_statuses() {
        let err = OidcError::InvalidClient("bad secret".to_string());
        assert_eq!(err.error_code(), "invalid_client");
        assert_eq!(err.http_status(), 401);

        let err = OidcError::UnsupportedGrantType("password".to_string());
        assert_eq!(err.error_code(), "unsupported_grant_type");
        assert_eq!(err.http_status(), 400);

        let err = OidcError::Internal("boom".to_string());
        assert_eq!(err.error_code(), "server_error");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn error_response_body() {
        let body = OidcError::InvalidGrant("code already used".to_string()).to_error_response();
        assert_eq!(body.error, "invalid_grant");
        assert!(body.error_description.unwrap().contains("already used"));
    }

    #[test]
    fn server_errors_hide_their_detail() {
        let detail = "connection pool exhausted at 10.0.3.7:5432";
        for err in [
            OidcError::ServerError(detail.to_string()),
            OidcError::Internal(detail.to_string()),
        ] {
            let body = err.to_error_response();
            assert_eq!(body.error, "server_error");
            assert!(body.error_description.is_none());
        }
    }

    #[test]
    fn storage_error_text_never_reaches_the_body() {
        let err: OidcError =
            gk_storage::StorageError::Internal("table users is missing".to_string()).into();
        let json = serde_json::to_string(&err.to_error_response()).unwrap();
        assert!(!json.contains("users"));
    }
}
