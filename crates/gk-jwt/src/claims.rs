//! JWT claim types for access and ID tokens.

use chrono::{DateTime, Utc};
use gk_model::CustomRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token claims.
///
/// The `jti` doubles as the key of the server-side revocation row; bearers
/// of a structurally valid JWT are still checked against that row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer URL of the authorization server.
    pub iss: String,

    /// Subject, the user's ID.
    pub sub: String,

    /// Audience, the `client_id` the token was issued to.
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// JWT ID, unique per token.
    pub jti: String,

    /// Tenant the subject belongs to.
    pub tenant_id: Uuid,

    /// Space-separated granted scopes.
    pub scope: String,

    /// Subject's email address.
    pub email: String,

    /// Subject's display name.
    pub name: String,

    /// Subject's primary role.
    pub role: String,

    /// Per-client custom role grants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_roles: Vec<CustomRole>,
}

impl AccessTokenClaims {
    /// Creates new access token claims with a fresh `jti`.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        subject: Uuid,
        client_id: impl Into<String>,
        tenant_id: Uuid,
        scope: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: subject.to_string(),
            aud: client_id.into(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            jti: Uuid::now_v7().to_string(),
            tenant_id,
            scope: scope.into(),
            email: String::new(),
            name: String::new(),
            role: String::new(),
            custom_roles: Vec::new(),
        }
    }

    /// Sets the subject's profile claims.
    #[must_use]
    pub fn with_profile(
        mut self,
        email: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        self.email = email.into();
        self.name = name.into();
        self.role = role.into();
        self
    }

    /// Sets the custom role grants.
    #[must_use]
    pub fn with_custom_roles(mut self, roles: Vec<CustomRole>) -> Self {
        self.custom_roles = roles;
        self
    }

    /// Checks whether a scope was granted.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }
}

/// ID token claims per OpenID Connect Core 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer URL of the authorization server.
    pub iss: String,

    /// Subject, the user's ID.
    pub sub: String,

    /// Audience, the `client_id` the token was issued to.
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// JWT ID, carrying the nonce from the authorization request when one
    /// was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Subject's email address.
    pub email: String,

    /// Whether the email was verified.
    pub email_verified: bool,

    /// Subject's display name.
    pub name: String,

    /// Profile picture URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl IdTokenClaims {
    /// Creates new ID token claims.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        subject: Uuid,
        client_id: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: subject.to_string(),
            aud: client_id.into(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
            jti: None,
            email: String::new(),
            email_verified: false,
            name: String::new(),
            picture: None,
        }
    }

    /// Sets the JWT ID from the request's nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: Option<String>) -> Self {
        self.jti = nonce;
        self
    }

    /// Sets the subject's profile claims.
    #[must_use]
    pub fn with_profile(
        mut self,
        email: impl Into<String>,
        email_verified: bool,
        name: impl Into<String>,
        picture: Option<String>,
    ) -> Self {
        self.email = email.into();
        self.email_verified = email_verified;
        self.name = name.into();
        self.picture = picture;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn scope_membership() {
        let claims = AccessTokenClaims::new(
            "https://auth.example.com",
            Uuid::now_v7(),
            "web-app",
            Uuid::now_v7(),
            "openid profile",
            Utc::now() + Duration::hours(1),
        );

        assert!(claims.has_scope("openid"));
        assert!(claims.has_scope("profile"));
        assert!(!claims.has_scope("email"));
        assert!(!claims.has_scope("pro"));
    }

    #[test]
    fn empty_custom_roles_are_omitted() {
        let claims = AccessTokenClaims::new(
            "https://auth.example.com",
            Uuid::now_v7(),
            "web-app",
            Uuid::now_v7(),
            "openid",
            Utc::now() + Duration::hours(1),
        );

        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("custom_roles"));
    }

    #[test]
    fn nonce_becomes_the_jwt_id() {
        let claims = IdTokenClaims::new(
            "https://auth.example.com",
            Uuid::now_v7(),
            "web-app",
            Utc::now() + Duration::hours(1),
        )
        .with_nonce(Some("n-0S6_WzA2Mj".to_string()));

        assert_eq!(claims.jti.as_deref(), Some("n-0S6_WzA2Mj"));
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains(r#""jti":"n-0S6_WzA2Mj""#));
    }
}
