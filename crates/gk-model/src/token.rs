//! Credential artifacts minted during the OAuth flows.
//!
//! Authorization codes and refresh tokens are opaque random strings; access
//! tokens are signed JWTs whose `jti` keys a revocable row here.

use chrono::{DateTime, Duration, Utc};
use gk_crypto::CodeChallengeMethod;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single-use authorization code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The opaque code value.
    pub code: String,
    /// OAuth `client_id` the code was issued to.
    pub client_id: String,
    /// User who approved the authorization.
    pub user_id: Uuid,
    /// Redirect URI bound to the code. Redemption must match byte-exactly.
    pub redirect_uri: String,
    /// Granted scopes (space-separated).
    pub scope: String,
    /// Nonce from the authorization request, echoed into the ID token.
    pub nonce: Option<String>,
    /// PKCE code challenge.
    pub code_challenge: Option<String>,
    /// PKCE code challenge method.
    pub code_challenge_method: Option<CodeChallengeMethod>,
    /// When the code expires.
    pub expires_at: DateTime<Utc>,
    /// Whether this code has been redeemed (single-use).
    pub used: bool,
}

impl AuthorizationCode {
    /// Creates a new unused code with the given TTL.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        client_id: impl Into<String>,
        user_id: Uuid,
        redirect_uri: impl Into<String>,
        scope: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            code: code.into(),
            client_id: client_id.into(),
            user_id,
            redirect_uri: redirect_uri.into(),
            scope: scope.into(),
            nonce: None,
            code_challenge: None,
            code_challenge_method: None,
            expires_at: Utc::now() + Duration::seconds(ttl_seconds),
            used: false,
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: Option<String>) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets PKCE parameters.
    #[must_use]
    pub fn with_pkce(
        mut self,
        challenge: Option<String>,
        method: Option<CodeChallengeMethod>,
    ) -> Self {
        self.code_challenge = challenge;
        self.code_challenge_method = method;
        self
    }

    /// Checks if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Revocation record for an issued access token.
///
/// The wire artifact is the signed JWT; this row, keyed by the JWT's `jti`,
/// is the source of truth for revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The JWT `jti` claim.
    pub token: String,
    /// OAuth `client_id` the token was issued to.
    pub client_id: String,
    /// Subject user.
    pub user_id: Uuid,
    /// Granted scopes (space-separated).
    pub scope: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has been revoked.
    pub revoked: bool,
}

impl AccessToken {
    /// Creates a new live access token record.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        client_id: impl Into<String>,
        user_id: Uuid,
        scope: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            token: token.into(),
            client_id: client_id.into(),
            user_id,
            scope: scope.into(),
            expires_at: Utc::now() + Duration::seconds(ttl_seconds),
            revoked: false,
        }
    }

    /// Checks whether the token is live: not revoked and not expired.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.revoked && Utc::now() <= self.expires_at
    }
}

/// An opaque refresh token.
///
/// Refresh tokens are not rotated: the row minted at code redemption stays
/// valid for its whole lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    /// The opaque token value.
    pub token: String,
    /// OAuth `client_id` the token was issued to.
    pub client_id: String,
    /// Subject user.
    pub user_id: Uuid,
    /// Granted scopes (space-separated).
    pub scope: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has been revoked.
    pub revoked: bool,
}

impl RefreshToken {
    /// Creates a new live refresh token.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        client_id: impl Into<String>,
        user_id: Uuid,
        scope: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            token: token.into(),
            client_id: client_id.into(),
            user_id,
            scope: scope.into(),
            expires_at: Utc::now() + Duration::seconds(ttl_seconds),
            revoked: false,
        }
    }

    /// Checks whether the token is live: not revoked and not expired.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.revoked && Utc::now() <= self.expires_at
    }
}

/// A recorded scope approval for a `(user, client)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConsent {
    /// User who approved.
    pub user_id: Uuid,
    /// OAuth `client_id` approved for.
    pub client_id: String,
    /// Approved scopes (space-separated).
    pub scope: String,
    /// When the consent was last granted or refreshed.
    pub updated_at: DateTime<Utc>,
}

impl UserConsent {
    /// Creates a new consent record.
    #[must_use]
    pub fn new(user_id: Uuid, client_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            user_id,
            client_id: client_id.into(),
            scope: scope.into(),
            updated_at: Utc::now(),
        }
    }

    /// Checks whether this consent already covers every requested scope.
    #[must_use]
    pub fn covers<'a>(&self, requested: impl IntoIterator<Item = &'a str>) -> bool {
        let granted: Vec<&str> = self.scope.split_whitespace().collect();
        requested.into_iter().all(|s| granted.contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_expiration() {
        let expired = AuthorizationCode::new("c1", "web-app", Uuid::now_v7(), "uri", "openid", -1);
        assert!(expired.is_expired());

        let valid = AuthorizationCode::new("c2", "web-app", Uuid::now_v7(), "uri", "openid", 600);
        assert!(!valid.is_expired());
    }

    #[test]
    fn access_token_liveness() {
        let mut token = AccessToken::new("jti-1", "web-app", Uuid::now_v7(), "openid", 3600);
        assert!(token.is_live());

        token.revoked = true;
        assert!(!token.is_live());
    }

    #[test]
    fn consent_coverage() {
        let consent = UserConsent::new(Uuid::now_v7(), "web-app", "openid profile email");
        assert!(consent.covers(["openid", "email"]));
        assert!(!consent.covers(["openid", "admin"]));
    }
}
