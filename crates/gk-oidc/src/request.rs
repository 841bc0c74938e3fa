//! Request parameter types for the protocol endpoints.

use serde::{Deserialize, Serialize};

/// Parameters of an authorization request (RFC 6749 Section 4.1.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Must be "code".
    pub response_type: Option<String>,

    /// Public client identifier.
    pub client_id: Option<String>,

    /// Redirect URI; must byte-exactly match a registered URI.
    pub redirect_uri: Option<String>,

    /// Requested scopes, space-separated.
    pub scope: Option<String>,

    /// Opaque client state, echoed back on redirects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// OIDC nonce, echoed into the ID token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// PKCE code challenge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE challenge method: "plain" or "S256".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
}

impl AuthorizationRequest {
    /// Splits the scope parameter into individual scopes.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Parameters of a token request (RFC 6749 Sections 4.1.3 and 6).
///
/// Accepted as either a form or a JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// Grant type.
    pub grant_type: Option<String>,

    /// Authorization code (authorization_code grant).
    pub code: Option<String>,

    /// Redirect URI used at authorization (authorization_code grant).
    pub redirect_uri: Option<String>,

    /// Client identifier, when not sent via Basic auth.
    pub client_id: Option<String>,

    /// Client secret, when not sent via Basic auth.
    pub client_secret: Option<String>,

    /// PKCE code verifier.
    pub code_verifier: Option<String>,

    /// Refresh token (refresh_token grant).
    pub refresh_token: Option<String>,
}

/// Parameters of a consent decision form post.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentRequest {
    /// Whether the user approved the request.
    pub approved: bool,

    /// Client the consent is for.
    pub client_id: String,

    /// Redirect URI from the authorization request.
    pub redirect_uri: String,

    /// Scopes from the authorization request.
    pub scope: String,

    /// State from the authorization request.
    pub state: Option<String>,

    /// Nonce from the authorization request.
    pub nonce: Option<String>,

    /// PKCE challenge from the authorization request.
    pub code_challenge: Option<String>,

    /// PKCE challenge method from the authorization request.
    pub code_challenge_method: Option<String>,
}
