//! OAuth client domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered OAuth client application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClient {
    /// Internal identifier.
    pub id: Uuid,
    /// Tenant this client belongs to.
    pub tenant_id: Uuid,
    /// Public OAuth `client_id` (unique within the tenant).
    pub client_id: String,
    /// Hash of the client secret.
    pub client_secret_hash: String,
    /// Display name shown on the consent page.
    pub name: String,
    /// Registered redirect URIs. Matching is byte-exact.
    pub redirect_uris: Vec<String>,
    /// Scopes the client may request.
    pub allowed_scopes: Vec<String>,
    /// Grant types the client may use.
    pub grant_types: Vec<String>,
    /// Whether the client is active.
    pub is_active: bool,
    /// When the client was registered.
    pub created_at: DateTime<Utc>,
}

impl OAuthClient {
    /// Creates a new active client.
    #[must_use]
    pub fn new(
        tenant_id: Uuid,
        client_id: impl Into<String>,
        client_secret_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            client_id: client_id.into(),
            client_secret_hash: client_secret_hash.into(),
            name: name.into(),
            redirect_uris: Vec::new(),
            allowed_scopes: vec!["openid".to_string()],
            grant_types: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Adds a registered redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uris.push(uri.into());
        self
    }

    /// Sets the allowed scopes.
    #[must_use]
    pub fn with_allowed_scopes(mut self, scopes: Vec<String>) -> Self {
        self.allowed_scopes = scopes;
        self
    }

    /// Sets whether the client is active.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Checks whether a redirect URI is registered (byte-exact).
    #[must_use]
    pub fn has_redirect_uri(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == uri)
    }

    /// Checks whether every requested scope is allowed.
    #[must_use]
    pub fn allows_scopes<'a>(&self, requested: impl IntoIterator<Item = &'a str>) -> bool {
        requested
            .into_iter()
            .all(|s| self.allowed_scopes.iter().any(|a| a == s))
    }
}
