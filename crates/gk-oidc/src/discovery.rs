//! OpenID Connect discovery metadata (OpenID Connect Discovery 1.0).

use serde::{Deserialize, Serialize};

/// The provider metadata served at `/.well-known/openid-configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer URL.
    pub issuer: String,

    /// Authorization endpoint URL.
    pub authorization_endpoint: String,

    /// Token endpoint URL.
    pub token_endpoint: String,

    /// UserInfo endpoint URL.
    pub userinfo_endpoint: String,

    /// JWKS document URL.
    pub jwks_uri: String,

    /// Supported response types.
    pub response_types_supported: Vec<String>,

    /// Supported grant types.
    pub grant_types_supported: Vec<String>,

    /// Supported subject identifier types.
    pub subject_types_supported: Vec<String>,

    /// Supported ID token signing algorithms.
    pub id_token_signing_alg_values_supported: Vec<String>,

    /// Supported scopes.
    pub scopes_supported: Vec<String>,

    /// Supported client authentication methods at the token endpoint.
    pub token_endpoint_auth_methods_supported: Vec<String>,

    /// Supported PKCE challenge methods.
    pub code_challenge_methods_supported: Vec<String>,
}

impl ProviderMetadata {
    /// Builds the metadata document for an issuer.
    #[must_use]
    pub fn for_issuer(issuer: &str) -> Self {
        let base = issuer.trim_end_matches('/');
        Self {
            issuer: base.to_string(),
            authorization_endpoint: format!("{base}/oauth/authorize"),
            token_endpoint: format!("{base}/oauth/token"),
            userinfo_endpoint: format!("{base}/oauth/userinfo"),
            jwks_uri: format!("{base}/.well-known/jwks.json"),
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
            subject_types_supported: vec!["public".to_string()],
            id_token_signing_alg_values_supported: vec!["RS256".to_string()],
            scopes_supported: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
            token_endpoint_auth_methods_supported: vec![
                "client_secret_basic".to_string(),
                "client_secret_post".to_string(),
            ],
            code_challenge_methods_supported: vec!["plain".to_string(), "S256".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_derive_from_issuer() {
        let meta = ProviderMetadata::for_issuer("https://auth.example.com/");
        assert_eq!(meta.issuer, "https://auth.example.com");
        assert_eq!(
            meta.authorization_endpoint,
            "https://auth.example.com/oauth/authorize"
        );
        assert_eq!(meta.jwks_uri, "https://auth.example.com/.well-known/jwks.json");
        assert_eq!(meta.response_types_supported, vec!["code"]);
    }
}
