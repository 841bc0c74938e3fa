//! Configuration for the Gatekey authorization server.
//!
//! Values are loaded from the environment by the server crate; the defaults
//! here describe a local development deployment.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Token lifetime configuration.
    pub ttl: TokenTtlConfig,
    /// Session cookie configuration.
    pub cookie: CookieConfig,
    /// Secret used to derive the session cookie encryption key.
    pub session_secret: String,
    /// PEM-encoded RSA private key used for token signing.
    pub signing_key_pem: String,
    /// Key identifier published in the JWKS document and JWT headers.
    pub signing_key_id: String,
    /// Interval in seconds between expired-credential cleanup passes.
    pub cleanup_interval_secs: u64,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Issuer URL advertised in tokens and discovery metadata.
    pub issuer: String,
}

/// Token lifetime configuration, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTtlConfig {
    /// Access token lifetime.
    pub access_token: i64,
    /// Refresh token lifetime.
    pub refresh_token: i64,
    /// Authorization code lifetime.
    pub authorization_code: i64,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,
    /// Cookie max-age in seconds.
    pub max_age: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                issuer: "http://localhost:8080".to_string(),
            },
            ttl: TokenTtlConfig::default(),
            cookie: CookieConfig::default(),
            session_secret: String::new(),
            signing_key_pem: String::new(),
            signing_key_id: "gatekey-signing-key".to_string(),
            cleanup_interval_secs: 300,
        }
    }
}

impl Default for TokenTtlConfig {
    fn default() -> Self {
        Self {
            access_token: 3_600,         // 1 hour
            refresh_token: 2_592_000,    // 30 days
            authorization_code: 600,     // 10 minutes
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "gatekey_session".to_string(),
            max_age: 604_800, // 7 days
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttls() {
        let config = Config::default();
        assert_eq!(config.ttl.access_token, 3_600);
        assert_eq!(config.ttl.refresh_token, 2_592_000);
        assert_eq!(config.ttl.authorization_code, 600);
        assert_eq!(config.cookie.max_age, 604_800);
    }
}
