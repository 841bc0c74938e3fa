//! Environment-variable configuration loading.
//!
//! Values come from `GK_*` variables with local-development defaults; the
//! session secret and signing key are required. A `.env` file is honored
//! when present.

use gk_core::Config;

/// Loads the server configuration from the environment.
///
/// The signing key is accepted either inline (`GK_SIGNING_KEY_PEM`) or as
/// a file path (`GK_SIGNING_KEY_PATH`).
///
/// ## Errors
///
/// Fails when `GK_SESSION_SECRET` or the signing key is missing, or when
/// the key file cannot be read.
pub fn load_config() -> anyhow::Result<Config> {
    let _ = dotenvy::dotenv();

    let mut config = Config::default();

    if let Ok(host) = std::env::var("GK_HOST") {
        config.server.host = host;
    }
    if let Some(port) = env_parse("GK_PORT") {
        config.server.port = port;
    }
    config.server.issuer = std::env::var("GK_ISSUER")
        .unwrap_or_else(|_| format!("http://{}:{}", config.server.host, config.server.port));

    if let Some(ttl) = env_parse("GK_ACCESS_TOKEN_TTL") {
        config.ttl.access_token = ttl;
    }
    if let Some(ttl) = env_parse("GK_REFRESH_TOKEN_TTL") {
        config.ttl.refresh_token = ttl;
    }
    if let Some(ttl) = env_parse("GK_AUTH_CODE_TTL") {
        config.ttl.authorization_code = ttl;
    }

    if let Ok(name) = std::env::var("GK_COOKIE_NAME") {
        config.cookie.name = name;
    }
    if let Some(max_age) = env_parse("GK_COOKIE_MAX_AGE") {
        config.cookie.max_age = max_age;
    }
    if let Some(interval) = env_parse("GK_CLEANUP_INTERVAL") {
        config.cleanup_interval_secs = interval;
    }

    config.session_secret = std::env::var("GK_SESSION_SECRET")
        .map_err(|_| anyhow::anyhow!("GK_SESSION_SECRET environment variable is required"))?;

    config.signing_key_pem = match std::env::var("GK_SIGNING_KEY_PEM") {
        Ok(pem) => pem,
        Err(_) => {
            let path = std::env::var("GK_SIGNING_KEY_PATH").map_err(|_| {
                anyhow::anyhow!("GK_SIGNING_KEY_PEM or GK_SIGNING_KEY_PATH is required")
            })?;
            std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("cannot read signing key from {path}: {e}"))?
        }
    };
    if let Ok(kid) = std::env::var("GK_SIGNING_KEY_ID") {
        config.signing_key_id = kid;
    }

    Ok(config)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
