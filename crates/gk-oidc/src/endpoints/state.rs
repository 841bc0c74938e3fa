//! Shared state for the protocol endpoints.

use axum::http::HeaderMap;
use gk_session::{SessionManager, SessionPrincipal};
use gk_storage::Repositories;

use crate::tokens::TokenIssuer;

/// State handed to every protocol handler.
#[derive(Debug, Clone)]
pub struct OidcState {
    /// Entity stores.
    pub repos: Repositories,

    /// Browser session manager.
    pub sessions: SessionManager,

    /// Token and code issuance.
    pub issuer: TokenIssuer,

    /// Name of the session cookie.
    pub cookie_name: String,
}

impl OidcState {
    /// Resolves the logged-in principal from the request's cookies, if any.
    pub async fn current_principal(&self, headers: &HeaderMap) -> Option<SessionPrincipal> {
        let value = cookie_value(headers, &self.cookie_name)?;
        self.sessions.authenticate(&value).await.ok()
    }
}

/// Pulls a cookie value out of the `Cookie` header.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;

    use super::*;

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "other=1; gatekey_session=abc123; trailing=x".parse().unwrap(),
        );

        assert_eq!(
            cookie_value(&headers, "gatekey_session"),
            Some("abc123".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
