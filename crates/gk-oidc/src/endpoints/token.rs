//! Token endpoint (RFC 6749 Section 3.2).
//!
//! Accepts form or JSON bodies and client credentials via either HTTP
//! Basic auth or body parameters. Client authentication happens before
//! the grant is even looked at.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gk_crypto::{constant_time_eq, sha256_hex, verify_pkce, CryptoError};
use gk_model::{OAuthClient, User};
use tracing::info;

use super::{error_response, OidcState};
use crate::error::{OidcError, OidcResult};
use crate::request::TokenRequest;
use crate::tokens::TokenResponse;
use crate::types::GrantType;

/// `POST /oauth/token`
pub async fn handle(
    State(state): State<OidcState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match grant(&state, &headers, &body).await {
        Ok(response) => axum::Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn grant(state: &OidcState, headers: &HeaderMap, body: &[u8]) -> OidcResult<TokenResponse> {
    let request = parse_body(headers, body)?;
    let client = authenticate_client(state, headers, &request).await?;

    let grant_type = request
        .grant_type
        .as_deref()
        .ok_or_else(|| OidcError::InvalidRequest("missing grant_type".to_string()))?
        .parse::<GrantType>()
        .map_err(OidcError::UnsupportedGrantType)?;

    match grant_type {
        GrantType::AuthorizationCode => authorization_code_grant(state, &client, &request).await,
        GrantType::RefreshToken => refresh_token_grant(state, &client, &request).await,
    }
}

/// Dispatches on `Content-Type`: JSON bodies and URL-encoded forms are
/// both accepted.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> OidcResult<TokenRequest> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        serde_json::from_slice(body)
            .map_err(|e| OidcError::InvalidRequest(format!("malformed JSON body: {e}")))
    } else {
        serde_urlencoded::from_bytes(body)
            .map_err(|e| OidcError::InvalidRequest(format!("malformed form body: {e}")))
    }
}

/// Extracts client credentials from the `Authorization: Basic` header or,
/// failing that, the request body.
fn extract_client_credentials(
    headers: &HeaderMap,
    request: &TokenRequest,
) -> OidcResult<(String, String)> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| OidcError::InvalidClient("malformed Authorization header".to_string()))?;
        if let Some(encoded) = value.strip_prefix("Basic ") {
            let decoded = STANDARD
                .decode(encoded)
                .map_err(|_| OidcError::InvalidClient("malformed Basic credentials".to_string()))?;
            let decoded = String::from_utf8(decoded)
                .map_err(|_| OidcError::InvalidClient("malformed Basic credentials".to_string()))?;
            let (id, secret) = decoded.split_once(':').ok_or_else(|| {
                OidcError::InvalidClient("malformed Basic credentials".to_string())
            })?;
            return Ok((id.to_string(), secret.to_string()));
        }
    }

    match (&request.client_id, &request.client_secret) {
        (Some(id), Some(secret)) => Ok((id.clone(), secret.clone())),
        _ => Err(OidcError::InvalidClient(
            "missing client credentials".to_string(),
        )),
    }
}

async fn authenticate_client(
    state: &OidcState,
    headers: &HeaderMap,
    request: &TokenRequest,
) -> OidcResult<OAuthClient> {
    let (client_id, client_secret) = extract_client_credentials(headers, request)?;

    let client = state
        .repos
        .clients
        .get_by_client_id(&client_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| OidcError::InvalidClient("client authentication failed".to_string()))?;

    let presented = sha256_hex(client_secret.as_bytes());
    if !constant_time_eq(presented.as_bytes(), client.client_secret_hash.as_bytes()) {
        return Err(OidcError::InvalidClient(
            "client authentication failed".to_string(),
        ));
    }

    Ok(client)
}

async fn authorization_code_grant(
    state: &OidcState,
    client: &OAuthClient,
    request: &TokenRequest,
) -> OidcResult<TokenResponse> {
    let code_value = request
        .code
        .as_deref()
        .ok_or_else(|| OidcError::InvalidRequest("missing code".to_string()))?;
    let redirect_uri = request
        .redirect_uri
        .as_deref()
        .ok_or_else(|| OidcError::InvalidRequest("missing redirect_uri".to_string()))?;

    // Redemption is atomic: a second redemption of the same value gets
    // None regardless of interleaving.
    let code = state
        .repos
        .auth_codes
        .consume(code_value)
        .await?
        .ok_or_else(|| OidcError::InvalidGrant("invalid or already-used code".to_string()))?;

    if code.is_expired() {
        return Err(OidcError::InvalidGrant("code has expired".to_string()));
    }
    if code.client_id != client.client_id {
        return Err(OidcError::InvalidGrant(
            "code was issued to a different client".to_string(),
        ));
    }
    if code.redirect_uri != redirect_uri {
        return Err(OidcError::InvalidGrant(
            "redirect_uri does not match the authorization request".to_string(),
        ));
    }

    check_pkce(&code.code_challenge, code.code_challenge_method, request)?;

    let user = live_user(state, client, code.user_id).await?;

    info!(
        client_id = %client.client_id,
        user_id = %user.id,
        scope = %code.scope,
        "authorization code redeemed"
    );

    state
        .issuer
        .issue(&user, &client.client_id, &code.scope, code.nonce.as_deref(), true)
        .await
}

fn check_pkce(
    challenge: &Option<String>,
    method: Option<gk_crypto::CodeChallengeMethod>,
    request: &TokenRequest,
) -> OidcResult<()> {
    let Some(challenge) = challenge else {
        return Ok(());
    };
    let verifier = request
        .code_verifier
        .as_deref()
        .ok_or_else(|| OidcError::InvalidRequest("missing code_verifier".to_string()))?;

    let method = method.unwrap_or(gk_crypto::CodeChallengeMethod::Plain);
    verify_pkce(verifier, challenge, method).map_err(|e| match e {
        CryptoError::InvalidInput(msg) => OidcError::InvalidRequest(msg),
        _ => OidcError::InvalidGrant("code_verifier does not match".to_string()),
    })
}

async fn refresh_token_grant(
    state: &OidcState,
    client: &OAuthClient,
    request: &TokenRequest,
) -> OidcResult<TokenResponse> {
    let value = request
        .refresh_token
        .as_deref()
        .ok_or_else(|| OidcError::InvalidRequest("missing refresh_token".to_string()))?;

    let token = state
        .repos
        .refresh_tokens
        .get(value)
        .await?
        .filter(|t| t.is_live() && t.client_id == client.client_id)
        .ok_or_else(|| OidcError::InvalidGrant("invalid refresh token".to_string()))?;

    let user = live_user(state, client, token.user_id).await?;

    info!(
        client_id = %client.client_id,
        user_id = %user.id,
        "refresh token exchanged"
    );

    // No rotation: the stored refresh token stays valid and the response
    // carries only a fresh access token.
    state
        .issuer
        .issue(&user, &client.client_id, &token.scope, None, false)
        .await
}

async fn live_user(state: &OidcState, client: &OAuthClient, user_id: uuid::Uuid) -> OidcResult<User> {
    state
        .repos
        .users
        .get_by_id(client.tenant_id, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| OidcError::InvalidGrant("user account is not active".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_credentials_win_over_body() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("web-app:s3cret");
        headers.insert(
            header::AUTHORIZATION,
            format!("Basic {encoded}").parse().unwrap(),
        );

        let request = TokenRequest {
            client_id: Some("other".to_string()),
            client_secret: Some("other".to_string()),
            ..TokenRequest::default()
        };

        let (id, secret) = extract_client_credentials(&headers, &request).unwrap();
        assert_eq!(id, "web-app");
        assert_eq!(secret, "s3cret");
    }

    #[test]
    fn body_credentials_used_without_header() {
        let request = TokenRequest {
            client_id: Some("web-app".to_string()),
            client_secret: Some("s3cret".to_string()),
            ..TokenRequest::default()
        };

        let (id, secret) = extract_client_credentials(&HeaderMap::new(), &request).unwrap();
        assert_eq!(id, "web-app");
        assert_eq!(secret, "s3cret");
    }

    #[test]
    fn missing_credentials_are_invalid_client() {
        let err = extract_client_credentials(&HeaderMap::new(), &TokenRequest::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_client");
    }

    #[test]
    fn body_parsing_accepts_both_encodings() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        let parsed = parse_body(&headers, br#"{"grant_type":"refresh_token"}"#).unwrap();
        assert_eq!(parsed.grant_type.as_deref(), Some("refresh_token"));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        let parsed = parse_body(&headers, b"grant_type=authorization_code&code=abc").unwrap();
        assert_eq!(parsed.code.as_deref(), Some("abc"));
    }

    #[test]
    fn pkce_mismatch_is_invalid_grant() {
        let challenge = Some("a".repeat(43));
        let request = TokenRequest {
            code_verifier: Some("b".repeat(43)),
            ..TokenRequest::default()
        };
        let err = check_pkce(&challenge, None, &request).unwrap_err();
        assert_eq!(err.error_code(), "invalid_grant");
    }

    #[test]
    fn pkce_missing_verifier_is_invalid_request() {
        let challenge = Some("a".repeat(43));
        let err = check_pkce(&challenge, None, &TokenRequest::default()).unwrap_err();
        assert_eq!(err.error_code(), "invalid_request");
    }
}
