//! UserInfo endpoint (OpenID Connect Core 1.0 Section 5.3).
//!
//! Bearer-only. A structurally valid JWT is additionally checked against
//! its server-side revocation row, so logout takes effect immediately.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use gk_model::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{error_response, OidcState};
use crate::error::{OidcError, OidcResult};

/// UserInfo response body. Claims follow the granted scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    /// Subject, the user's ID.
    pub sub: String,

    /// Tenant the subject belongs to.
    pub tenant_id: Uuid,

    /// Email address (`email` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Email verification status (`email` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Display name (`profile` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Profile picture URL (`profile` scope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// `GET /oauth/userinfo`
pub async fn handle(State(state): State<OidcState>, headers: HeaderMap) -> Response {
    match userinfo(&state, &headers).await {
        Ok(body) => axum::Json(body).into_response(),
        Err(e) => {
            let response = error_response(&e);
            if response.status() == StatusCode::UNAUTHORIZED {
                // RFC 6750 requires the challenge header on 401s.
                ([(header::WWW_AUTHENTICATE, "Bearer")], response).into_response()
            } else {
                response
            }
        }
    }
}

async fn userinfo(state: &OidcState, headers: &HeaderMap) -> OidcResult<UserInfoResponse> {
    let token = bearer_token(headers)?;

    let claims = state
        .issuer
        .signer()
        .verify_access_token(token)
        .map_err(|e| OidcError::InvalidToken(e.to_string()))?;

    state
        .repos
        .access_tokens
        .get(&claims.jti)
        .await?
        .filter(gk_model::AccessToken::is_live)
        .ok_or_else(|| OidcError::InvalidToken("token has been revoked".to_string()))?;

    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| OidcError::InvalidToken("malformed subject".to_string()))?;
    let user = state
        .repos
        .users
        .get_by_id(claims.tenant_id, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| OidcError::InvalidToken("user account is not active".to_string()))?;

    Ok(build_response(&user, &claims.scope))
}

fn bearer_token(headers: &HeaderMap) -> OidcResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| OidcError::InvalidToken("missing bearer token".to_string()))
}

fn build_response(user: &User, scope: &str) -> UserInfoResponse {
    let has = |s: &str| scope.split_whitespace().any(|granted| granted == s);

    UserInfoResponse {
        sub: user.id.to_string(),
        tenant_id: user.tenant_id,
        email: has("email").then(|| user.email.clone()),
        email_verified: has("email").then_some(user.email_verified),
        name: has("profile").then(|| user.name.clone()),
        picture: if has("profile") { user.picture.clone() } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(Uuid::now_v7(), "jane@acme.com", "Jane Doe", "hash")
    }

    #[test]
    fn claims_follow_scope() {
        let user = user();

        let full = build_response(&user, "openid profile email");
        assert_eq!(full.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(full.name.as_deref(), Some("Jane Doe"));

        let bare = build_response(&user, "openid");
        assert_eq!(bare.sub, user.id.to_string());
        assert_eq!(bare.tenant_id, user.tenant_id);
        assert!(bare.email.is_none());
        assert!(bare.email_verified.is_none());
        assert!(bare.name.is_none());
        assert!(bare.picture.is_none());

        // sub and tenant_id do not depend on the openid scope
        let profile_only = build_response(&user, "profile");
        assert_eq!(profile_only.sub, user.id.to_string());
        assert_eq!(profile_only.tenant_id, user.tenant_id);
        assert_eq!(profile_only.name.as_deref(), Some("Jane Doe"));
        assert!(profile_only.email.is_none());
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }
}
