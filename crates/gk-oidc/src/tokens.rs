//! Token issuance service.
//!
//! Mints the artifacts the token endpoint hands out: RS256 access tokens
//! with a revocation row keyed by `jti`, opaque refresh tokens, and ID
//! tokens when the grant carries the `openid` scope.

use std::sync::Arc;

use chrono::{Duration, Utc};
use gk_core::TokenTtlConfig;
use gk_crypto::{generate_auth_code, generate_opaque_token, CodeChallengeMethod};
use gk_jwt::{AccessTokenClaims, IdTokenClaims, TokenSigner};
use gk_model::{AccessToken, AuthorizationCode, RefreshToken, User};
use gk_storage::Repositories;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{OidcError, OidcResult};

/// Attempts before giving up on an opaque token collision.
const MAX_MINT_ATTEMPTS: u32 = 5;

/// Refresh token length in random bytes.
const REFRESH_TOKEN_BYTES: usize = 32;

/// ID token lifetime in seconds, not tied to the access-token TTL.
const ID_TOKEN_TTL_SECS: i64 = 3600;

/// Token endpoint success response (RFC 6749 Section 5.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token JWT.
    pub access_token: String,

    /// Always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Opaque refresh token. Absent on the refresh grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token, present when the grant carries the `openid` scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scopes.
    pub scope: String,
}

/// Mints authorization codes and token responses.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    repos: Repositories,
    signer: Arc<TokenSigner>,
    ttl: TokenTtlConfig,
}

impl TokenIssuer {
    /// Creates an issuer over the given signer and lifetimes.
    #[must_use]
    pub fn new(repos: Repositories, signer: Arc<TokenSigner>, ttl: TokenTtlConfig) -> Self {
        Self { repos, signer, ttl }
    }

    /// Returns the token signer.
    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Mints and stores a single-use authorization code.
    ///
    /// Regenerates the opaque value on a collision, up to
    /// [`MAX_MINT_ATTEMPTS`] times.
    ///
    /// ## Errors
    ///
    /// Returns `OidcError::ServerError` if storage keeps colliding or fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn issue_code(
        &self,
        user_id: Uuid,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        nonce: Option<String>,
        code_challenge: Option<String>,
        code_challenge_method: Option<CodeChallengeMethod>,
    ) -> OidcResult<String> {
        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let value = generate_auth_code();
            let code = AuthorizationCode::new(
                value.clone(),
                client_id,
                user_id,
                redirect_uri,
                scope,
                self.ttl.authorization_code,
            )
            .with_nonce(nonce.clone())
            .with_pkce(code_challenge.clone(), code_challenge_method);

            match self.repos.auth_codes.create(&code).await {
                Ok(()) => return Ok(value),
                Err(e) if e.is_duplicate() => {
                    warn!(attempt, "authorization code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(OidcError::ServerError(
            "authorization code generation kept colliding".to_string(),
        ))
    }

    /// Builds the token response for a grant.
    ///
    /// The refresh token is only minted for the authorization code grant;
    /// the refresh grant reuses its existing token.
    ///
    /// ## Errors
    ///
    /// Returns `OidcError::ServerError` on signing or storage failure.
    pub async fn issue(
        &self,
        user: &User,
        client_id: &str,
        scope: &str,
        nonce: Option<&str>,
        include_refresh: bool,
    ) -> OidcResult<TokenResponse> {
        let access_expires = Utc::now() + Duration::seconds(self.ttl.access_token);
        let claims = AccessTokenClaims::new(
            self.signer.issuer(),
            user.id,
            client_id,
            user.tenant_id,
            scope,
            access_expires,
        )
        .with_profile(&user.email, &user.name, &user.role)
        .with_custom_roles(user.custom_roles.clone());

        let access_token = self
            .signer
            .sign_access_token(&claims)
            .map_err(|e| OidcError::ServerError(e.to_string()))?;

        let row = AccessToken::new(
            claims.jti.clone(),
            client_id,
            user.id,
            scope,
            self.ttl.access_token,
        );
        self.repos.access_tokens.create(&row).await?;

        let refresh_token = if include_refresh {
            Some(self.mint_refresh_token(user.id, client_id, scope).await?)
        } else {
            None
        };

        let id_token = if claims.has_scope("openid") {
            let id_expires = Utc::now() + Duration::seconds(ID_TOKEN_TTL_SECS);
            let id_claims = IdTokenClaims::new(self.signer.issuer(), user.id, client_id, id_expires)
                .with_nonce(nonce.map(ToString::to_string))
                .with_profile(
                    &user.email,
                    user.email_verified,
                    &user.name,
                    user.picture.clone(),
                );
            Some(
                self.signer
                    .sign_id_token(&id_claims)
                    .map_err(|e| OidcError::ServerError(e.to_string()))?,
            )
        } else {
            None
        };

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl.access_token,
            refresh_token,
            id_token,
            scope: scope.to_string(),
        })
    }

    async fn mint_refresh_token(
        &self,
        user_id: Uuid,
        client_id: &str,
        scope: &str,
    ) -> OidcResult<String> {
        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let value = generate_opaque_token(REFRESH_TOKEN_BYTES);
            let token =
                RefreshToken::new(value.clone(), client_id, user_id, scope, self.ttl.refresh_token);

            match self.repos.refresh_tokens.create(&token).await {
                Ok(()) => return Ok(value),
                Err(e) if e.is_duplicate() => {
                    warn!(attempt, "refresh token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(OidcError::ServerError(
            "refresh token generation kept colliding".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use gk_jwt::KeyMaterial;

    use super::*;
    use crate::test_util::TEST_RSA_PEM;

    fn issuer(repos: Repositories) -> TokenIssuer {
        let key = KeyMaterial::from_pkcs8_pem("signing-key-1", TEST_RSA_PEM).unwrap();
        let signer = Arc::new(TokenSigner::new("https://auth.example.com", key));
        TokenIssuer::new(repos, signer, TokenTtlConfig::default())
    }

    fn user() -> User {
        User::new(Uuid::now_v7(), "jane@acme.com", "Jane Doe", "hash")
    }

    #[tokio::test]
    async fn issue_with_openid_scope_carries_id_token() {
        let repos = Repositories::in_memory();
        let issuer = issuer(repos.clone());
        let user = user();

        let response = issuer
            .issue(&user, "web-app", "openid profile", Some("n-1"), true)
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert!(response.id_token.is_some());
        assert!(response.refresh_token.is_some());

        // The jti row is live in storage
        let claims = issuer.signer().verify_access_token(&response.access_token).unwrap();
        let row = repos.access_tokens.get(&claims.jti).await.unwrap().unwrap();
        assert!(row.is_live());
    }

    #[tokio::test]
    async fn id_token_lifetime_is_fixed_one_hour() {
        let repos = Repositories::in_memory();
        let key = KeyMaterial::from_pkcs8_pem("signing-key-1", TEST_RSA_PEM).unwrap();
        let signer = Arc::new(TokenSigner::new("https://auth.example.com", key));
        let ttl = TokenTtlConfig {
            access_token: 120,
            ..TokenTtlConfig::default()
        };
        let issuer = TokenIssuer::new(repos, signer, ttl);

        let response = issuer
            .issue(&user(), "web-app", "openid", None, false)
            .await
            .unwrap();

        assert_eq!(response.expires_in, 120);
        let id_claims = issuer
            .signer()
            .verify_id_token(&response.id_token.unwrap())
            .unwrap();
        assert_eq!(id_claims.exp - id_claims.iat, 3600);
    }

    #[tokio::test]
    async fn issue_without_openid_scope_omits_id_token() {
        let issuer = issuer(Repositories::in_memory());

        let response = issuer
            .issue(&user(), "web-app", "profile", None, false)
            .await
            .unwrap();

        assert!(response.id_token.is_none());
        assert!(response.refresh_token.is_none());

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("id_token"));
    }

    #[tokio::test]
    async fn issued_code_is_stored() {
        let repos = Repositories::in_memory();
        let issuer = issuer(repos.clone());
        let user_id = Uuid::now_v7();

        let code = issuer
            .issue_code(
                user_id,
                "web-app",
                "https://app.example.com/callback",
                "openid",
                None,
                None,
                None,
            )
            .await
            .unwrap();

        let stored = repos.auth_codes.consume(&code).await.unwrap().unwrap();
        assert_eq!(stored.user_id, user_id);
        assert!(!stored.is_expired());
    }
}
