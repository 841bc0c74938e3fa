//! RS256 token signing and verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::claims::{AccessTokenClaims, IdTokenClaims};
use crate::error::{JwtError, JwtResult};
use crate::keys::KeyMaterial;

/// Signs and verifies RS256 tokens with a single key.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    issuer: String,
    key: KeyMaterial,
}

impl TokenSigner {
    /// Creates a signer for the given issuer and key.
    #[must_use]
    pub fn new(issuer: impl Into<String>, key: KeyMaterial) -> Self {
        Self {
            issuer: issuer.into(),
            key,
        }
    }

    /// Returns the configured issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the signing key.
    #[must_use]
    pub const fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Signs an access token.
    ///
    /// ## Errors
    ///
    /// Returns `JwtError::Signing` if encoding fails.
    pub fn sign_access_token(&self, claims: &AccessTokenClaims) -> JwtResult<String> {
        self.sign(claims)
    }

    /// Signs an ID token.
    ///
    /// ## Errors
    ///
    /// Returns `JwtError::Signing` if encoding fails.
    pub fn sign_id_token(&self, claims: &IdTokenClaims) -> JwtResult<String> {
        self.sign(claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> JwtResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.kid.clone());
        header.typ = Some("JWT".to_string());

        encode(&header, claims, self.key.encoding_key())
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Verifies an access token's signature, expiry, and issuer.
    ///
    /// ## Errors
    ///
    /// Returns `JwtError::InvalidSignature`, `JwtError::Expired`,
    /// `JwtError::IssuerMismatch`, or `JwtError::InvalidToken` depending on
    /// what fails.
    pub fn verify_access_token(&self, token: &str) -> JwtResult<AccessTokenClaims> {
        self.verify(token)
    }

    /// Verifies an ID token's signature, expiry, and issuer.
    ///
    /// ## Errors
    ///
    /// Same failure modes as [`Self::verify_access_token`].
    pub fn verify_id_token(&self, token: &str) -> JwtResult<IdTokenClaims> {
        self.verify(token)
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> JwtResult<T> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;

        let data = decode::<T>(token, self.key.decoding_key(), &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidIssuer => JwtError::IssuerMismatch,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}
