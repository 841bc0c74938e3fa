//! RSA key material for token signing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;

use crate::error::{JwtError, JwtResult};

/// A loaded RSA signing key.
///
/// Built once at startup from the configured PKCS#8 PEM and handed out
/// behind an `Arc`. The public modulus and exponent are kept in base64url
/// form for the JWKS document.
#[derive(Clone)]
pub struct KeyMaterial {
    /// Key ID published in the JWKS and in every token header.
    pub kid: String,

    /// Private key for signing.
    encoding_key: EncodingKey,

    /// Public key for verification.
    decoding_key: DecodingKey,

    /// RSA modulus, base64url without padding.
    n: String,

    /// RSA public exponent, base64url without padding.
    e: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("kid", &self.kid)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Loads key material from a PKCS#8 PEM-encoded RSA private key.
    ///
    /// ## Errors
    ///
    /// Returns `JwtError::Key` if the PEM cannot be parsed as an RSA
    /// private key.
    pub fn from_pkcs8_pem(kid: impl Into<String>, pem: &str) -> JwtResult<Self> {
        let private_key =
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| JwtError::Key(e.to_string()))?;
        let public_key = private_key.to_public_key();

        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        let encoding_key =
            EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| JwtError::Key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| JwtError::Key(e.to_string()))?;

        Ok(Self {
            kid: kid.into(),
            encoding_key,
            decoding_key,
            n,
            e,
        })
    }

    /// Returns the private key handle for signing.
    #[must_use]
    pub const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the public key handle for verification.
    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns the RSA modulus, base64url without padding.
    #[must_use]
    pub fn modulus(&self) -> &str {
        &self.n
    }

    /// Returns the RSA public exponent, base64url without padding.
    #[must_use]
    pub fn exponent(&self) -> &str {
        &self.e
    }
}
