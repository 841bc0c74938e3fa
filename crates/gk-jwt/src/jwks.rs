//! JSON Web Key Set document (RFC 7517).

use serde::{Deserialize, Serialize};

use crate::keys::KeyMaterial;

/// JSON Web Key Set, returned by the JWKS endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Array of JSON Web Keys.
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Builds the key set for a single signing key.
    #[must_use]
    pub fn from_key(key: &KeyMaterial) -> Self {
        Self {
            keys: vec![JsonWebKey::rsa_public(key)],
        }
    }
}

/// A single RSA public key in JWK form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type, always "RSA".
    pub kty: String,

    /// Public key use, always "sig".
    #[serde(rename = "use")]
    pub key_use: String,

    /// Algorithm, always "RS256".
    pub alg: String,

    /// Key ID.
    pub kid: String,

    /// RSA modulus, base64url without padding.
    pub n: String,

    /// RSA public exponent, base64url without padding.
    pub e: String,
}

impl JsonWebKey {
    /// Builds the public JWK for a signing key.
    #[must_use]
    pub fn rsa_public(key: &KeyMaterial) -> Self {
        Self {
            kty: "RSA".to_string(),
            key_use: "sig".to_string(),
            alg: "RS256".to_string(),
            kid: key.kid.clone(),
            n: key.modulus().to_string(),
            e: key.exponent().to_string(),
        }
    }
}
