//! Encrypted, authenticated session cookies.
//!
//! The cookie value is AES-256-GCM over a JSON principal, keyed by the
//! SHA-256 of the configured session secret. A random 96-bit nonce is
//! prepended to the ciphertext and the whole thing is base64url encoded.
//! Any tamper fails the tag check and the cookie is treated as absent.

use aws_lc_rs::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use gk_crypto::{random_bytes, sha256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

/// The principal sealed inside the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPrincipal {
    /// Opaque token of the server-side session row.
    pub session_token: String,
    /// Authenticated user.
    pub user_id: Uuid,
    /// Tenant of the user.
    pub tenant_id: Uuid,
    /// User's email.
    pub email: String,
    /// User's display name.
    pub name: String,
    /// User's primary role.
    pub role: String,
    /// Login marker.
    pub is_logged_in: bool,
}

/// Seals and opens session cookie values.
#[derive(Clone)]
pub struct CookieCodec {
    key: [u8; 32],
}

impl std::fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCodec")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl CookieCodec {
    /// Derives the cookie key from the configured session secret.
    #[must_use]
    pub fn new(session_secret: &str) -> Self {
        let mut key = [0u8; 32];
        key.copy_from_slice(&sha256(session_secret.as_bytes()));
        Self { key }
    }

    fn sealing_key(&self) -> SessionResult<LessSafeKey> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| SessionError::Internal("cookie key setup failed".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }

    /// Encrypts a principal into a cookie value.
    ///
    /// ## Errors
    ///
    /// Returns `SessionError::Internal` if encryption fails.
    pub fn seal(&self, principal: &SessionPrincipal) -> SessionResult<String> {
        let key = self.sealing_key()?;

        let nonce_bytes = random_bytes(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(&nonce_bytes)
            .map_err(|_| SessionError::Internal("nonce setup failed".to_string()))?;

        let mut in_out = serde_json::to_vec(principal)
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| SessionError::Internal("cookie encryption failed".to_string()))?;

        let mut value = Vec::with_capacity(NONCE_LEN + in_out.len());
        value.extend_from_slice(&nonce_bytes);
        value.extend_from_slice(&in_out);
        Ok(URL_SAFE_NO_PAD.encode(value))
    }

    /// Decrypts a cookie value back into a principal.
    ///
    /// ## Errors
    ///
    /// Returns `SessionError::InvalidCookie` if the value is malformed,
    /// fails authentication, or doesn't deserialize.
    pub fn open(&self, value: &str) -> SessionResult<SessionPrincipal> {
        let raw = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|_| SessionError::InvalidCookie)?;
        if raw.len() <= NONCE_LEN {
            return Err(SessionError::InvalidCookie);
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| SessionError::InvalidCookie)?;

        let key = self.sealing_key()?;
        let mut buf = ciphertext.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut buf)
            .map_err(|_| SessionError::InvalidCookie)?;

        serde_json::from_slice(plaintext).map_err(|_| SessionError::InvalidCookie)
    }
}
