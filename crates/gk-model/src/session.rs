//! Browser session and trusted device records.

use chrono::{DateTime, Duration, Utc};
use gk_crypto::sha256_hex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side record of a browser session.
///
/// The authoritative principal travels in the encrypted session cookie; this
/// row exists so logout can destroy the session out-of-band and so expiry
/// cleanup has something to sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token (also sealed inside the cookie).
    pub session_token: String,
    /// User the session belongs to.
    pub user_id: Uuid,
    /// Tenant of the user.
    pub tenant_id: Uuid,
    /// When the session expires.
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Creates a new session with the given lifetime in seconds.
    #[must_use]
    pub fn new(session_token: impl Into<String>, user_id: Uuid, tenant_id: Uuid, ttl_seconds: i64) -> Self {
        Self {
            session_token: session_token.into(),
            user_id,
            tenant_id,
            expires: Utc::now() + Duration::seconds(ttl_seconds),
        }
    }

    /// Checks if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires
    }
}

/// A device trusted to skip the MFA challenge.
///
/// The device is identified by a hash over the user agent and client IP;
/// every successful use slides the expiry forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaTrustedDevice {
    /// User who trusted the device.
    pub user_id: Uuid,
    /// `sha256(user_agent + "-" + ip)`, lowercase hex.
    pub device_identifier: String,
    /// When the trust expires.
    pub expires_at: DateTime<Utc>,
}

/// Trust lifetime in days.
pub const TRUSTED_DEVICE_TTL_DAYS: i64 = 30;

impl MfaTrustedDevice {
    /// Creates a trust record for the device described by `user_agent` and `ip`.
    #[must_use]
    pub fn new(user_id: Uuid, user_agent: &str, ip: &str) -> Self {
        Self {
            user_id,
            device_identifier: Self::identifier(user_agent, ip),
            expires_at: Utc::now() + Duration::days(TRUSTED_DEVICE_TTL_DAYS),
        }
    }

    /// Computes the device identifier for a user agent and IP pair.
    #[must_use]
    pub fn identifier(user_agent: &str, ip: &str) -> String {
        sha256_hex(format!("{user_agent}-{ip}").as_bytes())
    }

    /// Checks if the trust has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Slides the expiry forward by the full trust lifetime.
    pub fn touch(&mut self) {
        self.expires_at = Utc::now() + Duration::days(TRUSTED_DEVICE_TTL_DAYS);
    }
}
