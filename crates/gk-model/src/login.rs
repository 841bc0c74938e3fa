//! Pending login flow records.
//!
//! A multi-step login (password change, MFA setup, MFA challenge) holds its
//! intermediate state server-side. The client only ever carries the opaque
//! `flow_token`; every step validates it against this record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a pending login in seconds.
pub const PENDING_LOGIN_TTL_SECS: i64 = 300;

/// Where a multi-step login currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStage {
    /// Password verified; a compliant new password is required.
    PasswordChange,
    /// Password verified; MFA enrollment is required.
    MfaSetup,
    /// Password verified; a TOTP or backup code is required.
    Mfa,
}

/// Server-side state for a login that needs more steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    /// Opaque correlation token handed to the client.
    pub flow_token: String,
    /// User being logged in.
    pub user_id: Uuid,
    /// Tenant of the user.
    pub tenant_id: Uuid,
    /// Current stage.
    pub stage: LoginStage,
    /// When this record expires.
    pub expires_at: DateTime<Utc>,
}

impl PendingLogin {
    /// Creates a pending login at the given stage.
    #[must_use]
    pub fn new(
        flow_token: impl Into<String>,
        user_id: Uuid,
        tenant_id: Uuid,
        stage: LoginStage,
    ) -> Self {
        Self {
            flow_token: flow_token.into(),
            user_id,
            tenant_id,
            stage,
            expires_at: Utc::now() + Duration::seconds(PENDING_LOGIN_TTL_SECS),
        }
    }

    /// Checks if the record has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_not_expired() {
        let pending = PendingLogin::new("tok", Uuid::now_v7(), Uuid::now_v7(), LoginStage::Mfa);
        assert!(!pending.is_expired());
        assert_eq!(pending.stage, LoginStage::Mfa);
    }

    #[test]
    fn stage_serialization() {
        assert_eq!(
            serde_json::to_string(&LoginStage::PasswordChange).unwrap(),
            "\"password_change\""
        );
        assert_eq!(serde_json::to_string(&LoginStage::Mfa).unwrap(), "\"mfa\"");
    }
}
