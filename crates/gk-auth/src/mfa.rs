//! TOTP enrollment, verification, backup codes, and trusted devices.

use gk_crypto::{generate_backup_code, random_bytes};
use gk_model::{MfaTrustedDevice, User};
use gk_storage::Repositories;
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::info;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Raw TOTP secret length in bytes.
pub const TOTP_SECRET_BYTES: usize = 20;

/// Number of backup codes issued at enrollment.
pub const BACKUP_CODE_COUNT: usize = 10;

/// Everything the user needs to enroll an authenticator app.
#[derive(Debug, Clone)]
pub struct MfaSetup {
    /// Base32-encoded TOTP secret for manual entry.
    pub secret: String,
    /// otpauth:// provisioning URI.
    pub otpauth_uri: String,
    /// QR code of the URI as a base64 PNG.
    pub qr_png_base64: String,
    /// Single-use backup codes, shown exactly once.
    pub backup_codes: Vec<String>,
}

/// TOTP and trusted device engine.
#[derive(Debug, Clone)]
pub struct MfaEngine {
    repos: Repositories,
    issuer: String,
}

impl MfaEngine {
    /// Creates an engine that labels provisioning URIs with `issuer`.
    #[must_use]
    pub fn new(repos: Repositories, issuer: impl Into<String>) -> Self {
        Self {
            repos,
            issuer: issuer.into(),
        }
    }

    pub(crate) fn totp(&self, encoded_secret: &str, account: &str) -> AuthResult<TOTP> {
        let secret = Secret::Encoded(encoded_secret.to_string())
            .to_bytes()
            .map_err(|e| AuthError::Internal(format!("stored TOTP secret unusable: {e:?}")))?;
        // 6 digits, 30 second step, one step of clock skew either way
        TOTP::new(
            Algorithm::SHA1,
            6,
            1,
            30,
            secret,
            Some(self.issuer.clone()),
            account.to_string(),
        )
        .map_err(|e| AuthError::Internal(format!("TOTP construction failed: {e}")))
    }

    fn check_totp(&self, encoded_secret: &str, account: &str, code: &str) -> AuthResult<()> {
        let totp = self.totp(encoded_secret, account)?;
        let ok = totp
            .check_current(code)
            .map_err(|e| AuthError::Internal(format!("system clock error: {e}")))?;
        if ok {
            Ok(())
        } else {
            Err(AuthError::InvalidCode)
        }
    }

    /// Starts enrollment: mints a fresh secret and the backup codes, stores
    /// both unconfirmed, and returns the provisioning material. The backup
    /// codes are shown exactly once, here.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::AlreadyEnabled` if MFA is already active.
    pub async fn begin_setup(&self, user: &mut User) -> AuthResult<MfaSetup> {
        if user.mfa_enabled {
            return Err(AuthError::AlreadyEnabled);
        }

        let encoded = Secret::Raw(random_bytes(TOTP_SECRET_BYTES))
            .to_encoded()
            .to_string();
        let totp = self.totp(&encoded, &user.email)?;
        let otpauth_uri = totp.get_url();
        let qr_png_base64 = totp
            .get_qr_base64()
            .map_err(|e| AuthError::Internal(format!("QR encoding failed: {e}")))?;

        let backup_codes: Vec<String> =
            (0..BACKUP_CODE_COUNT).map(|_| generate_backup_code()).collect();

        user.mfa_secret = Some(encoded.clone());
        user.mfa_backup_codes = backup_codes.clone();
        user.touch();
        self.repos.users.update(user).await?;

        Ok(MfaSetup {
            secret: encoded,
            otpauth_uri,
            qr_png_base64,
            backup_codes,
        })
    }

    /// Confirms enrollment with a code from the authenticator. Until this
    /// succeeds the pending secret and backup codes are inert.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::NotEnabled` if enrollment was never started,
    /// `AuthError::AlreadyEnabled` if MFA is already active, and
    /// `AuthError::InvalidCode` for a wrong code.
    pub async fn complete_setup(&self, user: &mut User, code: &str) -> AuthResult<()> {
        if user.mfa_enabled {
            return Err(AuthError::AlreadyEnabled);
        }
        let secret = user.mfa_secret.clone().ok_or(AuthError::NotEnabled)?;
        self.check_totp(&secret, &user.email, code)?;

        user.mfa_enabled = true;
        user.require_mfa_setup = false;
        user.touch();
        self.repos.users.update(user).await?;

        info!(user_id = %user.id, "MFA enabled");
        Ok(())
    }

    /// Verifies a login challenge code. Backup codes are tried first; a
    /// matching backup code is consumed and never works again. Anything
    /// that isn't a stored backup code is checked as a TOTP value.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::NotEnabled` if MFA is off and
    /// `AuthError::InvalidCode` when neither check passes.
    pub async fn verify_code(&self, user: &mut User, code: &str) -> AuthResult<()> {
        if !user.mfa_enabled {
            return Err(AuthError::NotEnabled);
        }

        let normalized = code.trim().to_uppercase();
        if let Some(pos) = user.mfa_backup_codes.iter().position(|c| *c == normalized) {
            user.mfa_backup_codes.remove(pos);
            user.touch();
            self.repos.users.update(user).await?;
            info!(user_id = %user.id, remaining = user.mfa_backup_codes.len(), "backup code used");
            return Ok(());
        }

        let secret = user
            .mfa_secret
            .clone()
            .ok_or_else(|| AuthError::Internal("MFA enabled without a secret".to_string()))?;
        self.check_totp(&secret, &user.email, code.trim())
    }

    /// Disables MFA after verifying a current code, wiping the secret and
    /// any unused backup codes.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::NotEnabled` if MFA is off and
    /// `AuthError::InvalidCode` for a wrong code.
    pub async fn disable(&self, user: &mut User, code: &str) -> AuthResult<()> {
        self.verify_code(user, code).await?;

        user.mfa_enabled = false;
        user.mfa_secret = None;
        user.mfa_backup_codes.clear();
        user.touch();
        self.repos.users.update(user).await?;

        info!(user_id = %user.id, "MFA disabled");
        Ok(())
    }

    /// Marks the device described by `user_agent` and `ip` as trusted,
    /// letting it skip the MFA challenge until the trust expires.
    ///
    /// ## Errors
    ///
    /// Returns storage errors from the upsert.
    pub async fn trust_device(&self, user_id: Uuid, user_agent: &str, ip: &str) -> AuthResult<()> {
        let device = MfaTrustedDevice::new(user_id, user_agent, ip);
        self.repos.trusted_devices.upsert(&device).await?;
        Ok(())
    }

    /// Checks whether the device is trusted. A live trust record slides its
    /// expiry forward on every hit.
    ///
    /// ## Errors
    ///
    /// Returns storage errors from the lookup.
    pub async fn is_trusted(&self, user_id: Uuid, user_agent: &str, ip: &str) -> AuthResult<bool> {
        let identifier = MfaTrustedDevice::identifier(user_agent, ip);
        let Some(mut device) = self.repos.trusted_devices.get(user_id, &identifier).await? else {
            return Ok(false);
        };
        if device.is_expired() {
            return Ok(false);
        }

        device.touch();
        self.repos.trusted_devices.upsert(&device).await?;
        Ok(true)
    }
}
