//! User domain model.
//!
//! Users belong to exactly one tenant; the pair `(email, tenant_id)` is
//! unique. Lookups that cross that boundary are a bug, so the storage layer
//! only exposes tenant-scoped queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permissions granted for a specific client within a custom role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPermission {
    /// OAuth `client_id` the permissions apply to.
    pub client_id: String,
    /// Permission names.
    pub permissions: Vec<String>,
}

/// A named role with per-client permission grants.
///
/// Custom roles are serialized into the `custom_roles` token claim when a
/// user has any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRole {
    /// Unique identifier.
    pub id: Uuid,
    /// Role name.
    pub name: String,
    /// Per-client permission grants.
    pub permissions: Vec<ClientPermission>,
}

impl CustomRole {
    /// Creates a new custom role.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    /// Adds a client permission grant.
    #[must_use]
    pub fn with_client_permissions(
        mut self,
        client_id: impl Into<String>,
        permissions: Vec<String>,
    ) -> Self {
        self.permissions.push(ClientPermission {
            client_id: client_id.into(),
            permissions,
        });
        self
    }
}

/// An end-user identity within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    // === Identity ===
    /// Unique identifier.
    pub id: Uuid,
    /// Tenant this user belongs to.
    pub tenant_id: Uuid,
    /// Email address (unique within the tenant).
    pub email: String,
    /// Whether the email has been verified.
    pub email_verified: bool,

    // === Profile ===
    /// Display name.
    pub name: String,
    /// Coarse role label (e.g. "user", "admin").
    pub role: String,
    /// Profile picture URL.
    pub picture: Option<String>,

    // === Credentials ===
    /// PHC-formatted password hash.
    pub password_hash: String,

    // === Account state ===
    /// Whether the account is active. Inactive users cannot log in.
    pub is_active: bool,
    /// Forces a password change on next login.
    pub require_password_change: bool,
    /// Forces MFA enrollment on next login.
    pub require_mfa_setup: bool,

    // === MFA ===
    /// Whether TOTP MFA is enabled.
    pub mfa_enabled: bool,
    /// Base32-encoded TOTP secret (set while enrolled or pending).
    pub mfa_secret: Option<String>,
    /// Unused backup codes (uppercase hex, consumed on use).
    pub mfa_backup_codes: Vec<String>,

    // === Authorization ===
    /// Custom role grants.
    pub custom_roles: Vec<CustomRole>,

    // === Timestamps ===
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user.
    #[must_use]
    pub fn new(
        tenant_id: Uuid,
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            email: email.into().to_lowercase(),
            email_verified: false,
            name: name.into(),
            role: "user".to_string(),
            picture: None,
            password_hash: password_hash.into(),
            is_active: true,
            require_password_change: false,
            require_mfa_setup: false,
            mfa_enabled: false,
            mfa_secret: None,
            mfa_backup_codes: Vec::new(),
            custom_roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the role label.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Sets whether the account is active.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Requires a password change at next login.
    #[must_use]
    pub const fn with_password_change_required(mut self) -> Self {
        self.require_password_change = true;
        self
    }

    /// Requires MFA enrollment at next login.
    #[must_use]
    pub const fn with_mfa_setup_required(mut self) -> Self {
        self.require_mfa_setup = true;
        self
    }

    /// Adds a custom role grant.
    #[must_use]
    pub fn with_custom_role(mut self, role: CustomRole) -> Self {
        self.custom_roles.push(role);
        self
    }

    /// Marks the user as updated now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased() {
        let user = User::new(Uuid::now_v7(), "Alice@Acme.Test", "Alice", "$argon2id$x");
        assert_eq!(user.email, "alice@acme.test");
        assert!(user.is_active);
        assert!(!user.mfa_enabled);
    }

    #[test]
    fn custom_role_serializes_with_permissions() {
        let role = CustomRole::new("billing-admin")
            .with_client_permissions("billing-app", vec!["read".to_string(), "write".to_string()]);

        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("\"name\":\"billing-admin\""));
        assert!(json.contains("\"client_id\":\"billing-app\""));
    }
}
