//! Tenant domain model.
//!
//! Tenants partition every other entity. A tenant is identified by the
//! domain part of its users' email addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization served by this authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier.
    pub id: Uuid,
    /// Email domain owned by this tenant (unique, lowercase).
    pub domain: String,
    /// Display name.
    pub name: String,
    /// Whether the tenant is active. Inactive tenants reject all logins.
    pub is_active: bool,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Creates a new active tenant for the given domain.
    #[must_use]
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            domain: domain.into().to_lowercase(),
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Sets whether the tenant is active.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}
