//! User storage provider trait.

use async_trait::async_trait;
use gk_model::User;
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for user storage operations.
///
/// All lookups are scoped to a tenant; a user is unique by `(tenant_id, email)`.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Creates a new user.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if a user with the same email
    /// exists in the tenant.
    async fn create(&self, user: &User) -> StorageResult<()>;

    /// Updates an existing user.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the user doesn't exist.
    async fn update(&self, user: &User) -> StorageResult<()>;

    /// Gets a user by ID within a tenant.
    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> StorageResult<Option<User>>;

    /// Gets a user by email within a tenant.
    async fn get_by_email(&self, tenant_id: Uuid, email: &str) -> StorageResult<Option<User>>;
}
