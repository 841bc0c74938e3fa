//! Tenant storage provider trait.

use async_trait::async_trait;
use gk_model::Tenant;
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for tenant storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait TenantProvider: Send + Sync {
    /// Creates a new tenant.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if a tenant with the same domain exists.
    async fn create(&self, tenant: &Tenant) -> StorageResult<()>;

    /// Updates an existing tenant.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the tenant doesn't exist.
    async fn update(&self, tenant: &Tenant) -> StorageResult<()>;

    /// Gets a tenant by ID.
    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Tenant>>;

    /// Gets a tenant by its email domain. Domains are stored lowercase.
    async fn get_by_domain(&self, domain: &str) -> StorageResult<Option<Tenant>>;
}
