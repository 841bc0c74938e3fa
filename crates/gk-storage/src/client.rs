//! OAuth client storage provider trait.

use async_trait::async_trait;
use gk_model::OAuthClient;

use crate::error::StorageResult;

/// Provider for OAuth client storage operations.
///
/// The `client_id` is the public identifier clients present on the wire and
/// is unique across all tenants.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Creates a new client.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the `client_id` is taken.
    async fn create(&self, client: &OAuthClient) -> StorageResult<()>;

    /// Updates an existing client.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the client doesn't exist.
    async fn update(&self, client: &OAuthClient) -> StorageResult<()>;

    /// Gets a client by its public `client_id`.
    async fn get_by_client_id(&self, client_id: &str) -> StorageResult<Option<OAuthClient>>;
}
