//! Pending login flow storage provider trait.

use async_trait::async_trait;
use gk_model::PendingLogin;

use crate::error::StorageResult;

/// Provider for server-side pending login state.
///
/// Records stay in place across failed MFA attempts within their lifetime;
/// completing or abandoning the flow deletes them.
#[async_trait]
pub trait PendingLoginProvider: Send + Sync {
    /// Stores a new pending login.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the flow token already exists.
    async fn create(&self, pending: &PendingLogin) -> StorageResult<()>;

    /// Gets a pending login by its flow token.
    async fn get(&self, flow_token: &str) -> StorageResult<Option<PendingLogin>>;

    /// Deletes a pending login by its flow token. Deleting a missing record
    /// is not an error.
    async fn delete(&self, flow_token: &str) -> StorageResult<()>;

    /// Removes expired records, returning how many were deleted.
    async fn remove_expired(&self) -> StorageResult<u64>;
}
