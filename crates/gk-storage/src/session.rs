//! Session and trusted device storage provider traits.

use async_trait::async_trait;
use gk_model::{MfaTrustedDevice, Session};
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for browser session storage.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Stores a new session.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the session token already exists.
    async fn create(&self, session: &Session) -> StorageResult<()>;

    /// Gets a session by its token.
    async fn get(&self, session_token: &str) -> StorageResult<Option<Session>>;

    /// Deletes a session by its token.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFoundByKey` if no such session exists.
    async fn delete(&self, session_token: &str) -> StorageResult<()>;

    /// Removes expired sessions, returning how many were deleted.
    async fn remove_expired(&self) -> StorageResult<u64>;
}

/// Provider for MFA trusted device records.
#[async_trait]
pub trait TrustedDeviceProvider: Send + Sync {
    /// Inserts or replaces the trust record for `(user, device)`.
    async fn upsert(&self, device: &MfaTrustedDevice) -> StorageResult<()>;

    /// Gets the trust record for a `(user, device)` pair, if any.
    async fn get(
        &self,
        user_id: Uuid,
        device_identifier: &str,
    ) -> StorageResult<Option<MfaTrustedDevice>>;

    /// Removes expired trust records, returning how many were deleted.
    async fn remove_expired(&self) -> StorageResult<u64>;
}
