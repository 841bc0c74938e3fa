//! Token storage provider traits.
//!
//! Three artifact stores back the token lifecycle: single-use authorization
//! codes, access token revocation rows keyed by JWT `jti`, and opaque
//! refresh tokens.

use async_trait::async_trait;
use gk_model::{AccessToken, AuthorizationCode, RefreshToken, UserConsent};
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for authorization code storage.
#[async_trait]
pub trait AuthorizationCodeProvider: Send + Sync {
    /// Stores a new authorization code.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the code value already exists.
    /// Callers regenerate the opaque value and retry.
    async fn create(&self, code: &AuthorizationCode) -> StorageResult<()>;

    /// Atomically redeems a code: returns the record and marks it used in a
    /// single step, so exactly one of any concurrent redeemers wins.
    ///
    /// Returns `None` if the code is unknown or already used. Expiry is the
    /// caller's check; a returned record may be expired.
    async fn consume(&self, code: &str) -> StorageResult<Option<AuthorizationCode>>;

    /// Removes expired codes, returning how many were deleted.
    async fn remove_expired(&self) -> StorageResult<u64>;
}

/// Provider for access token revocation rows.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Stores a new access token row.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` on a `jti` collision.
    async fn create(&self, token: &AccessToken) -> StorageResult<()>;

    /// Gets a token row by its JWT `jti`.
    async fn get(&self, jti: &str) -> StorageResult<Option<AccessToken>>;

    /// Marks every token belonging to a user as revoked, returning how many
    /// rows were touched.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> StorageResult<u64>;

    /// Removes expired rows, returning how many were deleted.
    async fn remove_expired(&self) -> StorageResult<u64>;
}

/// Provider for refresh token storage.
#[async_trait]
pub trait RefreshTokenProvider: Send + Sync {
    /// Stores a new refresh token.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the token value already exists.
    /// Callers regenerate the opaque value and retry.
    async fn create(&self, token: &RefreshToken) -> StorageResult<()>;

    /// Gets a refresh token by its opaque value.
    async fn get(&self, token: &str) -> StorageResult<Option<RefreshToken>>;

    /// Marks every token belonging to a user as revoked, returning how many
    /// rows were touched.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> StorageResult<u64>;

    /// Removes expired tokens, returning how many were deleted.
    async fn remove_expired(&self) -> StorageResult<u64>;
}

/// Provider for recorded user consents.
#[async_trait]
pub trait UserConsentProvider: Send + Sync {
    /// Inserts or replaces the consent for the `(user, client)` pair.
    async fn upsert(&self, consent: &UserConsent) -> StorageResult<()>;

    /// Gets the consent for a `(user, client)` pair, if any.
    async fn get(&self, user_id: Uuid, client_id: &str) -> StorageResult<Option<UserConsent>>;
}
