//! Aggregate handle over every storage provider.

use std::sync::Arc;

use crate::client::ClientProvider;
use crate::login::PendingLoginProvider;
use crate::memory::{
    InMemoryAccessTokenStore, InMemoryAuthCodeStore, InMemoryClientStore, InMemoryConsentStore,
    InMemoryPendingLoginStore, InMemoryRefreshTokenStore, InMemorySessionStore,
    InMemoryTenantStore, InMemoryTrustedDeviceStore, InMemoryUserStore,
};
use crate::session::{SessionProvider, TrustedDeviceProvider};
use crate::tenant::TenantProvider;
use crate::token::{
    AccessTokenProvider, AuthorizationCodeProvider, RefreshTokenProvider, UserConsentProvider,
};
use crate::user::UserProvider;

/// One handle per entity store, shared across services and handlers.
#[derive(Clone)]
pub struct Repositories {
    /// Tenant store.
    pub tenants: Arc<dyn TenantProvider>,
    /// User store.
    pub users: Arc<dyn UserProvider>,
    /// OAuth client store.
    pub clients: Arc<dyn ClientProvider>,
    /// Authorization code store.
    pub auth_codes: Arc<dyn AuthorizationCodeProvider>,
    /// Access token revocation store.
    pub access_tokens: Arc<dyn AccessTokenProvider>,
    /// Refresh token store.
    pub refresh_tokens: Arc<dyn RefreshTokenProvider>,
    /// User consent store.
    pub consents: Arc<dyn UserConsentProvider>,
    /// Browser session store.
    pub sessions: Arc<dyn SessionProvider>,
    /// MFA trusted device store.
    pub trusted_devices: Arc<dyn TrustedDeviceProvider>,
    /// Pending login store.
    pub pending_logins: Arc<dyn PendingLoginProvider>,
}

impl Repositories {
    /// Creates a set of repositories backed entirely by in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            tenants: Arc::new(InMemoryTenantStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            clients: Arc::new(InMemoryClientStore::new()),
            auth_codes: Arc::new(InMemoryAuthCodeStore::new()),
            access_tokens: Arc::new(InMemoryAccessTokenStore::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenStore::new()),
            consents: Arc::new(InMemoryConsentStore::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            trusted_devices: Arc::new(InMemoryTrustedDeviceStore::new()),
            pending_logins: Arc::new(InMemoryPendingLoginStore::new()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
