//! In-memory provider implementations.
//!
//! Each store is a `tokio::sync::RwLock` over a `HashMap`. Single-use
//! semantics (authorization code redemption) hold the write lock across the
//! check-and-mark so concurrent redeemers serialize.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use gk_model::{
    AccessToken, AuthorizationCode, MfaTrustedDevice, OAuthClient, PendingLogin, RefreshToken,
    Session, Tenant, User, UserConsent,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::ClientProvider;
use crate::error::{StorageError, StorageResult};
use crate::login::PendingLoginProvider;
use crate::session::{SessionProvider, TrustedDeviceProvider};
use crate::tenant::TenantProvider;
use crate::token::{
    AccessTokenProvider, AuthorizationCodeProvider, RefreshTokenProvider, UserConsentProvider,
};
use crate::user::UserProvider;

/// In-memory tenant store.
#[derive(Debug, Default)]
pub struct InMemoryTenantStore {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
}

impl InMemoryTenantStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantProvider for InMemoryTenantStore {
    async fn create(&self, tenant: &Tenant) -> StorageResult<()> {
        let mut tenants = self.tenants.write().await;
        if tenants
            .values()
            .any(|t| t.domain.eq_ignore_ascii_case(&tenant.domain))
        {
            return Err(StorageError::duplicate("Tenant", "domain", &tenant.domain));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(())
    }

    async fn update(&self, tenant: &Tenant) -> StorageResult<()> {
        let mut tenants = self.tenants.write().await;
        match tenants.get_mut(&tenant.id) {
            Some(existing) => {
                *existing = tenant.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("Tenant", tenant.id)),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Tenant>> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn get_by_domain(&self, domain: &str) -> StorageResult<Option<Tenant>> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|t| t.domain.eq_ignore_ascii_case(domain))
            .cloned())
    }
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserProvider for InMemoryUserStore {
    async fn create(&self, user: &User) -> StorageResult<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.tenant_id == user.tenant_id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StorageError::duplicate("User", "email", &user.email));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("User", user.id)),
        }
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> StorageResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .get(&id)
            .filter(|u| u.tenant_id == tenant_id)
            .cloned())
    }

    async fn get_by_email(&self, tenant_id: Uuid, email: &str) -> StorageResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.tenant_id == tenant_id && u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

/// In-memory OAuth client store, keyed by public `client_id`.
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    clients: RwLock<HashMap<String, OAuthClient>>,
}

impl InMemoryClientStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientProvider for InMemoryClientStore {
    async fn create(&self, client: &OAuthClient) -> StorageResult<()> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(StorageError::duplicate(
                "OAuthClient",
                "client_id",
                &client.client_id,
            ));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn update(&self, client: &OAuthClient) -> StorageResult<()> {
        let mut clients = self.clients.write().await;
        match clients.get_mut(&client.client_id) {
            Some(existing) => {
                *existing = client.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("OAuthClient", client.id)),
        }
    }

    async fn get_by_client_id(&self, client_id: &str) -> StorageResult<Option<OAuthClient>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }
}

/// In-memory authorization code store.
#[derive(Debug, Default)]
pub struct InMemoryAuthCodeStore {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl InMemoryAuthCodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationCodeProvider for InMemoryAuthCodeStore {
    async fn create(&self, code: &AuthorizationCode) -> StorageResult<()> {
        let mut codes = self.codes.write().await;
        if codes.contains_key(&code.code) {
            return Err(StorageError::duplicate("AuthorizationCode", "code", &code.code));
        }
        codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn consume(&self, code: &str) -> StorageResult<Option<AuthorizationCode>> {
        // The write lock spans the check and the mark: one winner per code.
        let mut codes = self.codes.write().await;
        match codes.get_mut(code) {
            Some(stored) if !stored.used => {
                stored.used = true;
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn remove_expired(&self) -> StorageResult<u64> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        let now = Utc::now();
        codes.retain(|_, c| c.expires_at >= now);
        Ok((before - codes.len()) as u64)
    }
}

/// In-memory access token revocation store, keyed by JWT `jti`.
#[derive(Debug, Default)]
pub struct InMemoryAccessTokenStore {
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl InMemoryAccessTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenProvider for InMemoryAccessTokenStore {
    async fn create(&self, token: &AccessToken) -> StorageResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(StorageError::duplicate("AccessToken", "jti", &token.token));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get(&self, jti: &str) -> StorageResult<Option<AccessToken>> {
        Ok(self.tokens.read().await.get(jti).cloned())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> StorageResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.revoked {
                token.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn remove_expired(&self) -> StorageResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        let now = Utc::now();
        tokens.retain(|_, t| t.expires_at >= now);
        Ok((before - tokens.len()) as u64)
    }
}

/// In-memory refresh token store.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenProvider for InMemoryRefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> StorageResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(StorageError::duplicate("RefreshToken", "token", &token.token));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> StorageResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> StorageResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.revoked {
                token.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn remove_expired(&self) -> StorageResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        let now = Utc::now();
        tokens.retain(|_, t| t.expires_at >= now);
        Ok((before - tokens.len()) as u64)
    }
}

/// In-memory user consent store, keyed by `(user_id, client_id)`.
#[derive(Debug, Default)]
pub struct InMemoryConsentStore {
    consents: RwLock<HashMap<(Uuid, String), UserConsent>>,
}

impl InMemoryConsentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserConsentProvider for InMemoryConsentStore {
    async fn upsert(&self, consent: &UserConsent) -> StorageResult<()> {
        let mut consents = self.consents.write().await;
        consents.insert(
            (consent.user_id, consent.client_id.clone()),
            consent.clone(),
        );
        Ok(())
    }

    async fn get(&self, user_id: Uuid, client_id: &str) -> StorageResult<Option<UserConsent>> {
        let consents = self.consents.read().await;
        Ok(consents.get(&(user_id, client_id.to_string())).cloned())
    }
}

/// In-memory browser session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionStore {
    async fn create(&self, session: &Session) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.session_token) {
            return Err(StorageError::duplicate(
                "Session",
                "session_token",
                &session.session_token,
            ));
        }
        sessions.insert(session.session_token.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, session_token: &str) -> StorageResult<Option<Session>> {
        Ok(self.sessions.read().await.get(session_token).cloned())
    }

    async fn delete(&self, session_token: &str) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(session_token) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found_by_key("Session", session_token)),
        }
    }

    async fn remove_expired(&self) -> StorageResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, s| s.expires >= now);
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory trusted device store, keyed by `(user_id, device_identifier)`.
#[derive(Debug, Default)]
pub struct InMemoryTrustedDeviceStore {
    devices: RwLock<HashMap<(Uuid, String), MfaTrustedDevice>>,
}

impl InMemoryTrustedDeviceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrustedDeviceProvider for InMemoryTrustedDeviceStore {
    async fn upsert(&self, device: &MfaTrustedDevice) -> StorageResult<()> {
        let mut devices = self.devices.write().await;
        devices.insert(
            (device.user_id, device.device_identifier.clone()),
            device.clone(),
        );
        Ok(())
    }

    async fn get(
        &self,
        user_id: Uuid,
        device_identifier: &str,
    ) -> StorageResult<Option<MfaTrustedDevice>> {
        let devices = self.devices.read().await;
        Ok(devices
            .get(&(user_id, device_identifier.to_string()))
            .cloned())
    }

    async fn remove_expired(&self) -> StorageResult<u64> {
        let mut devices = self.devices.write().await;
        let before = devices.len();
        let now = Utc::now();
        devices.retain(|_, d| d.expires_at >= now);
        Ok((before - devices.len()) as u64)
    }
}

/// In-memory pending login store.
#[derive(Debug, Default)]
pub struct InMemoryPendingLoginStore {
    pending: RwLock<HashMap<String, PendingLogin>>,
}

impl InMemoryPendingLoginStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingLoginProvider for InMemoryPendingLoginStore {
    async fn create(&self, pending: &PendingLogin) -> StorageResult<()> {
        let mut records = self.pending.write().await;
        if records.contains_key(&pending.flow_token) {
            return Err(StorageError::duplicate(
                "PendingLogin",
                "flow_token",
                &pending.flow_token,
            ));
        }
        records.insert(pending.flow_token.clone(), pending.clone());
        Ok(())
    }

    async fn get(&self, flow_token: &str) -> StorageResult<Option<PendingLogin>> {
        Ok(self.pending.read().await.get(flow_token).cloned())
    }

    async fn delete(&self, flow_token: &str) -> StorageResult<()> {
        self.pending.write().await.remove(flow_token);
        Ok(())
    }

    async fn remove_expired(&self) -> StorageResult<u64> {
        let mut records = self.pending.write().await;
        let before = records.len();
        let now = Utc::now();
        records.retain(|_, p| p.expires_at >= now);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn sample_code(value: &str) -> AuthorizationCode {
        AuthorizationCode::new(
            value,
            "web-app",
            Uuid::now_v7(),
            "https://app.example.com/callback",
            "openid profile",
            600,
        )
    }

    #[tokio::test]
    async fn code_consume_is_single_use() {
        let store = InMemoryAuthCodeStore::new();
        store.create(&sample_code("code-1")).await.unwrap();

        let first = store.consume("code-1").await.unwrap();
        assert!(first.is_some());

        let second = store.consume("code-1").await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn concurrent_consume_has_one_winner() {
        let store = Arc::new(InMemoryAuthCodeStore::new());
        store.create(&sample_code("code-race")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.consume("code-race").await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn duplicate_code_value_is_rejected() {
        let store = InMemoryAuthCodeStore::new();
        store.create(&sample_code("dup")).await.unwrap();

        let err = store.create(&sample_code("dup")).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn revoke_all_for_user_touches_only_that_user() {
        let store = InMemoryRefreshTokenStore::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        store
            .create(&RefreshToken::new("rt-a1", "web-app", alice, "openid", 3600))
            .await
            .unwrap();
        store
            .create(&RefreshToken::new("rt-a2", "web-app", alice, "openid", 3600))
            .await
            .unwrap();
        store
            .create(&RefreshToken::new("rt-b1", "web-app", bob, "openid", 3600))
            .await
            .unwrap();

        let revoked = store.revoke_all_for_user(alice).await.unwrap();
        assert_eq!(revoked, 2);

        assert!(!store.get("rt-a1").await.unwrap().unwrap().is_live());
        assert!(store.get("rt-b1").await.unwrap().unwrap().is_live());

        // Re-running hits nothing new.
        assert_eq!(store.revoke_all_for_user(alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_expired_is_idempotent() {
        let store = InMemoryAuthCodeStore::new();
        store
            .create(&AuthorizationCode::new(
                "old",
                "web-app",
                Uuid::now_v7(),
                "uri",
                "openid",
                -10,
            ))
            .await
            .unwrap();
        store.create(&sample_code("fresh")).await.unwrap();

        assert_eq!(store.remove_expired().await.unwrap(), 1);
        assert_eq!(store.remove_expired().await.unwrap(), 0);
        assert!(store.consume("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn consent_upsert_replaces_scope() {
        let store = InMemoryConsentStore::new();
        let user_id = Uuid::now_v7();

        store
            .upsert(&UserConsent::new(user_id, "web-app", "openid"))
            .await
            .unwrap();
        store
            .upsert(&UserConsent::new(user_id, "web-app", "openid profile email"))
            .await
            .unwrap();

        let stored = store.get(user_id, "web-app").await.unwrap().unwrap();
        assert_eq!(stored.scope, "openid profile email");
    }

    #[tokio::test]
    async fn user_email_lookup_is_tenant_scoped() {
        let store = InMemoryUserStore::new();
        let tenant_a = Uuid::now_v7();
        let tenant_b = Uuid::now_v7();

        let user = User::new(tenant_a, "jane@acme.com", "Jane", "hash");
        store.create(&user).await.unwrap();

        assert!(store
            .get_by_email(tenant_a, "jane@acme.com")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_by_email(tenant_b, "jane@acme.com")
            .await
            .unwrap()
            .is_none());
    }
}
