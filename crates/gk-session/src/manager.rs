//! Session lifecycle: login, cookie authentication, logout.

use gk_crypto::generate_session_token;
use gk_model::{Session, User};
use gk_storage::Repositories;
use tracing::{info, warn};

use crate::cookie::{CookieCodec, SessionPrincipal};
use crate::error::{SessionError, SessionResult};

/// Creates, authenticates, and destroys browser sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    repos: Repositories,
    codec: CookieCodec,
    session_ttl_secs: i64,
}

impl SessionManager {
    /// Creates a session manager.
    #[must_use]
    pub fn new(repos: Repositories, codec: CookieCodec, session_ttl_secs: i64) -> Self {
        Self {
            repos,
            codec,
            session_ttl_secs,
        }
    }

    /// Establishes a session for a fully authenticated user and returns the
    /// sealed cookie value.
    ///
    /// ## Errors
    ///
    /// Returns a storage error if the session row cannot be persisted or an
    /// internal error if the cookie cannot be sealed.
    pub async fn establish(&self, user: &User) -> SessionResult<String> {
        let session_token = generate_session_token();
        let session = Session::new(
            session_token.clone(),
            user.id,
            user.tenant_id,
            self.session_ttl_secs,
        );
        self.repos.sessions.create(&session).await?;

        let principal = SessionPrincipal {
            session_token,
            user_id: user.id,
            tenant_id: user.tenant_id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            is_logged_in: true,
        };

        info!(user_id = %user.id, tenant_id = %user.tenant_id, "session established");
        self.codec.seal(&principal)
    }

    /// Resolves a cookie value to its live principal.
    ///
    /// ## Errors
    ///
    /// Returns `SessionError::InvalidCookie` for undecryptable values and
    /// `SessionError::NotAuthenticated` when no live server-side session
    /// backs the cookie.
    pub async fn authenticate(&self, cookie_value: &str) -> SessionResult<SessionPrincipal> {
        let principal = self.codec.open(cookie_value)?;
        if !principal.is_logged_in {
            return Err(SessionError::NotAuthenticated);
        }

        let session = self
            .repos
            .sessions
            .get(&principal.session_token)
            .await?
            .ok_or(SessionError::NotAuthenticated)?;
        if session.is_expired() {
            return Err(SessionError::NotAuthenticated);
        }

        Ok(principal)
    }

    /// Destroys the session and revokes every token the user holds.
    ///
    /// The revocation sweep is part of logout: a failure here propagates so
    /// the caller can refuse to report a clean logout.
    ///
    /// ## Errors
    ///
    /// Returns `SessionError::InvalidCookie` for undecryptable values and
    /// storage errors from the revocation sweep.
    pub async fn logout(&self, cookie_value: &str) -> SessionResult<()> {
        let principal = self.codec.open(cookie_value)?;

        // A missing row means the session already ended; revocation still runs.
        match self.repos.sessions.delete(&principal.session_token).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(user_id = %principal.user_id, "logout for already-removed session");
            }
            Err(e) => return Err(e.into()),
        }

        let access = self
            .repos
            .access_tokens
            .revoke_all_for_user(principal.user_id)
            .await?;
        let refresh = self
            .repos
            .refresh_tokens
            .revoke_all_for_user(principal.user_id)
            .await?;

        info!(
            user_id = %principal.user_id,
            access_revoked = access,
            refresh_revoked = refresh,
            "logout complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gk_model::{AccessToken, RefreshToken};
    use uuid::Uuid;

    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(
            Repositories::in_memory(),
            CookieCodec::new("test-session-secret"),
            604_800,
        )
    }

    fn user() -> User {
        User::new(Uuid::now_v7(), "jane@acme.com", "Jane Doe", "hash")
    }

    #[tokio::test]
    async fn establish_then_authenticate() {
        let manager = manager();
        let user = user();

        let cookie = manager.establish(&user).await.unwrap();
        let principal = manager.authenticate(&cookie).await.unwrap();

        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.email, "jane@acme.com");
    }

    #[tokio::test]
    async fn logout_revokes_all_tokens() {
        let manager = manager();
        let user = user();
        let cookie = manager.establish(&user).await.unwrap();

        manager
            .repos
            .access_tokens
            .create(&AccessToken::new("jti-1", "web-app", user.id, "openid", 3600))
            .await
            .unwrap();
        manager
            .repos
            .refresh_tokens
            .create(&RefreshToken::new("rt-1", "web-app", user.id, "openid", 3600))
            .await
            .unwrap();

        manager.logout(&cookie).await.unwrap();

        assert!(!manager
            .repos
            .access_tokens
            .get("jti-1")
            .await
            .unwrap()
            .unwrap()
            .is_live());
        assert!(!manager
            .repos
            .refresh_tokens
            .get("rt-1")
            .await
            .unwrap()
            .unwrap()
            .is_live());
        assert!(matches!(
            manager.authenticate(&cookie).await,
            Err(SessionError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn double_logout_is_tolerated() {
        let manager = manager();
        let cookie = manager.establish(&user()).await.unwrap();

        manager.logout(&cookie).await.unwrap();
        manager.logout(&cookie).await.unwrap();
    }

    #[tokio::test]
    async fn forged_cookie_is_rejected() {
        let manager = manager();
        assert!(matches!(
            manager.authenticate("AAAAAAAA").await,
            Err(SessionError::InvalidCookie)
        ));
    }
}
