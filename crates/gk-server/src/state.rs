//! Shared application state.

use std::sync::Arc;

use gk_auth::{LoginFlow, MfaEngine};
use gk_core::{Config, EmailNotifier};
use gk_jwt::{KeyMaterial, TokenSigner};
use gk_oidc::{OidcState, TokenIssuer};
use gk_session::{CookieCodec, SessionManager};
use gk_storage::Repositories;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Entity stores.
    pub repos: Repositories,

    /// Browser session manager.
    pub sessions: SessionManager,

    /// Login state machine.
    pub login: LoginFlow,

    /// TOTP and trusted device engine.
    pub mfa: MfaEngine,

    /// Outbound email notifications.
    pub notifier: Arc<dyn EmailNotifier>,

    /// Protocol endpoint state.
    pub oidc: OidcState,
}

impl AppState {
    /// Wires the full service graph over the given repositories.
    ///
    /// ## Errors
    ///
    /// Fails when the configured signing key PEM cannot be parsed.
    pub fn new(
        config: Config,
        repos: Repositories,
        notifier: Arc<dyn EmailNotifier>,
    ) -> anyhow::Result<Self> {
        let key = KeyMaterial::from_pkcs8_pem(&config.signing_key_id, &config.signing_key_pem)?;
        let signer = Arc::new(TokenSigner::new(&config.server.issuer, key));
        let issuer = TokenIssuer::new(repos.clone(), signer, config.ttl.clone());

        let codec = CookieCodec::new(&config.session_secret);
        let sessions = SessionManager::new(repos.clone(), codec, config.cookie.max_age);

        let mfa = MfaEngine::new(repos.clone(), "Gatekey");
        let login = LoginFlow::new(repos.clone(), mfa.clone());

        let oidc = OidcState {
            repos: repos.clone(),
            sessions: sessions.clone(),
            issuer,
            cookie_name: config.cookie.name.clone(),
        };

        Ok(Self {
            config: Arc::new(config),
            repos,
            sessions,
            login,
            mfa,
            notifier,
            oidc,
        })
    }
}
