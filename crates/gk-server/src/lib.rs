//! # gk-server
//!
//! The Gatekey HTTP server: OAuth 2.0 / OIDC protocol endpoints, browser
//! authentication handlers, health checks, and the periodic cleanup task,
//! wired over in-memory repositories.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod router;
pub mod state;

pub use config::load_config;
pub use router::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use gk_core::{Config, LoggingEmailNotifier};
use gk_storage::Repositories;
use tokio::net::TcpListener;

/// The Gatekey server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Creates a server instance over fresh in-memory repositories.
    ///
    /// ## Errors
    ///
    /// Fails when the configured signing key cannot be parsed.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let repos = Repositories::in_memory();
        let state = AppState::new(config, repos, Arc::new(LoggingEmailNotifier))?;
        Ok(Self { state })
    }

    /// Runs the server until a shutdown signal arrives.
    ///
    /// ## Errors
    ///
    /// Fails when the listen address cannot be bound.
    pub async fn run(self) -> anyhow::Result<()> {
        cleanup::spawn_cleanup(
            self.state.repos.clone(),
            self.state.config.cleanup_interval_secs,
        );

        let addr: SocketAddr = format!(
            "{}:{}",
            self.state.config.server.host, self.state.config.server.port
        )
        .parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(issuer = %self.state.config.server.issuer, "listening on http://{addr}");

        let app = create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("shutdown complete");
        Ok(())
    }

    /// Returns the application state, for tests that drive handlers
    /// directly.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
