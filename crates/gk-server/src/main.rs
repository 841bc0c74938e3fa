//! Gatekey server entry point.

#![forbid(unsafe_code)]
#![deny(warnings)]

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = gk_server::load_config()?;
    tracing::info!(issuer = %config.server.issuer, "Gatekey starting");

    gk_server::Server::new(config)?.run().await
}
