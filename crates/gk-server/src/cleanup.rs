//! Periodic expired-credential cleanup.

use std::time::Duration;

use gk_storage::Repositories;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawns the background task that sweeps expired rows.
///
/// Every pass deletes expired authorization codes, access and refresh
/// tokens, sessions, trusted devices, and pending logins. Each sweep is
/// idempotent, so an overlapping or failed pass is harmless.
pub fn spawn_cleanup(repos: Repositories, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            sweep(&repos).await;
        }
    })
}

async fn sweep(repos: &Repositories) {
    let mut removed = 0u64;

    for (name, result) in [
        ("authorization codes", repos.auth_codes.remove_expired().await),
        ("access tokens", repos.access_tokens.remove_expired().await),
        ("refresh tokens", repos.refresh_tokens.remove_expired().await),
        ("sessions", repos.sessions.remove_expired().await),
        ("trusted devices", repos.trusted_devices.remove_expired().await),
        ("pending logins", repos.pending_logins.remove_expired().await),
    ] {
        match result {
            Ok(count) => removed += count,
            Err(e) => warn!(store = name, error = %e, "cleanup pass failed"),
        }
    }

    if removed > 0 {
        debug!(removed, "expired credentials removed");
    }
}

#[cfg(test)]
mod tests {
    use gk_model::Session;
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn sweep_removes_expired_sessions() {
        let repos = Repositories::in_memory();
        let expired = Session::new("tok-1", Uuid::now_v7(), Uuid::now_v7(), -60);
        repos.sessions.create(&expired).await.unwrap();

        sweep(&repos).await;

        assert!(repos.sessions.get("tok-1").await.unwrap().is_none());
    }
}
