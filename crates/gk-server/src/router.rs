//! Router configuration.

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gk_oidc::endpoints::{authorize, consent, discovery, token, userinfo};

use crate::auth;
use crate::state::AppState;

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let oidc = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(discovery::openid_configuration),
        )
        .route("/.well-known/jwks.json", get(discovery::jwks))
        .route("/oauth/authorize", get(authorize::handle))
        .route("/oauth/consent", post(consent::handle))
        .route("/oauth/token", post(token::handle))
        .route("/oauth/userinfo", get(userinfo::handle))
        .with_state(state.oidc.clone());

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/change-password", post(auth::change_password))
        .route(
            "/auth/mfa/setup",
            post(auth::mfa_begin_setup)
                .patch(auth::mfa_complete_setup)
                .delete(auth::mfa_disable),
        )
        .route("/auth/mfa/verify-login", post(auth::mfa_verify_login))
        .route("/auth/logout", post(auth::logout))
        .with_state(state);

    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(oidc)
        .merge(auth_routes)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe.
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_is_healthy() {
        let response = health_check().await;
        assert_eq!(response.0.status, "healthy");
    }
}
