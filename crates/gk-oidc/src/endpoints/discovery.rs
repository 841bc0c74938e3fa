//! Discovery and JWKS handlers.

use axum::extract::State;
use axum::Json;
use gk_jwt::JsonWebKeySet;

use super::OidcState;
use crate::discovery::ProviderMetadata;

/// `GET /.well-known/openid-configuration`
pub async fn openid_configuration(State(state): State<OidcState>) -> Json<ProviderMetadata> {
    Json(ProviderMetadata::for_issuer(state.issuer.signer().issuer()))
}

/// `GET /.well-known/jwks.json`
pub async fn jwks(State(state): State<OidcState>) -> Json<JsonWebKeySet> {
    Json(JsonWebKeySet::from_key(state.issuer.signer().key()))
}
