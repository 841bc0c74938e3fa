//! Consent decision endpoint.
//!
//! Receives the form posted from the consent page. The parameters are
//! re-validated from scratch; the page's hidden fields are attacker
//! controllable like any other request input.

use axum::extract::{Form, State};
use axum::response::Response;
use tracing::info;

use super::authorize::{approve, lookup_user, validate};
use super::{error_page, redirect_with_params, OidcState};
use crate::error::{OidcError, OidcResult};
use crate::request::{AuthorizationRequest, ConsentRequest};

/// `POST /oauth/consent`
pub async fn handle(
    State(state): State<OidcState>,
    headers: axum::http::HeaderMap,
    Form(request): Form<ConsentRequest>,
) -> Response {
    let Some(principal) = state.current_principal(&headers).await else {
        return error_page(&OidcError::AccessDenied("not logged in".to_string()));
    };

    match decide(&state, &principal, request).await {
        Ok(response) => response,
        Err(e) => error_page(&e),
    }
}

async fn decide(
    state: &OidcState,
    principal: &gk_session::SessionPrincipal,
    request: ConsentRequest,
) -> OidcResult<Response> {
    let validated = validate(state, principal.tenant_id, &as_authorization_request(&request)).await?;

    if !request.approved {
        info!(client_id = %validated.client.client_id, "consent denied");
        let mut params = vec![("error", "access_denied")];
        if let Some(s) = validated.state.as_deref() {
            params.push(("state", s));
        }
        // The redirect URI itself validated, so a denial may use it.
        return Ok(redirect_with_params(&validated.redirect_uri, &params));
    }

    let user = lookup_user(state, principal).await?;

    let consent = gk_model::UserConsent::new(user.id, &validated.client.client_id, &validated.scope);
    state.repos.consents.upsert(&consent).await?;
    info!(
        client_id = %validated.client.client_id,
        user_id = %user.id,
        scope = %validated.scope,
        "consent granted"
    );

    approve(state, &user, &validated).await
}

fn as_authorization_request(request: &ConsentRequest) -> AuthorizationRequest {
    AuthorizationRequest {
        response_type: Some("code".to_string()),
        client_id: Some(request.client_id.clone()),
        redirect_uri: Some(request.redirect_uri.clone()),
        scope: Some(request.scope.clone()),
        state: request.state.clone(),
        nonce: request.nonce.clone(),
        code_challenge: request.code_challenge.clone(),
        code_challenge_method: request.code_challenge_method.clone(),
    }
}
