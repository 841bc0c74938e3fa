//! Authorization endpoint (RFC 6749 Section 4.1.1).
//!
//! Validation failures render an HTML error page rather than redirecting,
//! so the code never leaves the server through an unverified URI.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use gk_model::{OAuthClient, User};
use gk_session::SessionPrincipal;
use tracing::info;
use uuid::Uuid;

use super::{error_page, html_escape, redirect_with_params, OidcState};
use crate::error::{OidcError, OidcResult};
use crate::request::AuthorizationRequest;
use crate::types::{CodeChallengeMethod, ResponseType};

/// A fully validated authorization request.
pub(super) struct ValidatedRequest {
    pub(super) client: OAuthClient,
    pub(super) redirect_uri: String,
    pub(super) scope: String,
    pub(super) state: Option<String>,
    pub(super) nonce: Option<String>,
    pub(super) code_challenge: Option<String>,
    pub(super) code_challenge_method: Option<CodeChallengeMethod>,
}

/// `GET /oauth/authorize`
pub async fn handle(
    State(state): State<OidcState>,
    headers: axum::http::HeaderMap,
    Query(request): Query<AuthorizationRequest>,
) -> Response {
    // Required parameters first, before anything touches storage.
    if let Err(e) = check_required_params(&request) {
        return error_page(&e);
    }

    // No session: send the user to the login page with the request intact
    // so the browser comes back here afterwards.
    let Some(principal) = state.current_principal(&headers).await else {
        return login_redirect(&request);
    };

    match authorize(&state, &principal, request).await {
        Ok(response) => response,
        Err(e) => error_page(&e),
    }
}

async fn authorize(
    state: &OidcState,
    principal: &SessionPrincipal,
    request: AuthorizationRequest,
) -> OidcResult<Response> {
    let validated = validate(state, principal.tenant_id, &request).await?;
    let user = lookup_user(state, principal).await?;

    // Skip the consent page when a prior grant already covers every
    // requested scope.
    let existing = state
        .repos
        .consents
        .get(user.id, &validated.client.client_id)
        .await?;
    if existing.is_some_and(|c| c.covers(validated.scope.split_whitespace())) {
        info!(
            client_id = %validated.client.client_id,
            user_id = %user.id,
            "consent already granted, issuing code"
        );
        return approve(state, &user, &validated).await;
    }

    Ok(consent_page(&validated).into_response())
}

fn check_required_params(request: &AuthorizationRequest) -> OidcResult<()> {
    for (value, name) in [
        (&request.client_id, "client_id"),
        (&request.redirect_uri, "redirect_uri"),
        (&request.response_type, "response_type"),
    ] {
        if value.as_deref().is_none_or(str::is_empty) {
            return Err(OidcError::InvalidRequest(format!("missing {name}")));
        }
    }
    Ok(())
}

pub(super) async fn validate(
    state: &OidcState,
    tenant_id: Uuid,
    request: &AuthorizationRequest,
) -> OidcResult<ValidatedRequest> {
    let client_id = request.client_id.as_deref().unwrap_or_default();
    let redirect_uri = request.redirect_uri.as_deref().unwrap_or_default();

    // Clients are tenant-scoped; a session from another tenant must not
    // resolve this client at all.
    let client = state
        .repos
        .clients
        .get_by_client_id(client_id)
        .await?
        .filter(|c| c.is_active && c.tenant_id == tenant_id)
        .ok_or_else(|| OidcError::InvalidClient(format!("unknown client: {client_id}")))?;

    if !client.has_redirect_uri(redirect_uri) {
        return Err(OidcError::InvalidRequest(
            "redirect_uri is not registered for this client".to_string(),
        ));
    }

    let response_type = request.response_type.as_deref().unwrap_or_default();
    response_type
        .parse::<ResponseType>()
        .map_err(OidcError::UnsupportedResponseType)?;

    // An absent scope parameter falls back to the standard profile set.
    let mut scopes = request.scopes();
    if scopes.is_empty() {
        scopes = vec!["openid", "profile", "email"];
    }
    if !client.allows_scopes(scopes.iter().copied()) {
        return Err(OidcError::InvalidScope(
            "requested scope exceeds the client's allowed scopes".to_string(),
        ));
    }

    let code_challenge_method = parse_pkce(request)?;

    Ok(ValidatedRequest {
        client,
        redirect_uri: redirect_uri.to_string(),
        scope: scopes.join(" "),
        state: request.state.clone(),
        nonce: request.nonce.clone(),
        code_challenge: request.code_challenge.clone(),
        code_challenge_method,
    })
}

/// Validates the PKCE parameters (RFC 7636 Section 4.3).
///
/// A challenge without a method defaults to `plain`; a method without a
/// challenge is malformed.
fn parse_pkce(request: &AuthorizationRequest) -> OidcResult<Option<CodeChallengeMethod>> {
    match (&request.code_challenge, &request.code_challenge_method) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(OidcError::InvalidRequest(
            "code_challenge_method without code_challenge".to_string(),
        )),
        (Some(_), None) => Ok(Some(CodeChallengeMethod::Plain)),
        (Some(_), Some(method)) => method
            .parse::<CodeChallengeMethod>()
            .map(Some)
            .map_err(|_| {
                OidcError::InvalidRequest(format!("unknown code_challenge_method: {method}"))
            }),
    }
}

pub(super) async fn lookup_user(
    state: &OidcState,
    principal: &SessionPrincipal,
) -> OidcResult<User> {
    state
        .repos
        .users
        .get_by_id(principal.tenant_id, principal.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| OidcError::AccessDenied("account is not active".to_string()))
}

/// Issues the code and redirects back to the client.
pub(super) async fn approve(
    state: &OidcState,
    user: &User,
    request: &ValidatedRequest,
) -> OidcResult<Response> {
    let code = state
        .issuer
        .issue_code(
            user.id,
            &request.client.client_id,
            &request.redirect_uri,
            &request.scope,
            request.nonce.clone(),
            request.code_challenge.clone(),
            request.code_challenge_method,
        )
        .await?;

    let mut params = vec![("code", code.as_str())];
    if let Some(s) = request.state.as_deref() {
        params.push(("state", s));
    }
    Ok(redirect_with_params(&request.redirect_uri, &params))
}

fn login_redirect(request: &AuthorizationRequest) -> Response {
    match serde_urlencoded::to_string(request) {
        Ok(query) => Redirect::to(&format!("/login?{query}")).into_response(),
        Err(e) => error_page(&OidcError::ServerError(e.to_string())),
    }
}

fn consent_page(request: &ValidatedRequest) -> Html<String> {
    let scope_items: String = request
        .scope
        .split_whitespace()
        .map(|s| format!("<li>{}</li>", html_escape(s)))
        .collect();

    let hidden_fields = [
        ("client_id", Some(request.client.client_id.as_str())),
        ("redirect_uri", Some(request.redirect_uri.as_str())),
        ("scope", Some(request.scope.as_str())),
        ("state", request.state.as_deref()),
        ("nonce", request.nonce.as_deref()),
        ("code_challenge", request.code_challenge.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value.map(|v| {
            format!(
                r#"<input type="hidden" name="{name}" value="{}">"#,
                html_escape(v)
            )
        })
    })
    .chain(request.code_challenge_method.map(|m| {
        format!(r#"<input type="hidden" name="code_challenge_method" value="{m}">"#)
    }))
    .collect::<String>();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Authorize {name}</title></head>
<body>
<h1>Authorize {name}</h1>
<p><strong>{name}</strong> is requesting access to:</p>
<ul>{scope_items}</ul>
<form method="post" action="/oauth/consent">
{hidden_fields}
<button type="submit" name="approved" value="true">Approve</button>
<button type="submit" name="approved" value="false">Deny</button>
</form>
</body>
</html>"#,
        name = html_escape(&request.client.name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: Some("code".to_string()),
            client_id: Some("web-app".to_string()),
            redirect_uri: Some("https://app.example.com/callback".to_string()),
            scope: Some("openid profile".to_string()),
            state: None,
            nonce: None,
            code_challenge: None,
            code_challenge_method: None,
        }
    }

    #[test]
    fn missing_params_are_named() {
        let mut r = request();
        r.redirect_uri = None;
        let err = check_required_params(&r).unwrap_err();
        assert!(err.to_string().contains("redirect_uri"));

        assert!(check_required_params(&request()).is_ok());
    }

    #[test]
    fn pkce_challenge_defaults_to_plain() {
        let mut r = request();
        r.code_challenge = Some("verifier-value".to_string());
        assert_eq!(parse_pkce(&r).unwrap(), Some(CodeChallengeMethod::Plain));
    }

    #[test]
    fn pkce_method_without_challenge_is_rejected() {
        let mut r = request();
        r.code_challenge_method = Some("S256".to_string());
        assert!(matches!(
            parse_pkce(&r).unwrap_err(),
            OidcError::InvalidRequest(_)
        ));
    }

    #[test]
    fn pkce_unknown_method_is_rejected() {
        let mut r = request();
        r.code_challenge = Some("challenge".to_string());
        r.code_challenge_method = Some("S512".to_string());
        assert!(parse_pkce(&r).is_err());
    }
}
