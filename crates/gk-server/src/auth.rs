//! Browser-facing authentication handlers.
//!
//! These drive the login state machine: password check, forced password
//! change, MFA enrollment and challenge, then session establishment. Flow
//! steps are correlated by the opaque token the client carries between
//! requests; no handler accepts a raw user id.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gk_auth::{AuthError, LoginOutcome};
use gk_core::EmailMessage;
use gk_model::{LoginStage, User};
use gk_oidc::cookie_value;
use gk_session::SessionError;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address; its domain selects the tenant.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Forced password change request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Flow token from the login response.
    pub flow_token: String,
    /// Current password, re-verified before the change.
    pub current_password: String,
    /// Replacement password.
    pub new_password: String,
}

/// MFA enrollment start request body.
#[derive(Debug, Deserialize)]
pub struct MfaBeginRequest {
    /// Flow token from the login response.
    pub flow_token: String,
}

/// MFA enrollment confirmation request body.
#[derive(Debug, Deserialize)]
pub struct MfaCompleteRequest {
    /// Flow token from the login response.
    pub flow_token: String,
    /// Code from the authenticator app.
    pub code: String,
}

/// MFA disable request body.
#[derive(Debug, Deserialize)]
pub struct MfaDisableRequest {
    /// Current TOTP or backup code.
    pub code: String,
}

/// MFA login challenge request body.
#[derive(Debug, Deserialize)]
pub struct MfaVerifyRequest {
    /// Flow token from the login response.
    pub flow_token: String,
    /// TOTP or backup code.
    pub code: String,
    /// Whether to remember this device for 30 days.
    #[serde(default)]
    pub trust_device: bool,
}

/// Login step response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// "ok" when authenticated, otherwise the name of the next step.
    pub status: &'static str,

    /// Correlation token for the next step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_token: Option<String>,

    /// Authenticated user summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Minimal user profile returned after login.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Primary role.
    pub role: String,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Response {
    let (user_agent, ip) = client_meta(&headers);

    match state
        .login
        .start(&request.email, &request.password, &user_agent, &ip)
        .await
    {
        Ok(outcome) => outcome_response(&state, outcome).await,
        Err(e) => auth_error_response(&e),
    }
}

/// `POST /auth/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Response {
    let (user_agent, ip) = client_meta(&headers);

    match state
        .login
        .change_password(
            &request.flow_token,
            &request.current_password,
            &request.new_password,
            &user_agent,
            &ip,
        )
        .await
    {
        Ok(outcome) => {
            if let LoginOutcome::Authenticated(user) = &outcome {
                notify(&state, user, "Your password was changed").await;
            }
            outcome_response(&state, outcome).await
        }
        Err(e) => auth_error_response(&e),
    }
}

/// `POST /auth/mfa/setup`
pub async fn mfa_begin_setup(
    State(state): State<AppState>,
    Json(request): Json<MfaBeginRequest>,
) -> Response {
    match state.login.begin_mfa_setup(&request.flow_token).await {
        Ok(setup) => Json(serde_json::json!({
            "secret": setup.secret,
            "otpauth_uri": setup.otpauth_uri,
            "qr_png_base64": setup.qr_png_base64,
            "backup_codes": setup.backup_codes,
        }))
        .into_response(),
        Err(e) => auth_error_response(&e),
    }
}

/// `PATCH /auth/mfa/setup`
pub async fn mfa_complete_setup(
    State(state): State<AppState>,
    Json(request): Json<MfaCompleteRequest>,
) -> Response {
    match state
        .login
        .complete_mfa_setup(&request.flow_token, &request.code)
        .await
    {
        Ok(user) => {
            notify(&state, &user, "Multi-factor authentication was enabled").await;
            outcome_response(&state, LoginOutcome::Authenticated(user)).await
        }
        Err(e) => auth_error_response(&e),
    }
}

/// `DELETE /auth/mfa/setup`
///
/// Unlike the enrollment handlers this acts on an established session, not
/// a login flow.
pub async fn mfa_disable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MfaDisableRequest>,
) -> Response {
    let Some(principal) = state.oidc.current_principal(&headers).await else {
        return auth_error_response(&AuthError::InvalidCredentials);
    };

    let mut user = match state
        .repos
        .users
        .get_by_id(principal.tenant_id, principal.user_id)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return auth_error_response(&AuthError::InvalidCredentials),
        Err(e) => return auth_error_response(&AuthError::Storage(e)),
    };

    match state.mfa.disable(&mut user, &request.code).await {
        Ok(()) => {
            notify(&state, &user, "Multi-factor authentication was disabled").await;
            Json(serde_json::json!({ "status": "ok" })).into_response()
        }
        Err(e) => auth_error_response(&e),
    }
}

/// `POST /auth/mfa/verify-login`
pub async fn mfa_verify_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<MfaVerifyRequest>,
) -> Response {
    let (user_agent, ip) = client_meta(&headers);

    match state
        .login
        .verify_mfa(
            &request.flow_token,
            &request.code,
            &user_agent,
            &ip,
            request.trust_device,
        )
        .await
    {
        Ok(user) => outcome_response(&state, LoginOutcome::Authenticated(user)).await,
        Err(e) => auth_error_response(&e),
    }
}

/// `POST /auth/logout`
///
/// Destroys the session row and cascade-revokes the user's tokens. A
/// revocation failure after session destruction surfaces as a 500.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(value) = cookie_value(&headers, &state.config.cookie.name) else {
        return auth_error_response(&AuthError::InvalidCredentials);
    };

    match state.sessions.logout(&value).await {
        Ok(()) => (
            [(header::SET_COOKIE, clear_cookie(&state))],
            Json(serde_json::json!({ "status": "ok" })),
        )
            .into_response(),
        Err(SessionError::InvalidCookie | SessionError::NotAuthenticated) => {
            auth_error_response(&AuthError::InvalidCredentials)
        }
        Err(e) => {
            error!(error = %e, "logout failed");
            server_error_response()
        }
    }
}

/// Turns a login outcome into the response: either a session cookie plus
/// user summary, or the flow token for the next step.
async fn outcome_response(state: &AppState, outcome: LoginOutcome) -> Response {
    match outcome {
        LoginOutcome::Authenticated(user) => {
            let cookie = match state.sessions.establish(&user).await {
                Ok(cookie) => cookie,
                Err(e) => {
                    error!(error = %e, "session establishment failed");
                    return server_error_response();
                }
            };

            info!(user_id = %user.id, "login complete");
            let body = LoginResponse {
                status: "ok",
                flow_token: None,
                user: Some(UserSummary {
                    email: user.email.clone(),
                    name: user.name.clone(),
                    role: user.role.clone(),
                }),
            };
            (
                [(header::SET_COOKIE, session_cookie(state, &cookie))],
                Json(body),
            )
                .into_response()
        }
        LoginOutcome::Pending { flow_token, stage } => {
            let body = LoginResponse {
                status: stage_status(stage),
                flow_token: Some(flow_token),
                user: None,
            };
            Json(body).into_response()
        }
    }
}

const fn stage_status(stage: LoginStage) -> &'static str {
    match stage {
        LoginStage::PasswordChange => "password_change_required",
        LoginStage::MfaSetup => "mfa_setup_required",
        LoginStage::Mfa => "mfa_required",
    }
}

/// Extracts the user agent and client IP used for device trust.
fn client_meta(headers: &HeaderMap) -> (String, String) {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .unwrap_or("unknown")
        .trim()
        .to_string();
    (user_agent, ip)
}

fn session_cookie(state: &AppState, value: &str) -> String {
    format!(
        "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.config.cookie.name, state.config.cookie.max_age
    )
}

fn clear_cookie(state: &AppState) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        state.config.cookie.name
    )
}

/// Best-effort email notification; failures are logged and swallowed.
async fn notify(state: &AppState, user: &User, subject: &str) {
    let message = EmailMessage::new(
        &user.email,
        subject,
        format!("<p>{subject}.</p>"),
        format!("{subject}."),
    );
    if let Err(e) = state.notifier.send(message).await {
        warn!(to = %user.email, error = %e, "notification delivery failed");
    }
}

/// Maps authentication errors to the flat response taxonomy.
///
/// Unknown-user, wrong-password, and unknown-tenant all collapse into
/// `invalid_credentials` so account existence cannot be probed.
fn auth_error_response(error: &AuthError) -> Response {
    let (status, code, description) = match error {
        AuthError::InvalidCredentials | AuthError::TenantNotFound => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            Some("invalid credentials".to_string()),
        ),
        AuthError::AccountInactive => (StatusCode::FORBIDDEN, "account_inactive", None),
        AuthError::TenantInactive => (StatusCode::FORBIDDEN, "tenant_inactive", None),
        AuthError::InvalidCode => (
            StatusCode::UNAUTHORIZED,
            "invalid_code",
            Some("invalid verification code".to_string()),
        ),
        AuthError::FlowExpired => (StatusCode::UNAUTHORIZED, "flow_expired", None),
        AuthError::AlreadyEnabled => (StatusCode::CONFLICT, "mfa_already_enabled", None),
        AuthError::NotEnabled => (StatusCode::BAD_REQUEST, "mfa_not_enabled", None),
        AuthError::PasswordPolicyViolation(msg) => (
            StatusCode::BAD_REQUEST,
            "password_policy_violation",
            Some(msg.clone()),
        ),
        AuthError::Storage(_) | AuthError::Internal(_) => {
            error!(error = %error, "authentication handler failed");
            return server_error_response();
        }
    };

    let body = serde_json::json!({
        "error": code,
        "error_description": description,
    });
    (status, Json(body)).into_response()
}

fn server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "server_error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_meta_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "Mozilla/5.0".parse().unwrap());
        headers.insert("x-forwarded-for", "10.0.0.1, 172.16.0.1".parse().unwrap());

        let (ua, ip) = client_meta(&headers);
        assert_eq!(ua, "Mozilla/5.0");
        assert_eq!(ip, "10.0.0.1");
    }

    #[test]
    fn client_meta_defaults() {
        let (ua, ip) = client_meta(&HeaderMap::new());
        assert_eq!(ua, "");
        assert_eq!(ip, "unknown");
    }

    #[test]
    fn stage_statuses() {
        assert_eq!(stage_status(LoginStage::Mfa), "mfa_required");
        assert_eq!(
            stage_status(LoginStage::PasswordChange),
            "password_change_required"
        );
        assert_eq!(stage_status(LoginStage::MfaSetup), "mfa_setup_required");
    }
}
