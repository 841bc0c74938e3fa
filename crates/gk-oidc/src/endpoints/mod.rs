//! HTTP handlers for the protocol endpoints.

pub mod authorize;
pub mod consent;
pub mod discovery;
pub mod state;
pub mod token;
pub mod userinfo;

pub use state::{cookie_value, OidcState};

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::error;

use crate::error::OidcError;

/// JSON error response for the token-style endpoints.
fn error_response(err: &OidcError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(detail = %err, "endpoint failed");
    }
    (status, axum::Json(err.to_error_response())).into_response()
}

/// HTML error page for the authorization endpoint.
///
/// Authorization errors are never redirected to the client; the user sees
/// this page instead. Server-side failure detail stays in the logs.
fn error_page(error: &OidcError) -> Response {
    let body = error.to_error_response();
    let html = format!(
        r"<!DOCTYPE html>
<html>
<head><title>Authorization Error</title></head>
<body>
<h1>Authorization Error</h1>
<p><strong>Error:</strong> {}</p>
<p><strong>Description:</strong> {}</p>
</body>
</html>",
        html_escape(&body.error),
        html_escape(body.error_description.as_deref().unwrap_or_default())
    );

    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(detail = %error, "authorization endpoint failed");
    }
    (status, Html(html)).into_response()
}

/// Redirects back to a registered client URI with query parameters.
fn redirect_with_params(redirect_uri: &str, params: &[(&str, &str)]) -> Response {
    let encoded: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if redirect_uri.contains('?') { "&" } else { "?" };
    Redirect::to(&format!("{redirect_uri}{separator}{encoded}")).into_response()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escape_special_chars() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape(r#"q"v"#), "q&quot;v");
    }
}
