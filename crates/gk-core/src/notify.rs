//! Outbound email notification contract.
//!
//! Email delivery is an external collaborator. The server composes messages
//! (MFA changes, password changes) and hands them to an [`EmailNotifier`];
//! delivery failures are logged and never fail the triggering operation.

use async_trait::async_trait;
use thiserror::Error;

/// A composed email message ready for delivery.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

impl EmailMessage {
    /// Creates a new message.
    #[must_use]
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            text: text.into(),
        }
    }
}

/// Errors from the notification backend.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The delivery backend rejected or failed to send the message.
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// Provider for outbound email delivery.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Sends a message.
    ///
    /// ## Errors
    ///
    /// Returns `NotifyError::Delivery` if the backend fails. Callers treat
    /// notification as best-effort and must not propagate this failure.
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError>;
}

/// Notifier that logs messages instead of delivering them.
///
/// Used in development and tests, and as the fallback when no delivery
/// backend is configured.
#[derive(Debug, Default)]
pub struct LoggingEmailNotifier;

#[async_trait]
impl EmailNotifier for LoggingEmailNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        tracing::info!(to = %message.to, subject = %message.subject, "email notification");
        Ok(())
    }
}
