use async_trait::async_trait;

use crate::error::EmailError;

/// A unified email message representation shared across all backends.
#[derive(Debug, Clone, Default)]
pub struct EmailMessage {
    /// Sender email address.
    pub from: String,
    /// Sender display name.
    pub from_name: Option<String>,
    /// Recipient email address.
    pub to: String,
    /// Recipient display name.
    pub to_name: Option<String>,
    /// Email subject line.
    pub subject: String,
    /// Optional plain-text body.
    pub body: Option<String>,
    /// Optional HTML body.
    pub html_body: Option<String>,
}

/// Result of a successful email send operation.
#[derive(Debug, Clone)]
pub struct EmailResult {
    /// Provider-assigned message identifier (if available).
    pub message_id: Option<String>,
    /// Human-readable status (e.g. `"sent"`, `"queued"`).
    pub status: String,
}

/// Trait for pluggable email delivery backends.
///
/// Implementations handle the actual transport of email messages (`SendGrid`,
/// SMTP) while the [`EmailSender`](crate::EmailSender) handles templates
/// and addressing.
#[async_trait]
pub trait EmailBackend: Send + Sync + std::fmt::Debug {
    /// Send an email message through this backend.
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, EmailError>;

    /// Perform a health check to verify the backend is operational.
    async fn health_check(&self) -> Result<(), EmailError>;

    /// Return the backend name (e.g. `"smtp"`, `"sendgrid"`).
    fn backend_name(&self) -> &'static str;
}
