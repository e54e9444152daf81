use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info};

use crate::backend::{EmailBackend, EmailMessage, EmailResult};
use crate::config::SmtpConfig;
use crate::error::EmailError;

/// SMTP email delivery backend using `lettre`.
pub struct SmtpBackend {
    config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("config", &self.config)
            .field("transport", &"<AsyncSmtpTransport>")
            .finish()
    }
}

impl SmtpBackend {
    /// Create a new `SmtpBackend` from the given SMTP configuration.
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        let transport = build_transport(&config)?;
        Ok(Self { config, transport })
    }

    /// Create a `SmtpBackend` with a pre-built transport.
    pub fn with_transport(
        config: SmtpConfig,
        transport: AsyncSmtpTransport<Tokio1Executor>,
    ) -> Self {
        Self { config, transport }
    }
}

#[async_trait]
impl EmailBackend for SmtpBackend {
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, EmailError> {
        debug!(to = %message.to, subject = %message.subject, "building SMTP message");
        let lettre_message = build_message(message)?;

        self.transport.send(lettre_message).await.map_err(|e| {
            error!(error = %e, "SMTP send failed");
            map_smtp_error(&e)
        })?;

        info!(to = %message.to, "email sent via SMTP");
        Ok(EmailResult {
            message_id: None,
            status: "sent".to_owned(),
        })
    }

    async fn health_check(&self) -> Result<(), EmailError> {
        debug!("performing SMTP health check");
        let reachable = self.transport.test_connection().await.map_err(|e| {
            error!(error = %e, "SMTP health check failed");
            EmailError::Transport(format!("SMTP health check failed: {e}"))
        })?;
        if !reachable {
            return Err(EmailError::Transport(
                "SMTP server did not accept the connection".to_owned(),
            ));
        }
        info!("SMTP health check passed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}

fn mailbox(name: Option<&str>, address: &str, role: &str) -> Result<Mailbox, EmailError> {
    let address: Address = address
        .parse()
        .map_err(|e| EmailError::InvalidAddress(format!("invalid {role} address {address:?}: {e}")))?;
    let name = name.filter(|n| !n.is_empty()).map(str::to_owned);
    Ok(Mailbox::new(name, address))
}

/// Build a `lettre::Message` from the unified [`EmailMessage`].
fn build_message(msg: &EmailMessage) -> Result<Message, EmailError> {
    let builder = Message::builder()
        .from(mailbox(msg.from_name.as_deref(), &msg.from, "sender")?)
        .to(mailbox(msg.to_name.as_deref(), &msg.to, "recipient")?)
        .subject(&msg.subject);

    let built = match (&msg.body, &msg.html_body) {
        (Some(text), Some(html)) => builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
        ),
        (Some(text), None) => builder.body(text.clone()),
        (None, Some(html)) => builder.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html.clone()),
        ),
        (None, None) => builder.body(String::new()),
    };

    built.map_err(|e| EmailError::InvalidMessage(format!("failed to build email: {e}")))
}

/// Build an async SMTP transport from the given configuration.
fn build_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    let builder = if config.tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::Configuration(format!("SMTP TLS relay error: {e}")))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder.port(config.smtp_port);

    let builder = if let (Some(user), Some(pass)) = (&config.username, &config.password) {
        builder.credentials(Credentials::new(user.clone(), pass.clone()))
    } else {
        builder
    };

    Ok(builder.build())
}

/// Map a lettre SMTP error to the appropriate `EmailError` variant.
fn map_smtp_error(error: &lettre::transport::smtp::Error) -> EmailError {
    let message = error.to_string();

    if error.is_permanent() {
        EmailError::Rejected(message)
    } else {
        EmailError::Transport(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_smtp_config() -> SmtpConfig {
        SmtpConfig::new("localhost").with_port(2525).with_tls(false)
    }

    fn test_message() -> EmailMessage {
        EmailMessage {
            from: "sender@example.com".to_owned(),
            from_name: Some("Sender".to_owned()),
            to: "recipient@example.com".to_owned(),
            to_name: Some("Maria".to_owned()),
            subject: "Test Subject".to_owned(),
            body: Some("Hello, world!".to_owned()),
            html_body: None,
        }
    }

    #[test]
    fn build_message_plain_text() {
        let msg = test_message();
        assert!(build_message(&msg).is_ok());
    }

    #[test]
    fn build_message_html_only() {
        let mut msg = test_message();
        msg.body = None;
        msg.html_body = Some("<h1>Hello</h1>".to_owned());
        assert!(build_message(&msg).is_ok());
    }

    #[test]
    fn build_message_multipart() {
        let mut msg = test_message();
        msg.html_body = Some("<p>Hello</p>".to_owned());
        let built = build_message(&msg).unwrap();
        let raw = String::from_utf8(built.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Maria"));
    }

    #[test]
    fn build_message_without_names() {
        let mut msg = test_message();
        msg.from_name = None;
        msg.to_name = Some(String::new());
        assert!(build_message(&msg).is_ok());
    }

    #[test]
    fn build_message_invalid_from() {
        let mut msg = test_message();
        msg.from = "not-valid".to_owned();
        let err = build_message(&msg).unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[test]
    fn build_message_invalid_to() {
        let mut msg = test_message();
        msg.to = "not-valid".to_owned();
        let err = build_message(&msg).unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(ref m) if m.contains("recipient")));
    }

    #[test]
    fn build_message_empty_body() {
        let mut msg = test_message();
        msg.body = None;
        msg.html_body = None;
        assert!(build_message(&msg).is_ok());
    }

    #[tokio::test]
    async fn build_transport_no_tls() {
        let config = test_smtp_config();
        assert!(build_transport(&config).is_ok());
    }

    #[tokio::test]
    async fn build_transport_with_credentials() {
        let config = test_smtp_config().with_credentials("user", "pass");
        assert!(build_transport(&config).is_ok());
    }

    #[tokio::test]
    async fn smtp_backend_name() {
        let backend = SmtpBackend::new(test_smtp_config()).unwrap();
        assert_eq!(backend.backend_name(), "smtp");
    }

    #[tokio::test]
    async fn smtp_backend_debug() {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost")
            .port(2525)
            .build();
        let backend = SmtpBackend::with_transport(
            test_smtp_config().with_credentials("user", "pw-placeholder"),
            transport,
        );
        let debug = format!("{backend:?}");
        assert!(debug.contains("SmtpBackend"));
        assert!(!debug.contains("pw-placeholder"));
    }
}
