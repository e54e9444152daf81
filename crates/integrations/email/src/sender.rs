use connector_core::{ConnectorError, HealthCheck};
use serde::Serialize;
use tracing::{info, instrument};

use crate::backend::{EmailBackend, EmailMessage, EmailResult};
use crate::config::{BackendConfig, EmailConfig};
use crate::error::EmailError;
use crate::sendgrid::SendGridBackend;
use crate::smtp::SmtpBackend;
use crate::template::TemplateRenderer;

/// Renders templated emails and sends them from a fixed sender.
///
/// # Examples
///
/// ```no_run
/// use connector_email::{BackendConfig, EmailConfig, EmailSender, SendGridConfig};
///
/// # async fn example() -> Result<(), connector_email::EmailError> {
/// let config = EmailConfig::new(
///     "./assets",
///     "Orders",
///     "orders@example.com",
///     BackendConfig::SendGrid(SendGridConfig::new("SG.key")),
/// );
/// let sender = EmailSender::new(config)?;
/// let html = sender.render_template("welcome.html", &serde_json::json!({ "name": "Maria" }))?;
/// sender
///     .send(&html, "maria@example.com", "Welcome", "Maria", "Welcome, Maria")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EmailSender {
    sender_name: String,
    sender_email: String,
    templates: TemplateRenderer,
    backend: Box<dyn EmailBackend>,
}

impl EmailSender {
    /// Build the sender and the backend selected by `config.backend`.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let backend: Box<dyn EmailBackend> = match config.backend {
            BackendConfig::SendGrid(ref sendgrid) => Box::new(SendGridBackend::new(sendgrid.clone())),
            BackendConfig::Smtp(ref smtp) => Box::new(SmtpBackend::new(smtp.clone())?),
        };
        Ok(Self::with_backend(config, backend))
    }

    /// Use a pre-built backend; `config.backend` is ignored.
    pub fn with_backend(config: EmailConfig, backend: Box<dyn EmailBackend>) -> Self {
        Self {
            sender_name: config.sender_name,
            sender_email: config.sender_email,
            templates: TemplateRenderer::new(config.assets_dir).with_auto_escape(config.auto_escape),
            backend,
        }
    }

    /// Render the template file `name` from the assets directory.
    pub fn render_template<S: Serialize>(&self, name: &str, context: &S) -> Result<String, EmailError> {
        self.templates.render(name, context)
    }

    /// Send an already rendered HTML body, with `plain_text` as the
    /// alternative part, to `email`.
    #[instrument(skip(self, html, plain_text), fields(backend = self.backend.backend_name()))]
    pub async fn send(
        &self,
        html: &str,
        email: &str,
        subject: &str,
        receiver_name: &str,
        plain_text: &str,
    ) -> Result<EmailResult, EmailError> {
        let message = EmailMessage {
            from: self.sender_email.clone(),
            from_name: Some(self.sender_name.clone()),
            to: email.to_owned(),
            to_name: Some(receiver_name.to_owned()),
            subject: subject.to_owned(),
            body: Some(plain_text.to_owned()),
            html_body: Some(html.to_owned()),
        };

        let result = self.backend.send(&message).await?;
        info!(to = email, status = %result.status, "email sent");
        Ok(result)
    }

    /// Render `template` and send it in one step.
    pub async fn send_template<S: Serialize>(
        &self,
        template: &str,
        context: &S,
        email: &str,
        subject: &str,
        receiver_name: &str,
        plain_text: &str,
    ) -> Result<EmailResult, EmailError> {
        let html = self.render_template(template, context)?;
        self.send(&html, email, subject, receiver_name, plain_text)
            .await
    }
}

impl HealthCheck for EmailSender {
    fn name(&self) -> &str {
        self.backend.backend_name()
    }

    async fn health_check(&self) -> Result<(), ConnectorError> {
        self.backend.health_check().await?;
        Ok(())
    }
}
