use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// SMTP-specific configuration settings.
///
/// Holds all settings needed to establish a connection to an SMTP server.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,

    /// SMTP server port. Defaults to 587 (STARTTLS submission port).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Optional SMTP username for authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// Optional SMTP password for authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Whether to use TLS for the SMTP connection. Defaults to `true`.
    #[serde(default = "default_tls")]
    pub tls: bool,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_tls() -> bool {
    true
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .finish()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_owned(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            tls: default_tls(),
        }
    }
}

impl SmtpConfig {
    /// SMTP relay on `host` with the default port and TLS.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            smtp_host: host.into(),
            ..Self::default()
        }
    }

    /// Set SMTP authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Override the default SMTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    /// Set whether TLS should be used for SMTP.
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// `SendGrid` v3 Web API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SendGridConfig {
    /// API key, sent as a bearer token.
    pub api_key: String,

    /// Base URL of the API. Overridable for tests.
    #[serde(default = "default_sendgrid_base_url")]
    pub api_base_url: String,
}

fn default_sendgrid_base_url() -> String {
    "https://api.sendgrid.com".to_owned()
}

impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl SendGridConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: default_sendgrid_base_url(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Which delivery backend an [`EmailSender`](crate::EmailSender) uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    #[serde(rename = "sendgrid")]
    SendGrid(SendGridConfig),
    Smtp(SmtpConfig),
}

/// Full email sender configuration.
///
/// # Examples
///
/// ```
/// use connector_email::{BackendConfig, EmailConfig, SendGridConfig};
///
/// let config = EmailConfig::new(
///     "./assets",
///     "Orders",
///     "orders@example.com",
///     BackendConfig::SendGrid(SendGridConfig::new("SG.key")),
/// );
/// assert_eq!(config.sender_email, "orders@example.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Directory template names are resolved against.
    pub assets_dir: PathBuf,

    /// Display name of the sender.
    pub sender_name: String,

    /// Address emails are sent from.
    pub sender_email: String,

    pub backend: BackendConfig,

    /// HTML-escape values substituted into `.html` templates. With `false`
    /// every template is rendered as plain text substitution.
    #[serde(default = "default_auto_escape")]
    pub auto_escape: bool,
}

fn default_auto_escape() -> bool {
    true
}

impl EmailConfig {
    pub fn new(
        assets_dir: impl Into<PathBuf>,
        sender_name: impl Into<String>,
        sender_email: impl Into<String>,
        backend: BackendConfig,
    ) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            sender_name: sender_name.into(),
            sender_email: sender_email.into(),
            backend,
            auto_escape: default_auto_escape(),
        }
    }

    /// Enable or disable HTML escaping of `.html` templates.
    #[must_use]
    pub fn with_auto_escape(mut self, auto_escape: bool) -> Self {
        self.auto_escape = auto_escape;
        self
    }
}
