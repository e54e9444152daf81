//! Templated email sender with pluggable delivery backends.
//!
//! Templates are `MiniJinja` files under an assets directory; messages are
//! delivered through the `SendGrid` v3 Web API or over SMTP.

pub mod backend;
pub mod config;
pub mod error;
pub mod sender;
pub mod sendgrid;
pub mod smtp;
pub mod template;
pub mod types;

pub use backend::{EmailBackend, EmailMessage, EmailResult};
pub use config::{BackendConfig, EmailConfig, SendGridConfig, SmtpConfig};
pub use error::EmailError;
pub use sender::EmailSender;
pub use sendgrid::SendGridBackend;
pub use smtp::SmtpBackend;
pub use template::TemplateRenderer;
