use connector_core::ConnectorError;
use thiserror::Error;

/// Errors from rendering or delivering an email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// The template could not be loaded or rendered.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A sender or recipient address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The delivery API answered with a status of 400 or above.
    #[error("email delivery failed, status code: {status}: {body}")]
    Api { status: u16, body: String },

    /// The delivery API answered with HTTP 429.
    #[error("rate limited by email API")]
    RateLimited,

    /// The SMTP server could not be reached or answered with a transient error.
    #[error("SMTP transport error: {0}")]
    Transport(String),

    /// The SMTP server permanently rejected the message.
    #[error("SMTP rejected message: {0}")]
    Rejected(String),

    /// The backend could not be built from its configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<EmailError> for ConnectorError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Http(e) => {
                if e.is_timeout() {
                    ConnectorError::Timeout(std::time::Duration::from_secs(0))
                } else {
                    ConnectorError::Connection(e.to_string())
                }
            }
            EmailError::Api { status, body } => {
                if (500..600).contains(&status) {
                    ConnectorError::Connection(format!("HTTP {status}: {body}"))
                } else {
                    ConnectorError::ExecutionFailed(format!("HTTP {status}: {body}"))
                }
            }
            EmailError::RateLimited => ConnectorError::RateLimited,
            EmailError::Transport(msg) => ConnectorError::Connection(msg),
            EmailError::Template(e) => ConnectorError::Serialization(e.to_string()),
            EmailError::InvalidAddress(msg)
            | EmailError::InvalidMessage(msg)
            | EmailError::Rejected(msg) => ConnectorError::ExecutionFailed(msg),
            EmailError::Configuration(msg) => ConnectorError::Configuration(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_retryable() {
        let err: ConnectorError = EmailError::RateLimited.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn server_error_is_retryable() {
        let err: ConnectorError = EmailError::Api {
            status: 503,
            body: String::new(),
        }
        .into();
        assert!(matches!(err, ConnectorError::Connection(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn client_error_is_not_retryable() {
        let err: ConnectorError = EmailError::Api {
            status: 400,
            body: "bad request".into(),
        }
        .into();
        assert!(matches!(err, ConnectorError::ExecutionFailed(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = EmailError::Api {
            status: 401,
            body: "unauthorized".into(),
        };
        assert_eq!(
            err.to_string(),
            "email delivery failed, status code: 401: unauthorized"
        );
    }

    #[test]
    fn transient_smtp_is_connection() {
        let err: ConnectorError = EmailError::Transport("421 busy".into()).into();
        assert!(matches!(err, ConnectorError::Connection(_)));
    }
}
