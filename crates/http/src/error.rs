use connector_core::ConnectorError;
use thiserror::Error;

/// Errors returned by the HTTP caller.
///
/// A response with a non-2xx status is not an error; only failures to build,
/// send, or read the request are.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Transport failure: connection, timeout, or reading the body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request body could not be serialized to JSON.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A header name or value is not valid HTTP.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl From<HttpError> for ConnectorError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Http(e) => {
                if e.is_timeout() {
                    ConnectorError::Timeout(std::time::Duration::from_secs(0))
                } else if e.is_builder() {
                    ConnectorError::Configuration(e.to_string())
                } else {
                    ConnectorError::Connection(e.to_string())
                }
            }
            HttpError::InvalidPayload(msg) => ConnectorError::Serialization(msg),
            HttpError::InvalidHeader { name, reason } => {
                ConnectorError::Configuration(format!("invalid header {name}: {reason}"))
            }
        }
    }
}
