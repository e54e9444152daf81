use connector_core::ConnectorError;
use thiserror::Error;

/// Errors from the Twilio client.
#[derive(Debug, Error)]
pub enum TwilioError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Twilio API returned an error response.
    #[error("Twilio API error: {0}")]
    Api(String),

    /// The message is missing a recipient or body.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The client received an HTTP 429 (Too Many Requests) response.
    #[error("rate limited by Twilio")]
    RateLimited,

    /// A required setting is missing.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<ConnectorError> for TwilioError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Configuration(msg) => TwilioError::Configuration(msg),
            other => TwilioError::Configuration(other.to_string()),
        }
    }
}

impl From<TwilioError> for ConnectorError {
    fn from(err: TwilioError) -> Self {
        match err {
            TwilioError::Http(e) => {
                if e.is_timeout() {
                    ConnectorError::Timeout(std::time::Duration::from_secs(0))
                } else {
                    ConnectorError::Connection(e.to_string())
                }
            }
            TwilioError::Api(msg) => ConnectorError::ExecutionFailed(msg),
            TwilioError::InvalidMessage(msg) => ConnectorError::Serialization(msg),
            TwilioError::RateLimited => ConnectorError::RateLimited,
            TwilioError::Configuration(msg) => ConnectorError::Configuration(msg),
        }
    }
}
