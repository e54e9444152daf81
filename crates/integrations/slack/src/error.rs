use connector_core::ConnectorError;
use thiserror::Error;

/// Errors from the Slack reporter.
#[derive(Debug, Error)]
pub enum SlackError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Slack API returned an error response (ok: false).
    #[error("Slack API error: {0}")]
    Api(String),

    /// The reporter received an HTTP 429 (Too Many Requests) response.
    #[error("rate limited by Slack")]
    RateLimited,

    /// A required setting is missing.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<ConnectorError> for SlackError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Configuration(msg) => SlackError::Configuration(msg),
            other => SlackError::Configuration(other.to_string()),
        }
    }
}

impl From<SlackError> for ConnectorError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::Http(e) => {
                if e.is_timeout() {
                    ConnectorError::Timeout(std::time::Duration::from_secs(0))
                } else {
                    ConnectorError::Connection(e.to_string())
                }
            }
            SlackError::Api(msg) => ConnectorError::ExecutionFailed(msg),
            SlackError::RateLimited => ConnectorError::RateLimited,
            SlackError::Configuration(msg) => ConnectorError::Configuration(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_retryable() {
        let err: ConnectorError = SlackError::RateLimited.into();
        assert!(err.is_retryable());
        assert!(matches!(err, ConnectorError::RateLimited));
    }

    #[test]
    fn api_error_maps_to_non_retryable() {
        let err: ConnectorError = SlackError::Api("invalid_auth".into()).into();
        assert!(!err.is_retryable());
        assert!(matches!(err, ConnectorError::ExecutionFailed(_)));
    }

    #[test]
    fn configuration_round_trips_message() {
        let err = SlackError::from(ConnectorError::Configuration("token is required".into()));
        assert_eq!(
            err.to_string(),
            "invalid configuration: token is required"
        );
        let back: ConnectorError = err.into();
        assert!(matches!(back, ConnectorError::Configuration(_)));
    }
}
