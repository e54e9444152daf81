use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during adapter operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The vendor call was made but failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The vendor did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The adapter was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The vendor rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A local filesystem error occurred (uploads, downloads, templates).
    #[error("I/O error: {0}")]
    Io(String),
}

impl ConnectorError {
    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry.
    ///
    /// None of the adapters retry on their own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }
}

impl From<std::io::Error> for ConnectorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
