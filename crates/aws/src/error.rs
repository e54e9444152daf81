use connector_core::ConnectorError;
use thiserror::Error;
use tracing::error;

/// Errors specific to AWS adapter operations.
#[derive(Debug, Error)]
pub enum AwsError {
    /// The AWS SDK returned an error from the service.
    #[error("AWS service error: {0}")]
    ServiceError(String),

    /// The request was throttled by the AWS service.
    #[error("AWS request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with AWS.
    #[error("AWS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("AWS request timed out")]
    Timeout,

    /// The payload could not be sent as-is (e.g. a non UTF-8 SQS body).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Reading or writing a local file failed.
    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),

    /// The background consumer task panicked or was aborted.
    #[error("consumer worker failed: {0}")]
    Worker(String),
}

impl From<AwsError> for ConnectorError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::ServiceError(msg) | AwsError::Worker(msg) => {
                ConnectorError::ExecutionFailed(msg)
            }
            AwsError::Throttled => ConnectorError::RateLimited,
            AwsError::Connection(msg) => ConnectorError::Connection(msg),
            AwsError::Timeout => ConnectorError::Timeout(std::time::Duration::from_secs(30)),
            AwsError::InvalidPayload(msg) => ConnectorError::Serialization(msg),
            AwsError::Configuration(msg) => ConnectorError::Configuration(msg),
            AwsError::Io(e) => ConnectorError::Io(e.to_string()),
        }
    }
}

/// Classify an AWS SDK error string into the appropriate [`AwsError`].
///
/// This helper inspects the error message for common patterns (throttling,
/// timeout, connection) and maps them to the correct variant.
pub fn classify_sdk_error(error_str: &str) -> AwsError {
    let lower = error_str.to_lowercase();
    if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many") {
        AwsError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AwsError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        AwsError::Connection(error_str.to_owned())
    } else {
        AwsError::ServiceError(error_str.to_owned())
    }
}

/// Log a failed SDK call and classify it.
///
/// `detail` should be the full error chain, e.g. rendered through the SDK's
/// `DisplayErrorContext`.
pub(crate) fn sdk_failure(service: &str, operation: &str, detail: &str) -> AwsError {
    error!(service, operation, error = %detail, "AWS call failed");
    classify_sdk_error(detail)
}
