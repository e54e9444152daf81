use connector_core::ConnectorError;
use thiserror::Error;

/// Errors from building or probing a database pool.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The configured driver has no implementation in this crate.
    #[error("unsupported database driver: {0}")]
    UnsupportedDriver(String),

    /// The driver reported an error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl From<DatabaseError> for ConnectorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UnsupportedDriver(_) => ConnectorError::Configuration(err.to_string()),
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                ConnectorError::Timeout(std::time::Duration::from_secs(0))
            }
            DatabaseError::Sqlx(e @ (sqlx::Error::Io(_) | sqlx::Error::Tls(_))) => {
                ConnectorError::Connection(e.to_string())
            }
            DatabaseError::Sqlx(e) => ConnectorError::ExecutionFailed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_driver_maps_to_configuration() {
        let err: ConnectorError = DatabaseError::UnsupportedDriver("mysql".into()).into();
        assert!(matches!(err, ConnectorError::Configuration(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn pool_timeout_is_retryable() {
        let err: ConnectorError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, ConnectorError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn io_error_maps_to_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ConnectorError = DatabaseError::Sqlx(sqlx::Error::Io(io)).into();
        assert!(matches!(err, ConnectorError::Connection(_)));
    }

    #[test]
    fn row_not_found_maps_to_execution_failed() {
        let err: ConnectorError = DatabaseError::Sqlx(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, ConnectorError::ExecutionFailed(_)));
    }
}
