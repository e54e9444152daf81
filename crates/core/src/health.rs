use crate::error::ConnectorError;

/// A cheap liveness probe against the vendor behind an adapter.
///
/// Each adapter picks the lightest authenticated call its vendor offers
/// (`auth.test` for Slack, the account resource for Twilio, `SELECT 1` for
/// Postgres, and so on).
pub trait HealthCheck: Send + Sync {
    /// Short, stable name used in logs and CLI output.
    fn name(&self) -> &str;

    /// Verify the vendor is reachable with the configured credentials.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), ConnectorError>> + Send;
}
