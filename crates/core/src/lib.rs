//! Shared vocabulary for the connector adapter crates.
//!
//! Every adapter (`connector-aws`, `connector-http`, `connector-db`,
//! `connector-email`, `connector-slack`, `connector-twilio`) keeps its own
//! error enum and converts it into [`ConnectorError`] at the public boundary,
//! so callers that juggle several adapters can handle failures uniformly.

pub mod config;
pub mod error;
pub mod health;
pub mod telemetry;

pub use config::require_non_empty;
pub use error::ConnectorError;
pub use health::HealthCheck;
pub use telemetry::TelemetryConfig;
