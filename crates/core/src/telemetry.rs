//! Tracing subscriber initialization.
//!
//! The adapter crates only emit `tracing` events; installing a subscriber is
//! left to the binary that links them. [`init`] is the standard setup used by
//! the `connector` CLI and is available to any service that wants the same
//! output format.

use serde::Deserialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Logging configuration, usually read from the `[telemetry]` table of a TOML
/// file.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Fallback filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit newline-delimited JSON instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_owned()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Build the [`EnvFilter`]: `RUST_LOG` wins, then the configured filter.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so that command output on stdout stays machine-readable.
/// Calling this twice is harmless: the second installation attempt is ignored.
pub fn init(config: &TelemetryConfig) {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }

    #[test]
    fn deserialize_empty_table_uses_defaults() {
        let config: TelemetryConfig = toml::from_str("").unwrap();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }

    #[test]
    fn deserialize_custom_values() {
        let config: TelemetryConfig =
            toml::from_str("filter = \"connector_aws=debug\"\njson = true").unwrap();
        assert_eq!(config.filter, "connector_aws=debug");
        assert!(config.json);
    }

    #[test]
    fn init_twice_does_not_panic() {
        let config = TelemetryConfig::default();
        init(&config);
        init(&config);
    }
}
