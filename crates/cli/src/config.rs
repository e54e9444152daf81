//! `connector.toml` loading.
//!
//! Every adapter section is optional; a subcommand fails only when the section
//! it needs is missing.

use std::path::{Path, PathBuf};

use anyhow::Context;
use connector_aws::{S3Config, SqsConfig};
use connector_core::TelemetryConfig;
use connector_db::DatabaseConfig;
use connector_email::EmailConfig;
use connector_http::HttpCallerConfig;
use connector_slack::SlackConfig;
use connector_twilio::TwilioConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub s3: Option<S3Config>,
    pub sqs: Option<SqsConfig>,
    #[serde(default)]
    pub http: HttpCallerConfig,
    pub database: Option<DatabaseConfig>,
    pub email: Option<EmailConfig>,
    pub slack: Option<SlackConfig>,
    pub twilio: Option<TwilioConfig>,

    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ConnectorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `path`, or fall back to an empty configuration when it does not
    /// exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.source = Some(path.to_owned());
        Ok(config)
    }

    pub fn s3(&self) -> anyhow::Result<&S3Config> {
        self.section(self.s3.as_ref(), "s3")
    }

    pub fn sqs(&self) -> anyhow::Result<&SqsConfig> {
        self.section(self.sqs.as_ref(), "sqs")
    }

    pub fn database(&self) -> anyhow::Result<&DatabaseConfig> {
        self.section(self.database.as_ref(), "database")
    }

    pub fn email(&self) -> anyhow::Result<&EmailConfig> {
        self.section(self.email.as_ref(), "email")
    }

    pub fn slack(&self) -> anyhow::Result<&SlackConfig> {
        self.section(self.slack.as_ref(), "slack")
    }

    pub fn twilio(&self) -> anyhow::Result<&TwilioConfig> {
        self.section(self.twilio.as_ref(), "twilio")
    }

    fn section<'a, T>(&self, value: Option<&'a T>, name: &str) -> anyhow::Result<&'a T> {
        value.with_context(|| match &self.source {
            Some(path) => format!("no [{name}] section in {}", path.display()),
            None => format!("no [{name}] section: configuration file not found"),
        })
    }
}
