use std::time::Duration;

use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";
const DEFAULT_CRITICAL_MARKER: &str = "token is expired";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Slack error reporter.
#[derive(Clone, Deserialize)]
pub struct SlackConfig {
    /// Bot OAuth token used to authenticate API requests.
    pub token: String,

    /// Channel that receives ordinary error reports.
    pub channel_id: String,

    /// Channel that receives reports whose error text contains
    /// [`critical_marker`](Self::critical_marker).
    pub critical_channel_id: String,

    /// Report panics only; error responses pass through silently.
    #[serde(default)]
    pub only_panics: bool,

    /// Log messages instead of posting them.
    #[serde(default)]
    pub debug: bool,

    /// Timeout for a single Slack API call, in seconds. `0` disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Substring that routes a report to the critical channel.
    #[serde(default = "default_critical_marker")]
    pub critical_marker: String,

    /// JSON field read first when extracting the error text from a body.
    #[serde(default = "default_error_field")]
    pub error_field: String,

    /// JSON field read when `error_field` is absent.
    #[serde(default = "default_message_field")]
    pub message_field: String,

    /// Base URL for the Slack Web API. Override this for testing against a
    /// mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_critical_marker() -> String {
    DEFAULT_CRITICAL_MARKER.to_owned()
}

fn default_error_field() -> String {
    "error".to_owned()
}

fn default_message_field() -> String {
    "message".to_owned()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("critical_channel_id", &self.critical_channel_id)
            .field("only_panics", &self.only_panics)
            .field("debug", &self.debug)
            .field("timeout_secs", &self.timeout_secs)
            .field("critical_marker", &self.critical_marker)
            .field("error_field", &self.error_field)
            .field("message_field", &self.message_field)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl SlackConfig {
    /// Create a configuration with the given token and channels.
    ///
    /// Uses the default Slack API base URL (`https://slack.com/api`).
    pub fn new(
        token: impl Into<String>,
        channel_id: impl Into<String>,
        critical_channel_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            channel_id: channel_id.into(),
            critical_channel_id: critical_channel_id.into(),
            only_panics: false,
            debug: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            critical_marker: default_critical_marker(),
            error_field: default_error_field(),
            message_field: default_message_field(),
            api_base_url: default_api_base_url(),
        }
    }

    #[must_use]
    pub fn with_only_panics(mut self, only_panics: bool) -> Self {
        self.only_panics = only_panics;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_critical_marker(mut self, marker: impl Into<String>) -> Self {
        self.critical_marker = marker.into();
        self
    }

    /// Override the JSON field names used to extract error text.
    #[must_use]
    pub fn with_json_fields(
        mut self,
        error_field: impl Into<String>,
        message_field: impl Into<String>,
    ) -> Self {
        self.error_field = error_field.into();
        self.message_field = message_field.into();
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// The per-call timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
