use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of an [`HttpCaller`](crate::HttpCaller).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpCallerConfig {
    /// Total request timeout in seconds. `0` (the default) leaves requests
    /// unbounded, like a bare `reqwest` client.
    #[serde(default)]
    pub timeout_secs: u64,

    /// Whether to follow redirects.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Headers sent with every request. Per-call headers take precedence.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

fn default_follow_redirects() -> bool {
    true
}

impl Default for HttpCallerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 0,
            follow_redirects: default_follow_redirects(),
            default_headers: HashMap::new(),
        }
    }
}

impl HttpCallerConfig {
    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Enable or disable redirect following.
    #[must_use]
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// The timeout as a [`Duration`], `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
