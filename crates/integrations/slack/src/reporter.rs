use std::backtrace::Backtrace;

use axum::http::StatusCode;
use connector_core::{ConnectorError, HealthCheck, require_non_empty};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SlackConfig;
use crate::error::SlackError;
use crate::types::{SlackApiResponse, SlackAuthTestResponse, SlackPostMessageRequest};

/// Slack rejects `chat.postMessage` text beyond 40k characters; keep the
/// backtrace well under that.
const MAX_BACKTRACE_CHARS: usize = 3_000;

/// Posts error and panic reports to Slack channels.
///
/// Usually shared behind an `Arc` as the state of the
/// [`report_errors`](crate::report_errors) middleware, but the helpers can be
/// called directly from code that catches its own failures.
pub struct SlackReporter {
    config: SlackConfig,
    client: Client,
}

impl std::fmt::Debug for SlackReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackReporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SlackReporter {
    /// Create a reporter, failing if the token or either channel is empty.
    pub fn new(config: SlackConfig) -> Result<Self, SlackError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Self::with_client(config, client)
    }

    /// Create a reporter with a custom HTTP client.
    pub fn with_client(config: SlackConfig, client: Client) -> Result<Self, SlackError> {
        require_non_empty("token", &config.token)?;
        require_non_empty("channel_id", &config.channel_id)?;
        require_non_empty("critical_channel_id", &config.critical_channel_id)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.config.api_base_url.trim_end_matches('/'))
    }

    /// The channel a report with the given error text belongs in.
    pub fn channel_for(&self, error_text: &str) -> &str {
        if !self.config.critical_marker.is_empty()
            && error_text.contains(&self.config.critical_marker)
        {
            &self.config.critical_channel_id
        } else {
            &self.config.channel_id
        }
    }

    /// Send a `chat.postMessage` request and interpret the response.
    pub async fn post_message(
        &self,
        text: &str,
        channel: &str,
    ) -> Result<SlackApiResponse, SlackError> {
        let request = SlackPostMessageRequest {
            channel: channel.to_owned(),
            text: text.to_owned(),
            unfurl_links: true,
        };

        debug!(channel, "posting message to Slack");

        let response = self
            .client
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Slack API rate limit hit");
            return Err(SlackError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("HTTP {status}: {body}")));
        }

        let api_response: SlackApiResponse = response.json().await?;

        if !api_response.ok {
            let error_code = api_response
                .error
                .unwrap_or_else(|| "unknown_error".to_owned());
            return Err(SlackError::Api(error_code));
        }

        Ok(api_response)
    }

    /// Report a panic raised while serving `method path`.
    #[instrument(skip(self, panic_text))]
    pub async fn handle_panic(&self, panic_text: &str, path: &str, method: &str) {
        let backtrace = Backtrace::force_capture().to_string();
        let message = format_panic_message(
            path,
            method,
            panic_text,
            &chrono::Utc::now().to_rfc3339(),
            truncate(&backtrace, MAX_BACKTRACE_CHARS),
        );
        self.dispatch(&message, self.channel_for(panic_text)).await;
    }

    /// Report an error response. `error_text` is usually the result of
    /// [`error_text`](Self::error_text) on the response body.
    #[instrument(skip(self, status, error_text), fields(status = status.as_u16()))]
    pub async fn handle_error(
        &self,
        status: StatusCode,
        error_text: &str,
        path: &str,
        method: &str,
    ) {
        let message = format_error_message(path, method, status, error_text);
        self.dispatch(&message, self.channel_for(error_text)).await;
    }

    /// Extract the text to report from an error response body.
    ///
    /// Prefers the configured JSON error field, then the message field, then
    /// the raw body, then the canonical reason phrase of `status`. A field
    /// holding an empty string ends the JSON lookup, so an empty `error` goes
    /// straight to the raw body without consulting `message`.
    pub fn error_text(&self, status: StatusCode, body: &[u8]) -> String {
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
            for field in [&self.config.error_field, &self.config.message_field] {
                match map.get(field.as_str()) {
                    None | Some(Value::Null) => {}
                    Some(Value::String(s)) if s.is_empty() => break,
                    Some(Value::String(s)) => return s.clone(),
                    Some(other) => return other.to_string(),
                }
            }
        }

        let raw = String::from_utf8_lossy(body);
        if raw.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown Status").to_owned()
        } else {
            raw.into_owned()
        }
    }

    async fn dispatch(&self, message: &str, channel: &str) {
        if self.config.debug {
            info!(channel, message, "debug mode, Slack message not posted");
            return;
        }
        if let Err(e) = self.post_message(message, channel).await {
            error!(channel, error = %e, "failed to post report to Slack");
        }
    }
}

impl HealthCheck for SlackReporter {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "slack"
    }

    async fn health_check(&self) -> Result<(), ConnectorError> {
        debug!("performing Slack health check via auth.test");

        let response = self
            .client
            .post(self.api_url("auth.test"))
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(SlackError::from)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ConnectorError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Connection(format!("HTTP {status}: {body}")));
        }

        let auth_response: SlackAuthTestResponse = response.json().await.map_err(|e| {
            ConnectorError::Connection(format!("failed to parse auth.test response: {e}"))
        })?;

        if !auth_response.ok {
            let error_code = auth_response
                .error
                .unwrap_or_else(|| "unknown_error".to_owned());
            return Err(ConnectorError::Configuration(format!(
                "Slack auth.test failed: {error_code}"
            )));
        }

        debug!(
            user_id = auth_response.user_id.as_deref().unwrap_or("unknown"),
            team_id = auth_response.team_id.as_deref().unwrap_or("unknown"),
            "Slack health check passed"
        );

        Ok(())
    }
}

pub(crate) fn format_panic_message(
    path: &str,
    method: &str,
    panic_text: &str,
    time: &str,
    backtrace: &str,
) -> String {
    format!(
        "*PANIC CAPTURED* :skull:\n\
         *Route:* `{path}`\n\
         *Method:* `{method}`\n\
         *Error:* `{panic_text}`\n\
         *Time:* `{time}`\n\
         *Backtrace:* ```{backtrace}```"
    )
}

pub(crate) fn format_error_message(
    path: &str,
    method: &str,
    status: StatusCode,
    error_text: &str,
) -> String {
    format!(
        "*:warning: ERROR CAPTURED*\n\
         • *Route:* `{path}`\n\
         • *Method:* `{method}`\n\
         • *Status:* {}\n\
         • *Error:* ```{error_text}```",
        status.as_u16()
    )
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
