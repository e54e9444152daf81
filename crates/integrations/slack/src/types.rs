use serde::{Deserialize, Serialize};

/// Request body for the `chat.postMessage` Slack Web API method.
#[derive(Debug, Clone, Serialize)]
pub struct SlackPostMessageRequest {
    pub channel: String,
    pub text: String,
    /// Let Slack expand links in the report.
    pub unfurl_links: bool,
}

/// Response from `chat.postMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// Response from `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackAuthTestResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}
