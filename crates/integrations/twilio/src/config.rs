use serde::Deserialize;

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Delivery channel for outgoing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Sms,
    WhatsApp,
}

impl Channel {
    /// Format a phone number as a Twilio address for this channel.
    ///
    /// WhatsApp addresses carry a `whatsapp:` prefix; numbers that already
    /// have it are left alone.
    pub fn address(self, number: &str) -> String {
        match self {
            Channel::Sms => number.to_owned(),
            Channel::WhatsApp if number.starts_with(WHATSAPP_PREFIX) => number.to_owned(),
            Channel::WhatsApp => format!("{WHATSAPP_PREFIX}{number}"),
        }
    }
}

/// Configuration for the Twilio client.
#[derive(Clone, Deserialize)]
pub struct TwilioConfig {
    /// Twilio Account SID used to authenticate API requests.
    pub account_sid: String,

    /// Twilio Auth Token used for HTTP Basic authentication.
    pub auth_token: String,

    /// Sender phone number (E.164 format) or messaging service SID.
    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub channel: Channel,

    /// Base URL for the Twilio REST API. Override this for testing against a
    /// mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    "https://api.twilio.com".to_owned()
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from", &self.from)
            .field("channel", &self.channel)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl TwilioConfig {
    /// Create a new SMS configuration.
    ///
    /// Uses the default Twilio API base URL (`https://api.twilio.com`).
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
            channel: Channel::Sms,
            api_base_url: default_api_base_url(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
