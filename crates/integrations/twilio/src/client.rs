use std::time::Duration;

use connector_core::{ConnectorError, HealthCheck, require_non_empty};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::TwilioConfig;
use crate::error::TwilioError;
use crate::report::SendManyReport;
use crate::types::{
    MessageReceipt, TwilioApiResponse, TwilioErrorBody, TwilioSendMessageRequest,
};

/// Sends SMS or WhatsApp messages through the Twilio REST API.
pub struct TwilioClient {
    config: TwilioConfig,
    client: Client,
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TwilioClient {
    /// Create a client, failing if the Account SID or Auth Token is empty.
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Self::with_client(config, client)
    }

    /// Create a client with a custom HTTP client.
    ///
    /// Useful for testing or for sharing a connection pool across adapters.
    pub fn with_client(config: TwilioConfig, client: Client) -> Result<Self, TwilioError> {
        require_non_empty("account_sid", &config.account_sid)?;
        require_non_empty("auth_token", &config.auth_token)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    /// Build the Messages API URL for this account.
    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Build the Account info URL (used for health checks).
    fn account_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Send `body` to `to` over the configured channel.
    #[instrument(skip(self, body), fields(channel = ?self.config.channel))]
    pub async fn send_message(&self, to: &str, body: &str) -> Result<MessageReceipt, TwilioError> {
        if to.trim().is_empty() {
            return Err(TwilioError::InvalidMessage("recipient number is empty".into()));
        }

        let channel = self.config.channel;
        let request = TwilioSendMessageRequest {
            to: channel.address(to),
            from: channel.address(&self.config.from),
            body: body.to_owned(),
        };

        debug!(to = %request.to, "sending message via Twilio");

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Twilio API rate limit hit");
            return Err(TwilioError::RateLimited);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api(api_error_message(status, &text)));
        }

        let api_response: TwilioApiResponse = response.json().await?;

        if let Some(code) = api_response.error_code {
            let msg = api_response
                .error_message
                .unwrap_or_else(|| format!("error code {code}"));
            return Err(TwilioError::Api(msg));
        }

        let receipt = MessageReceipt {
            to: to.to_owned(),
            sid: api_response.sid.unwrap_or_default(),
            status: api_response.status.unwrap_or_default(),
        };
        info!(sid = %receipt.sid, status = %receipt.status, "message accepted by Twilio");
        Ok(receipt)
    }

    /// Send the same `body` to every number, one after another.
    ///
    /// All recipients are attempted; see [`SendManyReport::into_result`] to
    /// turn the report into an error carrying every failure.
    pub async fn send_many_messages<S: AsRef<str>>(
        &self,
        numbers: &[S],
        body: &str,
    ) -> SendManyReport {
        let mut report = SendManyReport::default();
        for number in numbers {
            let number = number.as_ref();
            let result = self.send_message(number, body).await;
            if let Err(e) = &result {
                warn!(to = number, error = %e, "failed to send message");
            }
            report.record(number, result);
        }
        report
    }
}

/// Prefer Twilio's `code` and `message` over the raw body.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<TwilioErrorBody>(body) {
        Ok(TwilioErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("HTTP {status}: {code} {message}"),
        _ => format!("HTTP {status}: {body}"),
    }
}

impl HealthCheck for TwilioClient {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "twilio"
    }

    async fn health_check(&self) -> Result<(), ConnectorError> {
        debug!("performing Twilio health check via account lookup");

        let response = self
            .client
            .get(self.account_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .map_err(TwilioError::from)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ConnectorError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Connection(format!("HTTP {status}: {body}")));
        }

        debug!("Twilio health check passed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::config::Channel;

    /// A minimal mock HTTP server built on tokio that returns canned responses.
    struct MockTwilioServer {
        listener: tokio::net::TcpListener,
        base_url: String,
    }

    impl MockTwilioServer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}");
            Self { listener, base_url }
        }

        async fn respond_once(self, status_code: u16, body: &str) -> String {
            let mut requests = self.respond_sequence(&[(status_code, body)]).await;
            requests.remove(0)
        }

        /// Answer one connection per entry, in order, and return the raw
        /// requests.
        async fn respond_sequence(self, responses: &[(u16, &str)]) -> Vec<String> {
            let mut requests = Vec::with_capacity(responses.len());
            for (status_code, body) in responses {
                let (mut stream, _) = self.listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);

                let response = format!(
                    "HTTP/1.1 {status_code} OK\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        }
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        l.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    const QUEUED: &str =
        r#"{"sid":"SM123","status":"queued","error_code":null,"error_message":null}"#;

    fn client(base_url: &str) -> TwilioClient {
        TwilioClient::new(
            TwilioConfig::new("AC123", "token", "+15551234567").with_api_base_url(base_url),
        )
        .unwrap()
    }

    #[test]
    fn new_requires_credentials() {
        let err = TwilioClient::new(TwilioConfig::new("", "token", "+1")).unwrap_err();
        assert!(matches!(err, TwilioError::Configuration(ref m) if m.contains("account_sid")));

        let err = TwilioClient::new(TwilioConfig::new("AC1", "", "+1")).unwrap_err();
        assert!(matches!(err, TwilioError::Configuration(ref m) if m.contains("auth_token")));
    }

    #[test]
    fn client_name() {
        assert_eq!(client("http://unused").name(), "twilio");
    }

    #[tokio::test]
    async fn send_message_success() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let handle = tokio::spawn(async move { server.respond_once(201, QUEUED).await });

        let receipt = client.send_message("+15559876543", "Hello!").await.unwrap();
        let request = handle.await.unwrap();

        assert_eq!(receipt.sid, "SM123");
        assert_eq!(receipt.status, "queued");
        assert_eq!(receipt.to, "+15559876543");
        assert!(request.starts_with("POST /2010-04-01/Accounts/AC123/Messages.json "));
        // "AC123:token" in base64.
        assert!(request.contains("QUMxMjM6dG9rZW4="));
        assert!(request.contains("To=%2B15559876543&From=%2B15551234567&Body=Hello%21"));
    }

    #[tokio::test]
    async fn whatsapp_channel_prefixes_addresses() {
        let server = MockTwilioServer::start().await;
        let client = TwilioClient::new(
            TwilioConfig::new("AC123", "token", "+15551234567")
                .with_channel(Channel::WhatsApp)
                .with_api_base_url(&server.base_url),
        )
        .unwrap();
        let handle = tokio::spawn(async move { server.respond_once(201, QUEUED).await });

        client.send_message("+15559876543", "Hi").await.unwrap();
        let request = handle.await.unwrap();

        assert!(request.contains("To=whatsapp%3A%2B15559876543"));
        assert!(request.contains("From=whatsapp%3A%2B15551234567"));
    }

    #[tokio::test]
    async fn empty_recipient_is_rejected_locally() {
        let client = client("http://unused");
        let err = client.send_message("  ", "Hi").await.unwrap_err();
        assert!(matches!(err, TwilioError::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn api_error_uses_twilio_message() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let handle = tokio::spawn(async move {
            server
                .respond_once(
                    400,
                    r#"{"code":21211,"message":"Invalid 'To' Phone Number","status":400}"#,
                )
                .await
        });

        let err = client.send_message("+1", "Hi").await.unwrap_err();
        handle.await.unwrap();

        let TwilioError::Api(msg) = err else {
            panic!("expected Api error, got {err:?}");
        };
        assert!(msg.contains("21211 Invalid 'To' Phone Number"));
    }

    #[tokio::test]
    async fn rate_limited() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let handle = tokio::spawn(async move {
            server
                .respond_once(429, r#"{"code":20429,"message":"Too Many Requests"}"#)
                .await
        });

        let err = client.send_message("+15559876543", "Hi").await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, TwilioError::RateLimited));
    }

    #[tokio::test]
    async fn send_many_collects_every_failure() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let handle = tokio::spawn(async move {
            server
                .respond_sequence(&[
                    (400, r#"{"code":21211,"message":"Invalid 'To' Phone Number"}"#),
                    (201, QUEUED),
                    (429, r#"{"code":20429,"message":"Too Many Requests"}"#),
                ])
                .await
        });

        let report = client
            .send_many_messages(&["+15550000001", "+15550000002", "+15550000003"], "Hi")
            .await;
        let requests = handle.await.unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.sent.len(), 1);
        assert_eq!(report.sent[0].to, "+15550000002");
        assert!(matches!(report.failures["+15550000001"], TwilioError::Api(_)));
        assert!(matches!(report.failures["+15550000003"], TwilioError::RateLimited));

        let err = report.into_result().unwrap_err();
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.to_string(), "2 of 3 messages failed");
    }

    #[tokio::test]
    async fn send_many_counts_repeated_recipients() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let bad = r#"{"code":21211,"message":"Invalid 'To' Phone Number"}"#;
        let handle = tokio::spawn(async move {
            server
                .respond_sequence(&[(400, bad), (400, bad), (400, bad)])
                .await
        });

        let report = client
            .send_many_messages(&["+15550000001", "+15550000001", "+15550000002"], "Hi")
            .await;
        let requests = handle.await.unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.failures.len(), 2);

        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "3 of 3 messages failed");
    }

    #[tokio::test]
    async fn health_check_success() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let handle = tokio::spawn(async move {
            server
                .respond_once(200, r#"{"sid":"AC123","status":"active"}"#)
                .await
        });

        client.health_check().await.unwrap();
        let request = handle.await.unwrap();
        assert!(request.starts_with("GET /2010-04-01/Accounts/AC123.json "));
    }

    #[tokio::test]
    async fn health_check_auth_failure() {
        let server = MockTwilioServer::start().await;
        let client = client(&server.base_url);
        let handle = tokio::spawn(async move {
            server
                .respond_once(401, r#"{"code":20003,"message":"Authenticate"}"#)
                .await
        });

        let err = client.health_check().await.unwrap_err();
        handle.await.unwrap();
        assert!(matches!(err, ConnectorError::Connection(_)));
    }
}
