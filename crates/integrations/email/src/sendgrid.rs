use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::backend::{EmailBackend, EmailMessage, EmailResult};
use crate::config::SendGridConfig;
use crate::error::EmailError;
use crate::types::SendGridMailRequest;

/// `SendGrid` v3 Web API delivery backend.
pub struct SendGridBackend {
    config: SendGridConfig,
    client: Client,
}

impl std::fmt::Debug for SendGridBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SendGridBackend {
    pub fn new(config: SendGridConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a backend with a custom HTTP client.
    pub fn with_client(config: SendGridConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmailBackend for SendGridBackend {
    async fn send(&self, message: &EmailMessage) -> Result<EmailResult, EmailError> {
        let request = SendGridMailRequest::from(message);
        debug!(to = %message.to, subject = %message.subject, "sending email via SendGrid");

        let response = self
            .client
            .post(self.url("/v3/mail/send"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("SendGrid API rate limit hit");
            return Err(EmailError::RateLimited);
        }
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "SendGrid rejected the email");
            return Err(EmailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        info!(to = %message.to, message_id = ?message_id, "email accepted by SendGrid");
        Ok(EmailResult {
            message_id,
            status: "queued".to_owned(),
        })
    }

    async fn health_check(&self) -> Result<(), EmailError> {
        debug!("performing SendGrid health check");
        let response = self
            .client
            .get(self.url("/v3/scopes"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                body,
            });
        }
        info!("SendGrid health check passed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sendgrid"
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    struct MockSendGridServer {
        listener: tokio::net::TcpListener,
        base_url: String,
    }

    impl MockSendGridServer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}");
            Self { listener, base_url }
        }

        /// Accept one connection, answer it, and return the raw request.
        async fn respond_once(self, status_code: u16, body: &str) -> String {
            let (mut stream, _) = self.listener.accept().await.unwrap();

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

            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 X-Message-Id: sg-msg-1\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            from: "orders@example.com".into(),
            from_name: Some("Orders".into()),
            to: "maria@example.com".into(),
            to_name: Some("Maria".into()),
            subject: "Your order".into(),
            body: Some("plain".into()),
            html_body: Some("<p>html</p>".into()),
        }
    }

    #[tokio::test]
    async fn send_accepted() {
        let server = MockSendGridServer::start().await;
        let backend =
            SendGridBackend::new(SendGridConfig::new("SG.key").with_api_base_url(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(202, "").await });

        let result = backend.send(&message()).await.unwrap();
        let request = handle.await.unwrap();

        assert_eq!(result.message_id.as_deref(), Some("sg-msg-1"));
        assert_eq!(result.status, "queued");
        assert!(request.starts_with("POST /v3/mail/send "));
        assert!(request.to_lowercase().contains("authorization: bearer sg.key"));
        assert!(request.contains(r#""subject":"Your order""#));
    }

    #[tokio::test]
    async fn status_400_is_error() {
        let server = MockSendGridServer::start().await;
        let backend =
            SendGridBackend::new(SendGridConfig::new("SG.key").with_api_base_url(&server.base_url));
        let handle = tokio::spawn(async move {
            server
                .respond_once(400, r#"{"errors":[{"message":"bad from"}]}"#)
                .await
        });

        let err = backend.send(&message()).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, EmailError::Api { status: 400, ref body } if body.contains("bad from")));
    }

    #[tokio::test]
    async fn status_429_is_rate_limited() {
        let server = MockSendGridServer::start().await;
        let backend =
            SendGridBackend::new(SendGridConfig::new("SG.key").with_api_base_url(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(429, "{}").await });

        let err = backend.send(&message()).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, EmailError::RateLimited));
    }

    #[tokio::test]
    async fn health_check_uses_scopes() {
        let server = MockSendGridServer::start().await;
        let backend =
            SendGridBackend::new(SendGridConfig::new("SG.key").with_api_base_url(&server.base_url));
        let handle =
            tokio::spawn(async move { server.respond_once(200, r#"{"scopes":[]}"#).await });

        backend.health_check().await.unwrap();
        let request = handle.await.unwrap();
        assert!(request.starts_with("GET /v3/scopes "));
    }

    #[test]
    fn debug_hides_api_key() {
        let backend = SendGridBackend::new(SendGridConfig::new("SG.very-secret"));
        assert!(!format!("{backend:?}").contains("very-secret"));
        assert_eq!(backend.backend_name(), "sendgrid");
    }
}
