//! SQS producer and consumer.
//!
//! [`SqsQueue`] is bound to one queue URL. It sends messages with a fresh
//! deduplication id per call and, through [`SqsQueue::consume`], runs a
//! background task that long-polls the queue and forwards every received
//! message into a bounded channel until cancelled.

mod consumer;
mod transport;

use std::sync::Arc;

use connector_core::{ConnectorError, HealthCheck};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::AwsError;

pub use aws_sdk_sqs::types::Message;
pub use consumer::{Consumer, ConsumerConfig, ConsumerWorker};
pub use transport::{QueueTransport, ReceiveRequest, SdkTransport, SendReceipt, SendRequest};

/// Configuration for the SQS queue adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqsConfig {
    /// Shared AWS configuration (region, credentials, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// URL of the queue every operation targets.
    pub queue_url: String,
}

impl SqsConfig {
    /// Create a new `SqsConfig` for the given region and queue URL.
    pub fn new(region: impl Into<String>, queue_url: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            queue_url: queue_url.into(),
        }
    }

    /// Use static credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.aws = self.aws.with_credentials(access_key_id, secret_access_key);
        self
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// A single SQS queue, used both to produce and to consume.
#[derive(Debug, Clone)]
pub struct SqsQueue {
    config: SqsConfig,
    transport: Arc<dyn QueueTransport>,
}

impl SqsQueue {
    /// Create a new `SqsQueue` by building an AWS SDK client.
    ///
    /// The client is built once and shared by every send, receive and
    /// delete issued through this queue.
    pub async fn new(config: SqsConfig) -> Result<Self, AwsError> {
        let sdk_config = build_sdk_config(&config.aws).await?;
        let client = aws_sdk_sqs::Client::new(&sdk_config);
        Ok(Self::with_client(config, client))
    }

    /// Create an `SqsQueue` with a pre-built client.
    pub fn with_client(config: SqsConfig, client: aws_sdk_sqs::Client) -> Self {
        Self::with_transport(config, Arc::new(SdkTransport::new(client)))
    }

    /// Create an `SqsQueue` over any [`QueueTransport`].
    pub fn with_transport(config: SqsConfig, transport: Arc<dyn QueueTransport>) -> Self {
        Self { config, transport }
    }

    /// The queue URL this adapter targets.
    pub fn queue_url(&self) -> &str {
        &self.config.queue_url
    }

    /// Send `payload` to the queue.
    ///
    /// The body must be valid UTF-8 (an SQS requirement). A fresh UUID v4 is
    /// attached as the deduplication id on every call, and `group_id` is set
    /// as the message group when non-empty (required by FIFO queues).
    #[instrument(skip(self, payload), fields(provider = "aws-sqs", queue_url = %self.config.queue_url))]
    pub async fn send_message(
        &self,
        payload: impl AsRef<[u8]>,
        group_id: &str,
    ) -> Result<SendReceipt, AwsError> {
        self.ensure_queue_url()?;

        let body = std::str::from_utf8(payload.as_ref())
            .map_err(|e| AwsError::InvalidPayload(format!("SQS body must be UTF-8: {e}")))?;

        let request = SendRequest {
            queue_url: self.config.queue_url.clone(),
            body: body.to_owned(),
            group_id: (!group_id.is_empty()).then(|| group_id.to_owned()),
            deduplication_id: uuid::Uuid::new_v4().to_string(),
        };

        debug!(
            size = request.body.len(),
            deduplication_id = %request.deduplication_id,
            "sending SQS message"
        );
        let receipt = self.transport.send(&request).await?;

        info!(message_id = ?receipt.message_id, "SQS message sent");
        Ok(receipt)
    }

    /// Start a background consumer.
    ///
    /// Returns immediately with a [`Consumer`] whose channel receives every
    /// message the task polls, in receipt order. The task stops when `cancel`
    /// (or the worker's own token) is cancelled, or when the receiver is
    /// dropped. Must be called from within a tokio runtime.
    pub fn consume(
        &self,
        cancel: CancellationToken,
        config: ConsumerConfig,
    ) -> Result<Consumer, AwsError> {
        self.ensure_queue_url()?;

        let config = config.normalized();
        let request = ReceiveRequest {
            queue_url: self.config.queue_url.clone(),
            max_messages: config.max_messages,
            wait_seconds: config.wait_seconds,
            visibility_timeout: config.visibility_timeout,
        };

        Ok(consumer::spawn(
            Arc::clone(&self.transport),
            request,
            &config,
            cancel.child_token(),
        ))
    }

    /// Delete a consumed message using its receipt handle.
    #[instrument(skip(self, receipt_handle), fields(provider = "aws-sqs", queue_url = %self.config.queue_url))]
    pub async fn delete_message(&self, receipt_handle: &str) -> Result<(), AwsError> {
        self.ensure_queue_url()?;
        self.transport
            .delete(&self.config.queue_url, receipt_handle)
            .await?;
        debug!("SQS message deleted");
        Ok(())
    }

    fn ensure_queue_url(&self) -> Result<(), AwsError> {
        connector_core::require_non_empty("queue_url", &self.config.queue_url)
            .map_err(|e| AwsError::Configuration(e.to_string()))
    }
}

impl HealthCheck for SqsQueue {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "aws-sqs"
    }

    #[instrument(skip(self), fields(provider = "aws-sqs"))]
    async fn health_check(&self) -> Result<(), ConnectorError> {
        debug!("performing SQS health check");
        self.ensure_queue_url()?;
        self.transport.probe(&self.config.queue_url).await?;
        info!("SQS health check passed");
        Ok(())
    }
}
