use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{Message, QueueAttributeName};

use crate::error::{AwsError, sdk_failure};

/// Parameters of one receive (long-poll) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub queue_url: String,
    pub max_messages: i32,
    pub wait_seconds: i32,
    pub visibility_timeout: i32,
}

/// A message ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub queue_url: String,
    pub body: String,
    /// Message group; `None` for standard queues.
    pub group_id: Option<String>,
    pub deduplication_id: String,
}

/// What SQS returned for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
    /// Only set by FIFO queues.
    pub sequence_number: Option<String>,
    /// The deduplication id attached to the message.
    pub deduplication_id: String,
}

/// The calls [`SqsQueue`](super::SqsQueue) makes against a queue.
///
/// [`SdkTransport`] is the production implementation; the trait exists so
/// the consumer loop can be driven by a scripted transport.
#[async_trait]
pub trait QueueTransport: Send + Sync + std::fmt::Debug {
    /// Receive up to `max_messages` messages, waiting at most `wait_seconds`.
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<Message>, AwsError>;

    /// Send a single message.
    async fn send(&self, request: &SendRequest) -> Result<SendReceipt, AwsError>;

    /// Delete a message by receipt handle.
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), AwsError>;

    /// Check that the queue exists and is reachable.
    async fn probe(&self, queue_url: &str) -> Result<(), AwsError>;
}

/// [`QueueTransport`] backed by the AWS SDK client.
#[derive(Clone)]
pub struct SdkTransport {
    client: aws_sdk_sqs::Client,
}

impl SdkTransport {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for SdkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkTransport")
            .field("client", &"<SqsClient>")
            .finish()
    }
}

#[async_trait]
impl QueueTransport for SdkTransport {
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<Message>, AwsError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&request.queue_url)
            .max_number_of_messages(request.max_messages)
            .wait_time_seconds(request.wait_seconds)
            .visibility_timeout(request.visibility_timeout)
            .send()
            .await
            .map_err(|e| {
                sdk_failure("sqs", "receive_message", &DisplayErrorContext(&e).to_string())
            })?;

        Ok(output.messages.unwrap_or_default())
    }

    async fn send(&self, request: &SendRequest) -> Result<SendReceipt, AwsError> {
        let output = self
            .client
            .send_message()
            .queue_url(&request.queue_url)
            .message_body(&request.body)
            .message_deduplication_id(&request.deduplication_id)
            .set_message_group_id(request.group_id.clone())
            .send()
            .await
            .map_err(|e| {
                sdk_failure("sqs", "send_message", &DisplayErrorContext(&e).to_string())
            })?;

        Ok(SendReceipt {
            message_id: output.message_id().map(String::from),
            sequence_number: output.sequence_number().map(String::from),
            deduplication_id: request.deduplication_id.clone(),
        })
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), AwsError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                sdk_failure("sqs", "delete_message", &DisplayErrorContext(&e).to_string())
            })?;
        Ok(())
    }

    async fn probe(&self, queue_url: &str) -> Result<(), AwsError> {
        self.client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| {
                sdk_failure(
                    "sqs",
                    "get_queue_attributes",
                    &DisplayErrorContext(&e).to_string(),
                )
            })?;
        Ok(())
    }
}
