use std::sync::Arc;
use std::time::Duration;

use aws_sdk_sqs::types::Message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::transport::{QueueTransport, ReceiveRequest};
use crate::error::AwsError;

const DEFAULT_MAX_MESSAGES: i32 = 10;
const DEFAULT_WAIT_SECONDS: i32 = 10;
const DEFAULT_VISIBILITY_TIMEOUT: i32 = 30;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_BUFFER_SIZE: usize = 20;

/// Tuning of a consumer loop.
///
/// Every field is defaulted independently when zero or negative, see
/// [`ConsumerConfig::normalized`]. `ConsumerConfig::default()` therefore
/// means "all defaults".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Messages requested per receive call (default 10, SQS caps it at 10).
    pub max_messages: i32,
    /// Long-poll duration of each receive call, in seconds (default 10).
    pub wait_seconds: i32,
    /// Seconds a received message stays hidden from other consumers
    /// (default 30).
    pub visibility_timeout: i32,
    /// Pause after a failed receive before trying again (default 5 s).
    pub poll_interval: Duration,
    /// Capacity of the message channel (default 20).
    pub buffer_size: usize,
}

impl ConsumerConfig {
    /// Replace every unset (zero or negative) field by its default.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            max_messages: positive_or(self.max_messages, DEFAULT_MAX_MESSAGES),
            wait_seconds: positive_or(self.wait_seconds, DEFAULT_WAIT_SECONDS),
            visibility_timeout: positive_or(self.visibility_timeout, DEFAULT_VISIBILITY_TIMEOUT),
            poll_interval: if self.poll_interval.is_zero() {
                DEFAULT_POLL_INTERVAL
            } else {
                self.poll_interval
            },
            buffer_size: if self.buffer_size == 0 {
                DEFAULT_BUFFER_SIZE
            } else {
                self.buffer_size
            },
        }
    }
}

fn positive_or(value: i32, default: i32) -> i32 {
    if value > 0 { value } else { default }
}

/// Handle on the background task of a consumer.
#[derive(Debug)]
pub struct ConsumerWorker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ConsumerWorker {
    /// Ask the task to stop. The message channel closes once it has.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the task has already stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to stop on its own.
    pub async fn join(self) -> Result<(), AwsError> {
        self.task
            .await
            .map_err(|e| AwsError::Worker(e.to_string()))
    }

    /// Cancel the task and wait for it to stop.
    pub async fn shutdown(self) -> Result<(), AwsError> {
        self.cancel();
        self.join().await
    }
}

/// A running consumer: the receiving end of the message channel plus the
/// handle on the task that fills it.
#[derive(Debug)]
pub struct Consumer {
    messages: mpsc::Receiver<Message>,
    worker: ConsumerWorker,
}

impl Consumer {
    /// Wait for the next message. `None` once the task has stopped and every
    /// buffered message has been read.
    pub async fn recv(&mut self) -> Option<Message> {
        self.messages.recv().await
    }

    /// Take a buffered message without waiting.
    pub fn try_recv(&mut self) -> Result<Message, mpsc::error::TryRecvError> {
        self.messages.try_recv()
    }

    pub fn worker(&self) -> &ConsumerWorker {
        &self.worker
    }

    /// Split into the raw channel receiver and the worker handle.
    pub fn into_parts(self) -> (mpsc::Receiver<Message>, ConsumerWorker) {
        (self.messages, self.worker)
    }

    /// Stop the task and wait for it. Buffered messages are discarded.
    pub async fn shutdown(self) -> Result<(), AwsError> {
        self.worker.shutdown().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Cancelled,
    ReceiverDropped,
}

pub(super) fn spawn(
    transport: Arc<dyn QueueTransport>,
    request: ReceiveRequest,
    config: &ConsumerConfig,
    cancel: CancellationToken,
) -> Consumer {
    let (tx, rx) = mpsc::channel(config.buffer_size);
    let span = info_span!("sqs_consumer", queue_url = %request.queue_url);
    let task = tokio::spawn(
        {
            let cancel = cancel.clone();
            let poll_interval = config.poll_interval;
            async move {
                info!("SQS consumer started");
                let reason = run(transport.as_ref(), &request, poll_interval, &tx, &cancel).await;
                info!(reason = ?reason, "SQS consumer stopped");
            }
        }
        .instrument(span),
    );

    Consumer {
        messages: rx,
        worker: ConsumerWorker { cancel, task },
    }
}

async fn run(
    transport: &dyn QueueTransport,
    request: &ReceiveRequest,
    poll_interval: Duration,
    tx: &mpsc::Sender<Message>,
    cancel: &CancellationToken,
) -> StopReason {
    loop {
        if cancel.is_cancelled() {
            return StopReason::Cancelled;
        }
        if tx.is_closed() {
            return StopReason::ReceiverDropped;
        }

        let received = tokio::select! {
            biased;
            () = cancel.cancelled() => return StopReason::Cancelled,
            result = transport.receive(request) => result,
        };

        let messages = match received {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, retry_in = ?poll_interval, "failed to receive SQS messages");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return StopReason::Cancelled,
                    () = tokio::time::sleep(poll_interval) => {}
                }
                continue;
            }
        };

        if messages.is_empty() {
            continue;
        }
        debug!(count = messages.len(), "received SQS messages");

        for message in messages {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return StopReason::Cancelled,
                sent = tx.send(message) => {
                    if sent.is_err() {
                        return StopReason::ReceiverDropped;
                    }
                }
            }
        }
    }
}
