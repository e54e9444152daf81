use std::future::Future;
use std::time::Duration;

use clap::{Args, Subcommand};
use connector_aws::sqs::Message;
use connector_aws::{ConsumerConfig, SqsConfig, SqsQueue};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::print_json;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SqsArgs {
    #[command(subcommand)]
    pub command: SqsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SqsCommand {
    /// Send one message.
    Send {
        body: String,
        /// Message group (required by FIFO queues).
        #[arg(long, default_value = "")]
        group_id: String,
    },
    /// Print messages as they arrive until interrupted.
    Consume(ConsumeArgs),
}

#[derive(Args, Debug)]
pub struct ConsumeArgs {
    /// Stop after this many messages.
    #[arg(long)]
    pub max: Option<usize>,
    /// Delete each message after printing it.
    #[arg(long)]
    pub delete: bool,
    /// Messages per receive call (0 = default).
    #[arg(long, default_value_t = 0)]
    pub max_messages: i32,
    /// Long-poll seconds per receive call (0 = default).
    #[arg(long, default_value_t = 0)]
    pub wait_seconds: i32,
    /// Visibility timeout in seconds (0 = default).
    #[arg(long, default_value_t = 0)]
    pub visibility_timeout: i32,
    /// Seconds to wait after a failed receive (0 = default).
    #[arg(long, default_value_t = 0)]
    pub poll_interval_secs: u64,
}

impl ConsumeArgs {
    fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            max_messages: self.max_messages,
            wait_seconds: self.wait_seconds,
            visibility_timeout: self.visibility_timeout,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            buffer_size: 0,
        }
    }
}

pub async fn run(config: &SqsConfig, args: &SqsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let queue = SqsQueue::new(config.clone()).await?;

    match &args.command {
        SqsCommand::Send { body, group_id } => {
            let receipt = queue.send_message(body, group_id).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "message_id": receipt.message_id,
                    "sequence_number": receipt.sequence_number,
                    "deduplication_id": receipt.deduplication_id,
                }))?,
                OutputFormat::Text => println!(
                    "sent {}",
                    receipt.message_id.as_deref().unwrap_or("(no message id)")
                ),
            }
        }
        SqsCommand::Consume(consume) => {
            let interrupted = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            consume_messages(&queue, consume, format, interrupted).await?;
        }
    }
    Ok(())
}

/// Print messages until `shutdown` completes, the consumer closes, or
/// `--max` is reached. Returns how many messages were handled.
///
/// `shutdown` is created once and polled across iterations, so a signal that
/// arrives while a message is being printed or deleted is not lost.
async fn consume_messages(
    queue: &SqsQueue,
    args: &ConsumeArgs,
    format: &OutputFormat,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<usize> {
    let cancel = CancellationToken::new();
    let mut consumer = queue.consume(cancel.clone(), args.consumer_config())?;
    let mut received = 0usize;
    tokio::pin!(shutdown);

    loop {
        let message = tokio::select! {
            biased;
            () = &mut shutdown => {
                info!("interrupted");
                break;
            }
            message = consumer.recv() => message,
        };
        let Some(message) = message else { break };

        print_message(&message, format)?;
        if args.delete {
            if let Some(handle) = message.receipt_handle() {
                queue.delete_message(handle).await?;
            }
        }

        received += 1;
        if args.max.is_some_and(|max| received >= max) {
            break;
        }
    }

    cancel.cancel();
    consumer.shutdown().await?;
    info!(received, "consumer stopped");
    Ok(received)
}

fn print_message(message: &Message, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "message_id": message.message_id(),
            "body": message.body(),
        })),
        OutputFormat::Text => {
            println!(
                "{}\t{}",
                message.message_id().unwrap_or("-"),
                message.body().unwrap_or_default()
            );
            Ok(())
        }
    }
}
