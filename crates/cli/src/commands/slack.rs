use clap::{Args, Subcommand};
use connector_slack::{SlackConfig, SlackReporter};

use super::print_json;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SlackArgs {
    #[command(subcommand)]
    pub command: SlackCommand,
}

#[derive(Subcommand, Debug)]
pub enum SlackCommand {
    /// Post a message. It goes to the critical channel when it contains the
    /// critical marker, unless a channel is given.
    Post {
        text: String,
        #[arg(long)]
        channel: Option<String>,
    },
}

pub async fn run(
    config: &SlackConfig,
    args: &SlackArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let reporter = SlackReporter::new(config.clone())?;

    match &args.command {
        SlackCommand::Post { text, channel } => {
            let channel = channel
                .as_deref()
                .unwrap_or_else(|| reporter.channel_for(text));
            let response = reporter.post_message(text, channel).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "channel": response.channel,
                    "ts": response.ts,
                }))?,
                OutputFormat::Text => println!(
                    "posted to {} at {}",
                    response.channel.as_deref().unwrap_or(channel),
                    response.ts.as_deref().unwrap_or("-")
                ),
            }
        }
    }
    Ok(())
}
