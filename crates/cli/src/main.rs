//! Connector CLI
//!
//! Loads a TOML configuration file and exposes every adapter operation as a
//! subcommand, for operators and smoke tests.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ConnectorConfig;

/// Connector CLI: drive the connector adapters from the command line.
#[derive(Parser, Debug)]
#[command(name = "connector", version, about)]
struct Cli {
    /// Path of the TOML configuration file.
    #[arg(
        long,
        env = "CONNECTOR_CONFIG",
        default_value = "connector.toml",
        global = true
    )]
    config: PathBuf,

    /// Emit logs as JSON lines (overrides `[telemetry] json`).
    #[arg(long, env = "CONNECTOR_JSON_LOGS", global = true)]
    json_logs: bool,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe every configured adapter.
    Health,
    /// Object storage operations on the configured bucket.
    S3(commands::s3::S3Args),
    /// Send to or consume from the configured queue.
    Sqs(commands::sqs::SqsArgs),
    /// Send one HTTP request.
    Http(commands::http::HttpArgs),
    /// Database connectivity.
    Db(commands::db::DbArgs),
    /// Render and send templated email.
    Email(commands::email::EmailArgs),
    /// Post to the configured Slack channels.
    Slack(commands::slack::SlackArgs),
    /// Send SMS or WhatsApp messages.
    Sms(commands::sms::SmsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConnectorConfig::load_or_default(&cli.config)?;
    if cli.json_logs {
        config.telemetry.json = true;
    }
    connector_core::telemetry::init(&config.telemetry);

    match cli.command {
        Command::Health => commands::health::run(&config, &cli.format).await,
        Command::S3(args) => commands::s3::run(config.s3()?, &args, &cli.format).await,
        Command::Sqs(args) => commands::sqs::run(config.sqs()?, &args, &cli.format).await,
        Command::Http(args) => commands::http::run(&config.http, &args, &cli.format).await,
        Command::Db(args) => commands::db::run(config.database()?, &args, &cli.format).await,
        Command::Email(args) => commands::email::run(config.email()?, &args, &cli.format).await,
        Command::Slack(args) => commands::slack::run(config.slack()?, &args, &cli.format).await,
        Command::Sms(args) => commands::sms::run(config.twilio()?, &args, &cli.format).await,
    }
}
