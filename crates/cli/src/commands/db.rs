use clap::{Args, Subcommand};
use connector_db::DatabaseConfig;

use super::print_json;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Open a pool and run `SELECT 1`.
    Ping,
    /// Print the connection string with the password masked.
    Dsn,
}

pub async fn run(
    config: &DatabaseConfig,
    args: &DbArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        DbCommand::Ping => {
            let pool = connector_db::connect(config.clone())?;
            connector_db::ping(&pool).await?;
            pool.close().await;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "healthy": true }))?,
                OutputFormat::Text => println!("database is reachable"),
            }
        }
        DbCommand::Dsn => {
            let dsn = config.clone().normalized().redacted_dsn();
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "dsn": dsn }))?,
                OutputFormat::Text => println!("{dsn}"),
            }
        }
    }
    Ok(())
}
