use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use connector_aws::{S3Config, S3Store};

use super::print_json;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct S3Args {
    #[command(subcommand)]
    pub command: S3Command,
}

#[derive(Subcommand, Debug)]
pub enum S3Command {
    /// Create the configured bucket.
    CreateBucket,
    /// Delete the configured bucket (it must be empty).
    DeleteBucket,
    /// Upload a local file.
    Upload { key: String, path: PathBuf },
    /// Download an object to a local file.
    Download { key: String, path: PathBuf },
    /// Store inline text as an object.
    Put {
        key: String,
        #[arg(long)]
        text: String,
    },
    /// Print an object to stdout.
    Get { key: String },
    /// Delete an object.
    Delete { key: String },
}

pub async fn run(config: &S3Config, args: &S3Args, format: &OutputFormat) -> anyhow::Result<()> {
    let store = S3Store::new(config.clone()).await?;
    let bucket = store.bucket().to_owned();

    let (action, key) = match &args.command {
        S3Command::CreateBucket => {
            store.create_bucket().await?;
            ("bucket created", None)
        }
        S3Command::DeleteBucket => {
            store.delete_bucket().await?;
            ("bucket deleted", None)
        }
        S3Command::Upload { key, path } => {
            store.upload_file(key, path).await?;
            ("uploaded", Some(key))
        }
        S3Command::Download { key, path } => {
            store.download_file(key, path).await?;
            ("downloaded", Some(key))
        }
        S3Command::Put { key, text } => {
            store.put_bytes(key, text.clone().into_bytes()).await?;
            ("stored", Some(key))
        }
        S3Command::Get { key } => {
            let bytes = store.get_bytes(key).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "bucket": bucket,
                    "key": key,
                    "size": bytes.len(),
                    "body": String::from_utf8_lossy(&bytes),
                }))?,
                OutputFormat::Text => std::io::stdout().write_all(&bytes)?,
            }
            return Ok(());
        }
        S3Command::Delete { key } => {
            store.delete_file(key).await?;
            ("deleted", Some(key))
        }
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "bucket": bucket,
            "key": key,
            "result": action,
        }))?,
        OutputFormat::Text => match key {
            Some(key) => println!("s3://{bucket}/{key}: {action}"),
            None => println!("s3://{bucket}: {action}"),
        },
    }
    Ok(())
}
