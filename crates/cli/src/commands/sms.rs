use clap::{Args, Subcommand};
use connector_twilio::{TwilioClient, TwilioConfig};

use super::print_json;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SmsArgs {
    #[command(subcommand)]
    pub command: SmsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SmsCommand {
    /// Send one message to one or more numbers over the configured channel.
    Send {
        #[arg(required = true)]
        to: Vec<String>,
        #[arg(long)]
        body: String,
    },
}

pub async fn run(
    config: &TwilioConfig,
    args: &SmsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = TwilioClient::new(config.clone())?;

    match &args.command {
        SmsCommand::Send { to, body } => {
            let report = client.send_many_messages(to, body).await;
            match format {
                OutputFormat::Json => {
                    let sent: Vec<_> = report
                        .sent
                        .iter()
                        .map(|r| serde_json::json!({"to": r.to, "sid": r.sid, "status": r.status}))
                        .collect();
                    let failures: serde_json::Map<String, serde_json::Value> = report
                        .failures
                        .iter()
                        .map(|(number, e)| (number.clone(), e.to_string().into()))
                        .collect();
                    print_json(&serde_json::json!({
                        "attempted": report.attempted(),
                        "failed": report.failed(),
                        "sent": sent,
                        "failures": failures,
                    }))?;
                }
                OutputFormat::Text => {
                    for receipt in &report.sent {
                        println!("{}: {} ({})", receipt.to, receipt.status, receipt.sid);
                    }
                    for (number, e) in &report.failures {
                        eprintln!("{number}: FAILED: {e}");
                    }
                }
            }
            report.into_result()?;
        }
    }
    Ok(())
}
