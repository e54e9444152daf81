use clap::{Args, Subcommand};
use connector_email::{EmailConfig, EmailSender};

use super::{print_json, read_json_arg};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct EmailArgs {
    #[command(subcommand)]
    pub command: EmailCommand,
}

#[derive(Subcommand, Debug)]
pub enum EmailCommand {
    /// Render a template and print the result without sending.
    Render {
        template: String,
        /// Template variables as JSON (string or @file path).
        #[arg(long, default_value = "{}")]
        context: String,
    },
    /// Render a template and send it.
    Send {
        template: String,
        #[arg(long)]
        to: String,
        /// Recipient display name.
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        subject: String,
        /// Template variables as JSON (string or @file path).
        #[arg(long, default_value = "{}")]
        context: String,
        /// Plain-text alternative body.
        #[arg(long, default_value = "")]
        text: String,
    },
}

pub async fn run(
    config: &EmailConfig,
    args: &EmailArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let sender = EmailSender::new(config.clone())?;

    match &args.command {
        EmailCommand::Render { template, context } => {
            let context = read_json_arg(context)?;
            let html = sender.render_template(template, &context)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "html": html }))?,
                OutputFormat::Text => println!("{html}"),
            }
        }
        EmailCommand::Send {
            template,
            to,
            name,
            subject,
            context,
            text,
        } => {
            let context = read_json_arg(context)?;
            let result = sender
                .send_template(template, &context, to, subject, name, text)
                .await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "to": to,
                    "message_id": result.message_id,
                    "status": result.status,
                }))?,
                OutputFormat::Text => println!("email to {to}: {}", result.status),
            }
        }
    }
    Ok(())
}
