use connector_aws::{S3Store, SqsQueue};
use connector_core::{ConnectorError, HealthCheck};
use connector_email::EmailSender;
use connector_slack::SlackReporter;
use connector_twilio::TwilioClient;
use serde::Serialize;

use super::print_json;
use crate::OutputFormat;
use crate::config::ConnectorConfig;

#[derive(Debug, Serialize)]
struct CheckResult {
    adapter: String,
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CheckResult {
    fn new(adapter: &str, result: Result<(), ConnectorError>) -> Self {
        Self {
            adapter: adapter.to_owned(),
            healthy: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        }
    }
}

async fn probe<H: HealthCheck>(adapter: &H) -> CheckResult {
    CheckResult::new(adapter.name(), adapter.health_check().await)
}

/// Probe every adapter that has a configuration section.
pub async fn run(config: &ConnectorConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut results = Vec::new();

    if let Some(s3) = &config.s3 {
        results.push(match S3Store::new(s3.clone()).await {
            Ok(store) => probe(&store).await,
            Err(e) => CheckResult::new("aws-s3", Err(e.into())),
        });
    }
    if let Some(sqs) = &config.sqs {
        results.push(match SqsQueue::new(sqs.clone()).await {
            Ok(queue) => probe(&queue).await,
            Err(e) => CheckResult::new("aws-sqs", Err(e.into())),
        });
    }
    if let Some(database) = &config.database {
        let result: Result<(), ConnectorError> = match connector_db::connect(database.clone()) {
            Ok(pool) => {
                let result = connector_db::ping(&pool).await.map_err(Into::into);
                pool.close().await;
                result
            }
            Err(e) => Err(e.into()),
        };
        results.push(CheckResult::new("postgres", result));
    }
    if let Some(email) = &config.email {
        results.push(match EmailSender::new(email.clone()) {
            Ok(sender) => probe(&sender).await,
            Err(e) => CheckResult::new("email", Err(e.into())),
        });
    }
    if let Some(slack) = &config.slack {
        results.push(match SlackReporter::new(slack.clone()) {
            Ok(reporter) => probe(&reporter).await,
            Err(e) => CheckResult::new("slack", Err(e.into())),
        });
    }
    if let Some(twilio) = &config.twilio {
        results.push(match TwilioClient::new(twilio.clone()) {
            Ok(client) => probe(&client).await,
            Err(e) => CheckResult::new("twilio", Err(e.into())),
        });
    }

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Text => {
            if results.is_empty() {
                println!("no adapters configured");
            }
            for result in &results {
                match &result.error {
                    None => println!("{:<10} ok", result.adapter),
                    Some(e) => println!("{:<10} FAILED: {e}", result.adapter),
                }
            }
        }
    }

    let failed = results.iter().filter(|r| !r.healthy).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} health checks failed", results.len());
    }
    Ok(())
}
