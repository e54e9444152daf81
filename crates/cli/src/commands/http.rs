use std::collections::HashMap;

use anyhow::Context;
use clap::Args;
use connector_http::{HttpCaller, HttpCallerConfig, Method, ResponseBody};

use super::{parse_key_val, print_json, read_json_arg};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct HttpArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...).
    pub method: String,
    pub url: String,
    /// Request header (key=value), repeatable.
    #[arg(long = "header", short = 'H', value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,
    /// JSON body (string or @file path).
    #[arg(long)]
    pub body: Option<String>,
}

pub async fn run(
    config: &HttpCallerConfig,
    args: &HttpArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method `{}`", args.method))?;
    let headers: HashMap<String, String> = args.headers.iter().cloned().collect();
    let body = args.body.as_deref().map(read_json_arg).transpose()?;

    let caller = HttpCaller::new(config.clone())?;
    let response = caller.call(&args.url, method, &headers, body.as_ref()).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Text => {
            println!("HTTP {}", response.status);
            match &response.body {
                ResponseBody::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
                ResponseBody::Text(text) => println!("{text}"),
            }
        }
    }
    Ok(())
}
