pub mod db;
pub mod email;
pub mod health;
pub mod http;
pub mod s3;
pub mod slack;
pub mod sms;
pub mod sqs;

use anyhow::Context;

/// Parse a JSON argument given inline or as `@path`.
pub fn read_json_arg(arg: &str) -> anyhow::Result<serde_json::Value> {
    if let Some(path) = arg.strip_prefix('@') {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("{path} is not valid JSON"))
    } else {
        serde_json::from_str(arg).context("argument is not valid JSON")
    }
}

pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
