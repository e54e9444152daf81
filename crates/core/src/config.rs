use crate::error::ConnectorError;

/// Reject an empty (or whitespace-only) required configuration value.
///
/// Adapters call this from their constructors so that a missing token or
/// channel surfaces as a [`ConnectorError::Configuration`] the caller can act
/// on, instead of aborting the process.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ConnectorError> {
    if value.trim().is_empty() {
        return Err(ConnectorError::Configuration(format!("{field} is required")));
    }
    Ok(())
}
