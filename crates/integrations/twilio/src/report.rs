use std::collections::HashMap;

use connector_core::ConnectorError;
use thiserror::Error;

use crate::error::TwilioError;
use crate::types::MessageReceipt;

/// Outcome of sending one message to many recipients.
///
/// Every recipient is attempted; a failure for one does not stop the rest.
/// A number listed twice is sent twice and counted twice, but only its last
/// failure is kept in `failures`.
#[derive(Debug, Default)]
pub struct SendManyReport {
    pub sent: Vec<MessageReceipt>,
    /// Failures keyed by recipient number.
    pub failures: HashMap<String, TwilioError>,
    attempted: usize,
    failed: usize,
}

impl SendManyReport {
    /// Record the outcome of one send.
    pub(crate) fn record(&mut self, number: &str, result: Result<MessageReceipt, TwilioError>) {
        self.attempted += 1;
        match result {
            Ok(receipt) => self.sent.push(receipt),
            Err(e) => {
                self.failed += 1;
                self.failures.insert(number.to_owned(), e);
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Number of sends attempted, one per entry of the input list.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Number of sends that failed, repeated recipients included.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// The receipts when every send succeeded, otherwise an error carrying
    /// every failure.
    pub fn into_result(self) -> Result<Vec<MessageReceipt>, SendManyError> {
        if self.failed == 0 {
            return Ok(self.sent);
        }
        Err(SendManyError {
            attempted: self.attempted,
            failed: self.failed,
            sent: self.sent,
            failures: self.failures,
        })
    }
}

/// At least one recipient of a bulk send failed.
#[derive(Debug, Error)]
#[error("{failed} of {attempted} messages failed")]
pub struct SendManyError {
    pub attempted: usize,
    pub failed: usize,
    /// Receipts for the recipients that succeeded.
    pub sent: Vec<MessageReceipt>,
    /// Failures keyed by recipient number.
    pub failures: HashMap<String, TwilioError>,
}

impl From<SendManyError> for ConnectorError {
    fn from(err: SendManyError) -> Self {
        if err.failures.values().all(|e| matches!(e, TwilioError::RateLimited)) {
            return ConnectorError::RateLimited;
        }
        let mut details: Vec<String> = err
            .failures
            .iter()
            .map(|(number, e)| format!("{number}: {e}"))
            .collect();
        details.sort();
        ConnectorError::ExecutionFailed(format!("{err}: {}", details.join("; ")))
    }
}
