use serde::{Deserialize, Serialize};

/// Form-encoded request body for the Twilio Messages API.
///
/// Twilio expects `application/x-www-form-urlencoded` rather than JSON.
#[derive(Debug, Clone, Serialize)]
pub struct TwilioSendMessageRequest {
    /// Destination address (`+15559876543` or `whatsapp:+15559876543`).
    #[serde(rename = "To")]
    pub to: String,

    /// Sender address or messaging service SID.
    #[serde(rename = "From")]
    pub from: String,

    #[serde(rename = "Body")]
    pub body: String,
}

/// Response from the Twilio Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioApiResponse {
    /// Message SID (unique identifier).
    pub sid: Option<String>,

    /// Message status (e.g., `"queued"`, `"sent"`, `"delivered"`).
    pub status: Option<String>,

    /// Twilio error code (present on failure).
    pub error_code: Option<i32>,

    /// Twilio error message (present on failure).
    pub error_message: Option<String>,
}

/// Error body Twilio returns with 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TwilioErrorBody {
    pub code: Option<i32>,
    pub message: Option<String>,
}

/// An accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceipt {
    /// Recipient as given by the caller.
    pub to: String,
    pub sid: String,
    pub status: String,
}
