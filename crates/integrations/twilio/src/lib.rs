//! SMS and WhatsApp sender over the
//! [Twilio Messages API](https://www.twilio.com/docs/messaging/api/message-resource).
//!
//! # Quick start
//!
//! ```rust,no_run
//! use connector_twilio::{Channel, TwilioClient, TwilioConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TwilioConfig::new("ACXXXXXXXX", "auth_token", "+15551234567")
//!     .with_channel(Channel::WhatsApp);
//! let client = TwilioClient::new(config)?;
//!
//! client.send_message("+15559876543", "Your order has shipped").await?;
//!
//! let report = client
//!     .send_many_messages(&["+15550000001", "+15550000002"], "Store closes at 6pm")
//!     .await;
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use client::TwilioClient;
pub use config::{Channel, TwilioConfig};
pub use error::TwilioError;
pub use report::{SendManyError, SendManyReport};
pub use types::{MessageReceipt, TwilioApiResponse, TwilioSendMessageRequest};
