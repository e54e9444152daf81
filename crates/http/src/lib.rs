//! Generic HTTP caller.
//!
//! Sends a request with an optional JSON body and returns the status, the
//! raw response bytes, and the body parsed as JSON (or kept as text when it
//! is not JSON). Non-2xx responses are returned, not raised.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use connector_http::{HttpCaller, HttpCallerConfig, Method};
//!
//! # async fn example() -> Result<(), connector_http::HttpError> {
//! let caller = HttpCaller::new(HttpCallerConfig::default().with_timeout_secs(10))?;
//! let headers = HashMap::from([("Authorization".to_owned(), "Bearer t".to_owned())]);
//! let response = caller
//!     .call(
//!         "https://api.example.com/orders",
//!         Method::POST,
//!         &headers,
//!         Some(&serde_json::json!({ "id": 1 })),
//!     )
//!     .await?;
//! println!("{} {:?}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

pub mod caller;
pub mod config;
pub mod error;
pub mod types;

pub use caller::{HttpCaller, make_request};
pub use config::HttpCallerConfig;
pub use error::HttpError;
pub use reqwest::Method;
pub use types::{HttpResponse, ResponseBody};
