//! Chat-ops error reporter for axum services.
//!
//! [`report_errors`] wraps a router: every response with a status of 400 or
//! above, and every panicking handler, is formatted into a message and posted
//! to a Slack channel through the Web API. Panics are re-raised after they
//! are reported.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::{Router, middleware, routing::get};
//! use connector_slack::{SlackConfig, SlackReporter, report_errors};
//!
//! # fn example() -> Result<(), connector_slack::SlackError> {
//! let reporter = Arc::new(SlackReporter::new(SlackConfig::new(
//!     "xoxb-token",
//!     "C0ERRORS",
//!     "C0CRITICAL",
//! ))?);
//!
//! let app: Router = Router::new()
//!     .route("/orders", get(|| async { "ok" }))
//!     .layer(middleware::from_fn_with_state(reporter, report_errors));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod reporter;
pub mod types;

pub use config::SlackConfig;
pub use error::SlackError;
pub use middleware::report_errors;
pub use reporter::SlackReporter;

#[cfg(test)]
pub(crate) mod test_support;
