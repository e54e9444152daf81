//! AWS adapters for the connector libraries.
//!
//! This crate provides feature-gated wrappers around the official AWS SDK:
//!
//! - **S3** (`s3` feature): create/delete buckets, upload, download and
//!   delete objects
//! - **SQS** (`sqs` feature): send messages to a queue and run a background
//!   consumer that streams received messages into a bounded channel
//!
//! Both adapters share a common [`AwsBaseConfig`](config::AwsBaseConfig) for
//! region, static credentials, and an endpoint override for `LocalStack`.

pub mod auth;
pub mod config;
pub mod error;

#[cfg(feature = "sqs")]
pub mod sqs;

#[cfg(feature = "s3")]
pub mod s3;

// Re-exports for convenience.
pub use config::AwsBaseConfig;
pub use error::AwsError;

#[cfg(feature = "sqs")]
pub use sqs::{
    Consumer, ConsumerConfig, ConsumerWorker, QueueTransport, SendReceipt, SqsConfig, SqsQueue,
};

#[cfg(feature = "s3")]
pub use s3::{S3Config, S3Store};
