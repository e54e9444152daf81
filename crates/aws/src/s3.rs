use std::path::Path;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use connector_core::{ConnectorError, HealthCheck, require_non_empty};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::{AwsBaseConfig, LOCALSTACK_ENDPOINT};
use crate::error::{AwsError, sdk_failure};

/// The one region in which S3 rejects an explicit location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for the S3 object-storage adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Shared AWS configuration (region, credentials, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Bucket every operation of the adapter targets.
    pub bucket: String,

    /// Use path-style addressing (`http://host/bucket/key`). Required by
    /// `LocalStack` and most S3-compatible servers.
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3Config {
    /// Create a new `S3Config` for the given region and bucket.
    pub fn new(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            bucket: bucket.into(),
            force_path_style: false,
        }
    }

    /// Configuration targeting a local `LocalStack` container on port 4566.
    pub fn local(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self::new(region, bucket)
            .with_endpoint_url(LOCALSTACK_ENDPOINT)
            .with_path_style(true)
    }

    /// Use static credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.aws = self.aws.with_credentials(access_key_id, secret_access_key);
        self
    }

    /// Set the endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Toggle path-style addressing.
    #[must_use]
    pub fn with_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}

/// Object storage bound to a single bucket.
pub struct S3Store {
    config: S3Config,
    client: aws_sdk_s3::Client,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("config", &self.config)
            .field("client", &"<S3Client>")
            .finish()
    }
}

impl S3Store {
    /// Create a new `S3Store` by building an AWS SDK client.
    pub async fn new(config: S3Config) -> Result<Self, AwsError> {
        require_non_empty("bucket", &config.bucket)
            .map_err(|e| AwsError::Configuration(e.to_string()))?;

        let sdk_config = build_sdk_config(&config.aws).await?;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_config);
        Ok(Self { config, client })
    }

    /// Create an `S3Store` with a pre-built client.
    pub fn with_client(config: S3Config, client: aws_sdk_s3::Client) -> Self {
        Self { config, client }
    }

    /// The bucket this store operates on.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Create the configured bucket in the configured region.
    #[instrument(skip(self), fields(provider = "aws-s3", bucket = %self.config.bucket))]
    pub async fn create_bucket(&self) -> Result<(), AwsError> {
        let mut request = self.client.create_bucket().bucket(&self.config.bucket);

        let region = self.config.aws.region.as_str();
        if region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request.send().await.map_err(|e| {
            sdk_failure("s3", "create_bucket", &DisplayErrorContext(&e).to_string())
        })?;

        info!("S3 bucket created");
        Ok(())
    }

    /// Delete the configured bucket. The bucket must already be empty.
    #[instrument(skip(self), fields(provider = "aws-s3", bucket = %self.config.bucket))]
    pub async fn delete_bucket(&self) -> Result<(), AwsError> {
        self.client
            .delete_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| {
                sdk_failure("s3", "delete_bucket", &DisplayErrorContext(&e).to_string())
            })?;

        info!("S3 bucket deleted");
        Ok(())
    }

    /// Store `bytes` under `key`.
    #[instrument(skip(self, bytes), fields(provider = "aws-s3", bucket = %self.config.bucket))]
    pub async fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<(), AwsError> {
        validate_key(key)?;
        debug!(key, size = bytes.len(), "uploading object to S3");

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| sdk_failure("s3", "put_object", &DisplayErrorContext(&e).to_string()))?;

        info!(key, "S3 object uploaded");
        Ok(())
    }

    /// Read the whole object stored under `key`.
    #[instrument(skip(self), fields(provider = "aws-s3", bucket = %self.config.bucket))]
    pub async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, AwsError> {
        validate_key(key)?;
        debug!(key, "downloading object from S3");

        let output = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_failure("s3", "get_object", &DisplayErrorContext(&e).to_string()))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AwsError::Connection(format!("failed to read S3 body: {e}")))?
            .into_bytes();

        info!(key, size = bytes.len(), "S3 object downloaded");
        Ok(bytes.to_vec())
    }

    /// Upload the local file at `path` under `key`.
    pub async fn upload_file(&self, key: &str, path: impl AsRef<Path>) -> Result<(), AwsError> {
        validate_key(key)?;
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.put_bytes(key, bytes).await
    }

    /// Download the object under `key` into the local file at `path`,
    /// creating or truncating it.
    pub async fn download_file(&self, key: &str, path: impl AsRef<Path>) -> Result<(), AwsError> {
        let bytes = self.get_bytes(key).await?;
        tokio::fs::write(path.as_ref(), bytes).await?;
        Ok(())
    }

    /// Delete the object stored under `key`.
    #[instrument(skip(self), fields(provider = "aws-s3", bucket = %self.config.bucket))]
    pub async fn delete_file(&self, key: &str) -> Result<(), AwsError> {
        validate_key(key)?;

        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                sdk_failure("s3", "delete_object", &DisplayErrorContext(&e).to_string())
            })?;

        info!(key, "S3 object deleted");
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), AwsError> {
    require_non_empty("key", key).map_err(|e| AwsError::Configuration(e.to_string()))
}

impl HealthCheck for S3Store {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "aws-s3"
    }

    #[instrument(skip(self), fields(provider = "aws-s3"))]
    async fn health_check(&self) -> Result<(), ConnectorError> {
        debug!("performing S3 health check");
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| {
                ConnectorError::from(sdk_failure(
                    "s3",
                    "head_bucket",
                    &DisplayErrorContext(&e).to_string(),
                ))
            })?;
        info!("S3 health check passed");
        Ok(())
    }
}
