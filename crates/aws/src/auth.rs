use aws_credential_types::Credentials;
use tracing::debug;

use crate::config::AwsBaseConfig;
use crate::error::AwsError;

/// Provider name reported by the static credentials we build.
const STATIC_PROVIDER_NAME: &str = "connector-static";

/// Build an AWS SDK configuration from the given [`AwsBaseConfig`].
///
/// Uses static credentials when both keys are configured, and the standard
/// AWS environment credential chain otherwise. The endpoint URL is overridden
/// when one is set (e.g. `LocalStack`).
///
/// Fails with [`AwsError::Configuration`] when only one half of the static
/// key pair is present.
///
/// # Examples
///
/// ```no_run
/// use connector_aws::config::AwsBaseConfig;
/// use connector_aws::auth::build_sdk_config;
///
/// # async fn example() -> Result<(), connector_aws::AwsError> {
/// let config = AwsBaseConfig::new("us-east-1")
///     .with_credentials("test", "test")
///     .with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> Result<aws_config::SdkConfig, AwsError> {
    let mut loader = aws_config::from_env().region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    match (&config.access_key_id, &config.secret_access_key) {
        (Some(access_key_id), Some(secret_access_key)) => {
            debug!(access_key_id = %access_key_id, "using static AWS credentials");
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                config.session_token.clone(),
                None,
                STATIC_PROVIDER_NAME,
            );
            loader = loader.credentials_provider(credentials);
        }
        (None, None) => {
            debug!("using the default AWS credential chain");
        }
        _ => {
            return Err(AwsError::Configuration(
                "access_key_id and secret_access_key must be set together".to_owned(),
            ));
        }
    }

    Ok(loader.load().await)
}


#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    // These tests require a TLS root certificate store and are only run in
    // integration test mode. The AWS SDK panics on `load()` if no system
    // root certificates are available.

    #[tokio::test]
    async fn build_sdk_config_sets_region() {
        let config = AwsBaseConfig::new("ap-northeast-1").with_credentials("test", "test");
        let sdk_config = build_sdk_config(&config).await.unwrap();
        assert_eq!(
            sdk_config.region().map(|r| r.as_ref()),
            Some("ap-northeast-1")
        );
        assert!(sdk_config.credentials_provider().is_some());
    }

    #[tokio::test]
    async fn build_sdk_config_with_endpoint() {
        let config = AwsBaseConfig::new("us-west-2").with_endpoint_url("http://localhost:4566");
        let sdk_config = build_sdk_config(&config).await.unwrap();
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:4566"));
    }
}
