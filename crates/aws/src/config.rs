use serde::{Deserialize, Serialize};

/// Endpoint of a default `LocalStack` container.
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Shared base configuration for the AWS adapters.
///
/// Contains the region, optional static credentials, and an endpoint URL
/// override for local development (e.g. `LocalStack`). When no static
/// credentials are configured the standard AWS environment credential chain
/// is used.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// Static access key ID. Must be set together with `secret_access_key`.
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key. Must be set together with `access_key_id`.
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Optional session token for temporary static credentials.
    #[serde(default)]
    pub session_token: Option<String>,

    /// Optional endpoint URL override for local development (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl AwsBaseConfig {
    /// Create a new `AwsBaseConfig` with the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            endpoint_url: None,
        }
    }

    /// Use static credentials instead of the environment credential chain.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Attach a session token to the static credentials.
    #[must_use]
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Set an endpoint URL override for local development.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}
