use std::collections::HashMap;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::HttpCallerConfig;
use crate::error::HttpError;
use crate::types::{HttpResponse, ResponseBody};

/// HTTP client wrapper with JSON conventions.
#[derive(Debug, Clone)]
pub struct HttpCaller {
    config: HttpCallerConfig,
    client: Client,
}

impl HttpCaller {
    /// Build a caller and its underlying `reqwest::Client`.
    pub fn new(config: HttpCallerConfig) -> Result<Self, HttpError> {
        let mut builder = Client::builder().redirect(if config.follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        });
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { config, client })
    }

    /// Create a caller around an existing client, e.g. to share its
    /// connection pool.
    pub fn with_client(config: HttpCallerConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Send one request and read the whole response.
    ///
    /// `body`, when present, is serialized to JSON and sent whatever the
    /// method; `Content-Type: application/json` is forced for `POST` and
    /// `PUT`. Per-call `headers` override the configured default headers.
    #[instrument(skip(self, headers, body), fields(method = %method))]
    pub async fn call<T>(
        &self,
        url: &str,
        method: Method,
        headers: &HashMap<String, String>,
        body: Option<&T>,
    ) -> Result<HttpResponse, HttpError>
    where
        T: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::InvalidPayload(format!("failed to serialize body: {e}")))?;

        let mut header_map = HeaderMap::new();
        for (key, value) in self.config.default_headers.iter().chain(headers) {
            let (name, value) = parse_header(key, value)?;
            header_map.insert(name, value);
        }
        if payload.is_some() && (method == Method::POST || method == Method::PUT) {
            header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        debug!(url, has_body = payload.is_some(), "sending HTTP request");

        let mut request = self.client.request(method, url).headers(header_map);
        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|val| (k.to_string(), val.to_owned())))
            .collect();
        let raw_body = response.bytes().await?.to_vec();

        debug!(status, size = raw_body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            body: ResponseBody::parse(&raw_body),
            raw_body,
            headers,
        })
    }
}

fn parse_header(key: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let invalid = |reason: String| HttpError::InvalidHeader {
        name: key.to_owned(),
        reason,
    };
    let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((name, value))
}

/// One-shot request through a caller with the default configuration.
///
/// Builds a fresh client per call; keep an [`HttpCaller`] around when
/// sending more than a handful of requests. Pass `None::<&()>` for no body.
pub async fn make_request<T>(
    url: &str,
    method: Method,
    headers: &HashMap<String, String>,
    body: Option<&T>,
) -> Result<HttpResponse, HttpError>
where
    T: Serialize + ?Sized,
{
    HttpCaller::new(HttpCallerConfig::default())?
        .call(url, method, headers, body)
        .await
}
