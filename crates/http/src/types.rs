use serde::Serialize;

/// Response body, parsed as JSON when possible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// The body was valid JSON.
    Json(serde_json::Value),
    /// The body was not JSON (or empty); kept as lossy UTF-8 text.
    Text(String),
}

impl ResponseBody {
    /// Parse `raw` as JSON, falling back to text.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice(raw) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(raw).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }
}

/// The outcome of a completed HTTP call, whatever its status.
#[derive(Debug, Clone, Serialize)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body parsed as JSON, or text.
    pub body: ResponseBody,
    /// Body bytes exactly as received.
    #[serde(skip)]
    pub raw_body: Vec<u8>,
    /// Response headers whose values are valid UTF-8, in received order.
    /// Repeated headers such as `Set-Cookie` appear once per value.
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// Every value of the header `name` (case-insensitive), in order.
    pub fn header_values<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
