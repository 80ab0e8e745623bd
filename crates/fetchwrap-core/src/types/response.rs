//! Response value returned by a fetch call.

use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Response produced by the mock engine or a real transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for `status`
    pub status_text: String,
    /// Url the request was made to
    pub url: String,
    /// Response headers (lower-case names)
    pub headers: HashMap<String, String>,
    body: String,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// Replace the raw body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a response header. Names are stored lower-case.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    /// True when `status` is in `200..300`.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw body text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}
