//! Request options passed to a fetch call and the record kept for each dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Credentials mode of a fetch call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

/// Options accompanying a fetch call.
///
/// `method` stays a raw string so that an unknown verb reaches the engine and
/// is reported as [`crate::FetchwrapError::InvalidMethod`] instead of being
/// rejected by the type system at the call site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// HTTP method, `GET` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request headers
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Credentials mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Method as given by the caller, defaulting to `GET`.
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }
}

/// One dispatched call, as recorded in the match log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    /// Requested url, query string included
    pub url: String,
    /// Options the call was made with
    pub options: RequestOptions,
}
