//! Plain objects exchanged with Node.js.

use fetchwrap_core::mocks::PendingEntry as CorePendingEntry;
use fetchwrap_core::types::request::MatchRecord as CoreMatchRecord;
use fetchwrap_core::types::response::Response as CoreResponse;
use napi_derive::napi;
use std::collections::HashMap;

/// Synthetic response of a dispatched call
#[napi(object)]
#[derive(Clone)]
pub struct MockResponse {
    pub status: u32,
    pub status_text: String,
    pub ok: bool,
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Parsed JSON body
    pub body: serde_json::Value,
}

impl TryFrom<CoreResponse> for MockResponse {
    type Error = serde_json::Error;

    fn try_from(r: CoreResponse) -> Result<Self, Self::Error> {
        let body = r.json()?;
        Ok(Self {
            status: u32::from(r.status),
            ok: r.ok(),
            status_text: r.status_text,
            url: r.url,
            headers: r.headers,
            body,
        })
    }
}

/// Registered mock never dispatched
#[napi(object)]
#[derive(Clone)]
pub struct PendingEntry {
    pub url: String,
    pub method: String,
    pub payload: serde_json::Value,
}

impl From<CorePendingEntry> for PendingEntry {
    fn from(p: CorePendingEntry) -> Self {
        Self {
            url: p.pattern,
            method: p.method.to_string(),
            payload: p.declaration,
        }
    }
}

/// One dispatched call
#[napi(object)]
#[derive(Clone)]
pub struct MatchRecord {
    pub url: String,
    pub options: serde_json::Value,
}

impl TryFrom<&CoreMatchRecord> for MatchRecord {
    type Error = serde_json::Error;

    fn try_from(m: &CoreMatchRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            url: m.url.clone(),
            options: serde_json::to_value(&m.options)?,
        })
    }
}
