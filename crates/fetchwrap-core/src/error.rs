//! Errors raised by registration and dispatch.

use crate::mocks::registry::PendingEntry;
use crate::types::method::HttpMethod;
use thiserror::Error;

/// Error raised by the mock engine.
///
/// Every variant is returned at the call that detects it; none of them is
/// ever turned into a log line and swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchwrapError {
    /// Method outside the accepted verb set
    #[error("Bad Method [{}]. Valid methods are {}", .method, HttpMethod::valid_list())]
    InvalidMethod { method: String },

    /// Declaration that is neither a status code nor an object
    #[error("bad payload {payload}: {reason}")]
    InvalidPayload { payload: String, reason: String },

    /// No registration matches the requested url and method
    #[error("Unmatched url: [{} {}]. Valid endpoints are {}", .method, .url, .patterns.join(","))]
    UnmatchedRequest {
        url: String,
        method: HttpMethod,
        patterns: Vec<String>,
    },

    /// Registered mocks that were never dispatched
    #[error("{} registered mock(s) were never called: {}", .pending.len(), describe_pending(.pending))]
    PendingMocks { pending: Vec<PendingEntry> },
}

impl FetchwrapError {
    pub(crate) fn invalid_method(method: impl Into<String>) -> Self {
        FetchwrapError::InvalidMethod {
            method: method.into(),
        }
    }

    pub(crate) fn invalid_payload(payload: &serde_json::Value, reason: impl Into<String>) -> Self {
        FetchwrapError::InvalidPayload {
            payload: payload.to_string(),
            reason: reason.into(),
        }
    }
}

fn describe_pending(pending: &[PendingEntry]) -> String {
    pending
        .iter()
        .map(|p| format!("{} {}", p.method, p.pattern))
        .collect::<Vec<_>>()
        .join(", ")
}
