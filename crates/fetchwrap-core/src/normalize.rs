//! Mock declaration shapes and their normalization into a canonical response.
//!
//! Callers register mocks with terse literals: a bare status (`404`), a bare
//! body (`{"foo": "bar"}`), a body carrying its status (`{"foo": "bar",
//! "status": 201}`) or an explicit envelope (`{"body": ..., "status": 400}`).
//! [`Declaration`] classifies the literal once and [`normalize`] turns it into
//! a [`NormalizedResponse`] with a status, its reason phrase and a body.

use crate::error::FetchwrapError;
use http::StatusCode;
use serde_json::{Map, Value};

/// Status used when a declaration does not carry one.
pub const DEFAULT_STATUS: u16 = 200;

/// A classified mock declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// Bare status code, empty object body
    StatusOnly(u16),
    /// Object used as the body; a `status` field is lifted out on normalization
    BodyOnly(Map<String, Value>),
    /// Object with an explicit `body` field
    Enveloped {
        body: Value,
        status: Option<u16>,
        metadata: Map<String, Value>,
    },
}

impl Declaration {
    pub fn status(status: u16) -> Self {
        Declaration::StatusOnly(status)
    }

    pub fn body(body: Map<String, Value>) -> Self {
        Declaration::BodyOnly(body)
    }

    pub fn enveloped(body: Value, status: Option<u16>) -> Self {
        Declaration::Enveloped {
            body,
            status,
            metadata: Map::new(),
        }
    }

    /// Raw literal form of the declaration, as reported by pending-entry listings.
    pub fn to_value(&self) -> Value {
        match self {
            Declaration::StatusOnly(status) => Value::from(*status),
            Declaration::BodyOnly(map) => Value::Object(map.clone()),
            Declaration::Enveloped {
                body,
                status,
                metadata,
            } => {
                let mut map = metadata.clone();
                map.insert("body".to_owned(), body.clone());
                if let Some(status) = status {
                    map.insert("status".to_owned(), Value::from(*status));
                }
                Value::Object(map)
            }
        }
    }
}

impl TryFrom<Value> for Declaration {
    type Error = FetchwrapError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(_) => parse_status(&value).map(Declaration::StatusOnly),
            Value::Object(mut map) => match map.remove("body") {
                Some(body) => {
                    let status = map
                        .remove("status")
                        .map(|status| parse_status(&status))
                        .transpose()?;
                    // Reason phrases always come from the status table.
                    map.remove("statusText");
                    Ok(Declaration::Enveloped {
                        body,
                        status,
                        metadata: map,
                    })
                }
                None => Ok(Declaration::BodyOnly(map)),
            },
            other => Err(FetchwrapError::invalid_payload(
                &other,
                "expected a status code or an object",
            )),
        }
    }
}

/// Canonical response a declaration normalizes into.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    /// HTTP status, 200 when the declaration omitted it
    pub status: u16,
    /// Reason phrase looked up from `status`
    pub status_text: String,
    /// Body handed back to the caller
    pub body: Value,
    /// Pattern the declaration was registered under
    pub source_url: String,
    /// Leftover top-level fields of an enveloped declaration
    pub metadata: Map<String, Value>,
}

/// Normalize a classified declaration registered under `pattern`.
pub fn normalize(
    pattern: &str,
    declaration: Declaration,
) -> Result<NormalizedResponse, FetchwrapError> {
    let (status, body, metadata) = match declaration {
        Declaration::StatusOnly(status) => {
            (check_status(status)?, Value::Object(Map::new()), Map::new())
        }
        Declaration::BodyOnly(mut body) => {
            let status = match body.remove("status") {
                Some(status) => parse_status(&status)?,
                None => DEFAULT_STATUS,
            };
            (status, Value::Object(body), Map::new())
        }
        Declaration::Enveloped {
            body,
            status,
            metadata,
        } => (
            check_status(status.unwrap_or(DEFAULT_STATUS))?,
            body,
            metadata,
        ),
    };

    Ok(NormalizedResponse {
        status,
        status_text: status_text(status).to_owned(),
        body,
        source_url: pattern.to_owned(),
        metadata,
    })
}

/// Classify and normalize a raw JSON declaration.
pub fn normalize_value(pattern: &str, raw: Value) -> Result<NormalizedResponse, FetchwrapError> {
    normalize(pattern, Declaration::try_from(raw)?)
}

/// Reason phrase for a status code, empty when the code has none.
pub fn status_text(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

fn parse_status(value: &Value) -> Result<u16, FetchwrapError> {
    value
        .as_u64()
        // `200.0` is still the integer 200.
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(f))
                .map(|f| f as u64)
        })
        .and_then(|n| u16::try_from(n).ok())
        .ok_or_else(|| FetchwrapError::invalid_payload(value, "status must be an integer"))
        .and_then(|status| {
            check_status(status)
                .map_err(|_| FetchwrapError::invalid_payload(value, "status out of range"))
        })
}

fn check_status(status: u16) -> Result<u16, FetchwrapError> {
    StatusCode::from_u16(status)
        .map(|code| code.as_u16())
        .map_err(|_| FetchwrapError::invalid_payload(&Value::from(status), "status out of range"))
}
