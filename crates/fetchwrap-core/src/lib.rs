//! In-process fetch interception for tests.
//!
//! `fetchwrap-core` stands in for an HTTP fetch primitive: tests register
//! scripted responses per (method, url pattern) and every call is answered
//! from them instead of the network.
//!
//! ```ignore
//! use fetchwrap_core::{MockEngine, RequestOptions};
//! use serde_json::json;
//!
//! let mut engine = MockEngine::new();
//! engine.get("/foo", json!({"foo": "bar"}))?;
//! engine.get("/foo", json!(200))?;
//!
//! let first = engine.dispatch("/foo", &RequestOptions::new())?;   // {"foo":"bar"}
//! let second = engine.dispatch("/foo", &RequestOptions::new())?;  // {}
//! let third = engine.dispatch("/foo", &RequestOptions::new())?;   // {} again
//! assert!(engine.pending_entries().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod matching;
pub mod mocks;
pub mod normalize;
pub mod remote;
pub mod switch;
pub mod types;

pub use error::FetchwrapError;
pub use mocks::{MockEngine, MockRegistry, PendingEntry};
pub use normalize::{Declaration, NormalizedResponse};
pub use switch::{Fetch, FetchError, FetchFuture, FetchSwitch, NoNetwork};
pub use types::method::HttpMethod;
pub use types::request::{Credentials, MatchRecord, RequestOptions};
pub use types::response::Response;
