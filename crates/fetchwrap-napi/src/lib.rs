//! NAPI-RS bindings for the fetchwrap core library.
//!
//! Exposes the mock engine to Node.js.

use napi_derive::napi;

mod engine;
mod types;

pub use engine::*;
pub use types::*;

/// Library version
#[napi]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
