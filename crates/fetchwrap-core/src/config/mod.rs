//! Fixture configuration: file parsing and bulk mock declarations.

pub mod error;
pub mod fixture;
pub mod parser;

pub use error::ConfigError;
pub use fixture::{load_fixtures, parse_fixtures, Fixture};
