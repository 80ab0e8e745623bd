//! Fixture files: mock declarations registered in bulk.
//!
//! A fixture file holds a list of fixtures, each naming a method, a url
//! pattern and the declarations to replay for it:
//!
//! ```yaml
//! - method: GET
//!   url: /users
//!   responses:
//!     - { body: [{ id: 1 }] }
//!     - 500
//! - url: /csrf/
//!   responses:
//!     - { token: abc, parameterName: _csrf, headerName: X-CSRF-TOKEN }
//! ```

use crate::config::error::ConfigError;
use crate::config::parser::parse_config;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Declarations registered for one (method, url pattern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// HTTP method, `GET` when omitted
    #[serde(default = "default_method")]
    pub method: String,
    /// Url pattern (exact path or regular expression)
    #[serde(alias = "pattern")]
    pub url: String,
    /// Declarations in replay order
    pub responses: Vec<Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Parse fixtures from file content; the format follows the extension of `path`.
pub fn parse_fixtures(content: &str, path: &str) -> Result<Vec<Fixture>, ConfigError> {
    parse_config(content, path)
}

/// Read every fixture file matching a glob pattern.
///
/// Files are read in sorted path order and their fixtures concatenated.
pub async fn load_fixtures(pattern: &str) -> Result<Vec<Fixture>, ConfigError> {
    let mut paths = glob::glob(pattern)?.collect::<Result<Vec<PathBuf>, _>>()?;
    if paths.is_empty() {
        return Err(ConfigError::NoFilesMatched(pattern.to_string()));
    }
    paths.sort();

    let mut fixtures = Vec::new();
    for path in paths {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        let parsed = parse_fixtures(&content, &path.to_string_lossy())?;
        debug!(path = %path.display(), count = parsed.len(), "loaded fixtures");
        fixtures.extend(parsed);
    }

    Ok(fixtures)
}
