//! NAPI bindings for the mock engine.

use crate::types::{MatchRecord, MockResponse, PendingEntry};
use fetchwrap_core::config::{self as core_config, Fixture};
use fetchwrap_core::mocks::MockEngine as CoreMockEngine;
use fetchwrap_core::types::request::RequestOptions;
use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock engine class
#[napi]
pub struct MockEngine {
    inner: Arc<Mutex<CoreMockEngine>>,
}

fn reason(e: impl std::fmt::Display) -> Error {
    Error::from_reason(e.to_string())
}

#[napi]
impl MockEngine {
    /// Create a new mock engine
    ///
    /// @param mocking - Whether mocking starts enabled (default `true`)
    #[napi(constructor)]
    pub fn new(mocking: Option<bool>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CoreMockEngine::with_mocking(
                mocking.unwrap_or(true),
            ))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CoreMockEngine>> {
        self.inner
            .lock()
            .map_err(|_| Error::from_reason("mock engine lock poisoned"))
    }

    /// Register a mock declaration
    ///
    /// @param method - HTTP method (case-insensitive)
    /// @param pattern - Exact path or regular expression source
    /// @param declaration - Status code, body object or `{ body, status }` envelope (default `{}`)
    /// @throws Error if the method or the declaration is invalid
    #[napi]
    pub fn register(
        &self,
        method: String,
        pattern: String,
        declaration: Option<serde_json::Value>,
    ) -> Result<()> {
        let declaration = declaration.unwrap_or_else(|| serde_json::json!({}));
        self.lock()?
            .register(&method, &pattern, declaration)
            .map(|_| ())
            .map_err(reason)
    }

    #[napi]
    pub fn get(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("GET".to_string(), pattern, declaration)
    }

    #[napi]
    pub fn post(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("POST".to_string(), pattern, declaration)
    }

    #[napi]
    pub fn put(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("PUT".to_string(), pattern, declaration)
    }

    #[napi]
    pub fn patch(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("PATCH".to_string(), pattern, declaration)
    }

    #[napi]
    pub fn delete(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("DELETE".to_string(), pattern, declaration)
    }

    #[napi]
    pub fn head(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("HEAD".to_string(), pattern, declaration)
    }

    #[napi]
    pub fn options(&self, pattern: String, declaration: Option<serde_json::Value>) -> Result<()> {
        self.register("OPTIONS".to_string(), pattern, declaration)
    }

    /// Register fixtures previously read with `readFixtures`
    #[napi]
    pub fn load_fixtures(&self, fixtures: serde_json::Value) -> Result<()> {
        let fixtures: Vec<Fixture> = serde_json::from_value(fixtures).map_err(reason)?;
        self.lock()?
            .load_fixtures(fixtures)
            .map(|_| ())
            .map_err(reason)
    }

    /// Answer a call from the registered mocks
    ///
    /// @param url - Requested url
    /// @param options - Fetch options (`method`, `headers`, `body`, `credentials`)
    /// @throws Error if the method is invalid or no mock matches
    #[napi]
    pub fn dispatch(&self, url: String, options: Option<serde_json::Value>) -> Result<MockResponse> {
        let options: RequestOptions = match options {
            Some(value) => serde_json::from_value(value).map_err(reason)?,
            None => RequestOptions::default(),
        };
        let response = self.lock()?.dispatch(&url, &options).map_err(reason)?;
        MockResponse::try_from(response).map_err(reason)
    }

    /// Dispatched calls, in order
    #[napi(getter)]
    pub fn matches(&self) -> Result<Vec<MatchRecord>> {
        self.lock()?
            .matches()
            .iter()
            .map(|m| MatchRecord::try_from(m).map_err(reason))
            .collect()
    }

    /// Registered mocks never dispatched
    #[napi]
    pub fn validate(&self) -> Result<Vec<PendingEntry>> {
        Ok(self
            .lock()?
            .validate()
            .into_iter()
            .map(PendingEntry::from)
            .collect())
    }

    #[napi(getter)]
    pub fn mocking(&self) -> Result<bool> {
        Ok(self.lock()?.is_mocking())
    }

    #[napi]
    pub fn on(&self) -> Result<()> {
        self.lock()?.on();
        Ok(())
    }

    /// Turn mocking off and reset all mocks
    #[napi]
    pub fn off(&self) -> Result<()> {
        self.lock()?.off();
        Ok(())
    }

    #[napi]
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Read fixture files matching a glob pattern
///
/// @param pattern - Glob pattern of YAML/JSON/JSONC fixture files
/// @returns Fixtures to pass to `MockEngine.loadFixtures`
#[napi]
pub async fn read_fixtures(pattern: String) -> Result<serde_json::Value> {
    let fixtures = core_config::load_fixtures(&pattern).await.map_err(reason)?;
    serde_json::to_value(fixtures).map_err(reason)
}
