//! Mock engine: the stand-in for a fetch call.
//!
//! This module provides `MockEngine`, which owns a [`MockRegistry`] and the
//! match log, validates and resolves dispatched calls, and builds the
//! synthetic [`Response`] for them.

use crate::config::fixture::Fixture;
use crate::error::FetchwrapError;
use crate::mocks::registry::{MockRegistry, PendingEntry};
use crate::normalize::{Declaration, NormalizedResponse};
use crate::types::method::HttpMethod;
use crate::types::request::{MatchRecord, RequestOptions};
use crate::types::response::Response;
use serde_json::Value;
use std::future::{ready, Future};
use tracing::{debug, trace, warn};

/// Engine intercepting fetch calls and answering them from registered mocks.
///
/// `MockEngine` provides:
/// - Registration via `register()` and one alias per method (`get()`, `post()`, ...)
/// - Dispatch via `dispatch()` / `fetch()`
/// - Inspection via `matches()` and `pending_entries()`
/// - Activation via `on()` / `off()` / `clear()`
#[derive(Debug, Clone)]
pub struct MockEngine {
    registry: MockRegistry,
    /// Every dispatched call, in order
    matches: Vec<MatchRecord>,
    mocking: bool,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create an engine with mocking turned on.
    pub fn new() -> Self {
        Self::with_mocking(true)
    }

    pub fn with_mocking(mocking: bool) -> Self {
        Self {
            registry: MockRegistry::new(),
            matches: Vec::new(),
            mocking,
        }
    }

    /// Register a raw declaration for `method` on `pattern`.
    ///
    /// # Errors
    /// - [`FetchwrapError::InvalidMethod`] when `method` is not a known verb
    /// - [`FetchwrapError::InvalidPayload`] when the declaration is neither a
    ///   status code nor an object
    ///
    /// # Example
    /// ```ignore
    /// engine.register("GET", "/foo", json!({"foo": "bar"}))?;
    /// engine.register("get", "/foo", json!(404))?;
    /// ```
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        declaration: Value,
    ) -> Result<&mut Self, FetchwrapError> {
        self.registry.register(method, pattern, declaration)?;
        debug!(method, pattern, "registered mock");
        Ok(self)
    }

    /// Register an already classified declaration.
    pub fn register_declaration(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        declaration: Declaration,
    ) -> Result<&mut Self, FetchwrapError> {
        self.registry
            .register_declaration(method, pattern, declaration)?;
        debug!(method = %method, pattern, "registered mock");
        Ok(self)
    }

    fn register_method(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        declaration: Value,
    ) -> Result<&mut Self, FetchwrapError> {
        self.register(method.as_str(), pattern, declaration)
    }

    pub fn get(&mut self, pattern: &str, declaration: Value) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Get, pattern, declaration)
    }

    pub fn post(&mut self, pattern: &str, declaration: Value) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Post, pattern, declaration)
    }

    pub fn put(&mut self, pattern: &str, declaration: Value) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Put, pattern, declaration)
    }

    pub fn patch(&mut self, pattern: &str, declaration: Value) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Patch, pattern, declaration)
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        declaration: Value,
    ) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Delete, pattern, declaration)
    }

    pub fn head(&mut self, pattern: &str, declaration: Value) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Head, pattern, declaration)
    }

    pub fn options(
        &mut self,
        pattern: &str,
        declaration: Value,
    ) -> Result<&mut Self, FetchwrapError> {
        self.register_method(HttpMethod::Options, pattern, declaration)
    }

    /// Register every response of every fixture, in order.
    ///
    /// Stops at the first rejected declaration; fixtures before it stay registered.
    pub fn load_fixtures<I>(&mut self, fixtures: I) -> Result<&mut Self, FetchwrapError>
    where
        I: IntoIterator<Item = Fixture>,
    {
        for fixture in fixtures {
            for response in fixture.responses {
                self.register(&fixture.method, &fixture.url, response)?;
            }
        }
        Ok(self)
    }

    /// Answer a call from the registered mocks.
    ///
    /// Matching is performed in order: method, url pattern, method on that pattern.
    /// The call is recorded in the match log only when it is answered.
    ///
    /// # Errors
    /// - [`FetchwrapError::InvalidMethod`] when `options.method` is not a known verb
    /// - [`FetchwrapError::UnmatchedRequest`] when no pattern matches the url, or
    ///   the matched pattern has nothing registered for the method
    pub fn dispatch(
        &mut self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, FetchwrapError> {
        let raw_method = options.method_or_default();
        let method: HttpMethod = raw_method
            .parse()
            .map_err(|_| FetchwrapError::invalid_method(raw_method))?;

        let Some(pattern) = self.registry.resolve(url).map(|p| p.source().to_owned()) else {
            return Err(self.unmatched(url, method));
        };
        trace!(url, pattern = %pattern, "resolved pattern");

        let Some(normalized) = self.registry.take(&pattern, method) else {
            return Err(self.unmatched(url, method));
        };

        self.matches.push(MatchRecord {
            url: url.to_owned(),
            options: options.clone(),
        });
        debug!(method = %method, url, status = normalized.status, "dispatched mock");

        Ok(into_response(url, normalized))
    }

    /// Asynchronous form of [`MockEngine::dispatch`].
    ///
    /// The mock is consumed by this call and the returned future is already
    /// resolved.
    ///
    /// # Errors
    ///
    /// Same as [`MockEngine::dispatch`], returned before any future exists.
    pub fn fetch(
        &mut self,
        url: &str,
        options: RequestOptions,
    ) -> Result<impl Future<Output = Response> + Send + 'static, FetchwrapError> {
        self.dispatch(url, &options).map(ready)
    }

    fn unmatched(&self, url: &str, method: HttpMethod) -> FetchwrapError {
        let patterns = self.registry.patterns();
        warn!(method = %method, url, ?patterns, "unmatched request");
        FetchwrapError::UnmatchedRequest {
            url: url.to_owned(),
            method,
            patterns,
        }
    }

    /// Dispatched calls, in order.
    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// Registered declarations that no dispatch has consumed.
    pub fn pending_entries(&self) -> Vec<PendingEntry> {
        self.registry.pending_entries()
    }

    /// Alias of [`MockEngine::pending_entries`].
    pub fn validate(&self) -> Vec<PendingEntry> {
        self.pending_entries()
    }

    /// Fail with [`FetchwrapError::PendingMocks`] if any declaration is unconsumed.
    pub fn assert_all_consumed(&self) -> Result<(), FetchwrapError> {
        let pending = self.pending_entries();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(FetchwrapError::PendingMocks { pending })
        }
    }

    pub fn registry(&self) -> &MockRegistry {
        &self.registry
    }

    pub fn is_mocking(&self) -> bool {
        self.mocking
    }

    /// Turn mocking on.
    pub fn on(&mut self) {
        self.mocking = true;
    }

    /// Turn mocking off and drop all mocks and the match log.
    pub fn off(&mut self) {
        self.mocking = false;
        self.clear();
    }

    /// Drop all mocks, run cursors and the match log.
    pub fn clear(&mut self) {
        self.registry.reset();
        self.matches.clear();
        debug!("cleared mocks");
    }
}

fn into_response(url: &str, normalized: NormalizedResponse) -> Response {
    Response::new(normalized.status, normalized.status_text, url)
        .with_header("content-type", "application/json")
        .with_body(normalized.body.to_string())
}
