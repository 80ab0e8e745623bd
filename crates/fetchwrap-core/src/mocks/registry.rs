//! Mock registry: ordered response sequences per (pattern, method).
//!
//! This module provides `MockRegistry`, which stores every registered mock and
//! the run cursor tracking how far each sequence has been consumed. It is used
//! by `MockEngine` to pick the response for a dispatched call.

use crate::error::FetchwrapError;
use crate::matching::{Pattern, PatternSet};
use crate::normalize::{normalize, Declaration, NormalizedResponse};
use crate::types::method::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Composite key of a mock sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockKey {
    pub pattern: String,
    pub method: HttpMethod,
}

impl MockKey {
    pub fn new(pattern: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            pattern: pattern.into(),
            method,
        }
    }
}

/// One registered mock: the literal as given and its normalized response.
#[derive(Debug, Clone, PartialEq)]
pub struct MockEntry {
    pub declaration: Value,
    pub response: NormalizedResponse,
}

/// Responses registered for one key and the cursor consuming them.
#[derive(Debug, Clone, Default)]
pub struct MockSequence {
    entries: Vec<MockEntry>,
    /// Number of draws so far, `None` until the first one
    cursor: Option<usize>,
}

impl MockSequence {
    fn push(&mut self, entry: MockEntry) {
        self.entries.push(entry);
    }

    /// Draw the next response.
    ///
    /// Past the end the last entry is returned again; the cursor keeps
    /// counting while the selection saturates.
    fn take(&mut self) -> Option<&NormalizedResponse> {
        let drawn = self.cursor.unwrap_or(0);
        let last = self.entries.len().checked_sub(1)?;
        self.cursor = Some(drawn + 1);
        self.entries.get(drawn.min(last)).map(|e| &e.response)
    }

    /// Entries at or after the cursor.
    fn pending(&self) -> &[MockEntry] {
        let start = self.cursor.unwrap_or(0).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[MockEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A registered mock that no dispatch has consumed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEntry {
    /// Pattern the mock was registered under
    #[serde(rename = "url")]
    pub pattern: String,
    pub method: HttpMethod,
    /// Declaration as registered
    #[serde(rename = "payload")]
    pub declaration: Value,
}

/// Store of registered mock sequences.
///
/// `MockRegistry` is responsible for:
/// - Compiling each pattern once and remembering registration order
/// - Appending normalized declarations to their (pattern, method) sequence
/// - Sticky-last replay of sequences
/// - Reporting declarations that were never consumed
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    patterns: PatternSet,
    sequences: HashMap<MockKey, MockSequence>,
    /// Keys in first-registration order
    order: Vec<MockKey>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a raw declaration and append it to the sequence for
    /// (`pattern`, `method`).
    ///
    /// `method` is parsed case-insensitively. Nothing is stored when either
    /// the method or the declaration is rejected.
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        declaration: Value,
    ) -> Result<(), FetchwrapError> {
        let method: HttpMethod = method
            .parse()
            .map_err(|_| FetchwrapError::invalid_method(method))?;
        let classified = Declaration::try_from(declaration.clone())?;
        let response = normalize(pattern, classified)?;
        self.push(method, pattern, declaration, response);
        Ok(())
    }

    /// Typed variant of [`MockRegistry::register`].
    pub fn register_declaration(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        declaration: Declaration,
    ) -> Result<(), FetchwrapError> {
        let raw = declaration.to_value();
        let response = normalize(pattern, declaration)?;
        self.push(method, pattern, raw, response);
        Ok(())
    }

    fn push(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        declaration: Value,
        response: NormalizedResponse,
    ) {
        self.patterns.insert(pattern);

        let key = MockKey::new(pattern, method);
        let sequence = self.sequences.entry(key.clone()).or_insert_with(|| {
            self.order.push(key);
            MockSequence::default()
        });
        sequence.push(MockEntry {
            declaration,
            response,
        });
    }

    /// Resolve a requested url to the pattern it is filed under.
    pub fn resolve(&self, url: &str) -> Option<&Pattern> {
        self.patterns.resolve(url)
    }

    /// Draw the next response for (`pattern`, `method`).
    ///
    /// Returns `None` when nothing is registered for that key.
    pub fn take(&mut self, pattern: &str, method: HttpMethod) -> Option<NormalizedResponse> {
        self.sequences
            .get_mut(&MockKey::new(pattern, method))
            .and_then(MockSequence::take)
            .cloned()
    }

    pub fn contains(&self, pattern: &str, method: HttpMethod) -> bool {
        self.sequences.contains_key(&MockKey::new(pattern, method))
    }

    pub fn sequence(&self, pattern: &str, method: HttpMethod) -> Option<&MockSequence> {
        self.sequences.get(&MockKey::new(pattern, method))
    }

    /// Every declaration not consumed yet, in registration order.
    pub fn pending_entries(&self) -> Vec<PendingEntry> {
        self.order
            .iter()
            .filter_map(|key| self.sequences.get(key).map(|seq| (key, seq)))
            .flat_map(|(key, seq)| {
                seq.pending().iter().map(move |entry| PendingEntry {
                    pattern: key.pattern.clone(),
                    method: key.method,
                    declaration: entry.declaration.clone(),
                })
            })
            .collect()
    }

    /// Registered pattern sources, in registration order.
    pub fn patterns(&self) -> Vec<String> {
        self.patterns.sources()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Drop every sequence, pattern and cursor.
    pub fn reset(&mut self) {
        self.patterns.clear();
        self.sequences.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn registry_with(mocks: &[(&str, &str, Value)]) -> MockRegistry {
        let mut registry = MockRegistry::new();
        for (method, pattern, declaration) in mocks {
            registry
                .register(method, pattern, declaration.clone())
                .expect("Should register");
        }
        registry
    }

    #[rstest]
    fn test_register_creates_sequence() {
        let registry = registry_with(&[("get", "/foo", json!({"foo": "bar"}))]);
        let sequence = registry
            .sequence("/foo", HttpMethod::Get)
            .expect("Should exist");
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence.cursor(), None);
        assert_eq!(registry.patterns(), vec!["/foo".to_string()]);
    }

    #[rstest]
    fn test_register_invalid_method() {
        let mut registry = MockRegistry::new();
        let result = registry.register("FETCH", "/foo", json!(200));
        assert_eq!(
            result,
            Err(FetchwrapError::InvalidMethod {
                method: "FETCH".to_string()
            })
        );
        assert!(registry.is_empty());
        assert!(registry.patterns().is_empty());
    }

    #[rstest]
    fn test_register_invalid_payload_stores_nothing() {
        let mut registry = MockRegistry::new();
        let result = registry.register("GET", "/foo", json!("nope"));
        assert!(matches!(result, Err(FetchwrapError::InvalidPayload { .. })));
        assert!(registry.is_empty());
        assert!(registry.resolve("/foo").is_none());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn test_take_replays_in_order_then_sticks_to_last(#[case] n: usize) {
        let mut registry = MockRegistry::new();
        for i in 0..n {
            registry
                .register("GET", "/seq", json!({ "i": i }))
                .expect("Should register");
        }

        for i in 0..n {
            let response = registry.take("/seq", HttpMethod::Get).expect("Should take");
            assert_eq!(response.body, json!({ "i": i }));
        }
        for _ in 0..3 {
            let response = registry.take("/seq", HttpMethod::Get).expect("Should take");
            assert_eq!(response.body, json!({ "i": n - 1 }));
        }

        let sequence = registry.sequence("/seq", HttpMethod::Get).expect("exists");
        assert_eq!(sequence.cursor(), Some(n + 3));
    }

    #[rstest]
    fn test_take_unregistered_key() {
        let mut registry = registry_with(&[("GET", "/foo", json!(200))]);
        assert!(registry.take("/foo", HttpMethod::Post).is_none());
        assert!(registry.take("/bar", HttpMethod::Get).is_none());
    }

    #[rstest]
    fn test_methods_are_independent_sequences() {
        let mut registry = registry_with(&[
            ("GET", "/foo", json!({"get": 1})),
            ("POST", "/foo", json!({"post": 1, "status": 400})),
        ]);

        let posted = registry.take("/foo", HttpMethod::Post).expect("post");
        assert_eq!(posted.status, 400);
        assert_eq!(posted.body, json!({"post": 1}));

        let got = registry.take("/foo", HttpMethod::Get).expect("get");
        assert_eq!(got.status, 200);
        assert_eq!(got.body, json!({"get": 1}));
    }

    #[rstest]
    fn test_pending_entries_before_and_after_dispatch() {
        let mut registry = registry_with(&[
            ("GET", "/foo", json!({"foo": "bar"})),
            ("GET", "/foo", json!(200)),
            ("POST", "/foo", json!({"biz": "bang", "status": 400})),
            ("GET", "/bar", json!({"a": "b"})),
        ]);

        let pending = registry.pending_entries();
        assert_eq!(pending.len(), 4);
        assert_eq!(pending[0].declaration, json!({"foo": "bar"}));
        assert_eq!(pending[1].declaration, json!(200));
        assert_eq!(pending[2].method, HttpMethod::Post);
        assert_eq!(pending[2].declaration, json!({"biz": "bang", "status": 400}));
        assert_eq!(pending[3].pattern, "/bar");

        registry.take("/foo", HttpMethod::Get);
        let pending = registry.pending_entries();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].declaration, json!(200));

        registry.take("/foo", HttpMethod::Get);
        registry.take("/foo", HttpMethod::Get);
        registry.take("/foo", HttpMethod::Post);
        let pending = registry.pending_entries();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].pattern, "/bar");
    }

    #[rstest]
    fn test_appending_after_saturation_is_left_pending() {
        let mut registry = registry_with(&[("GET", "/foo", json!(200))]);
        registry.take("/foo", HttpMethod::Get);
        registry.take("/foo", HttpMethod::Get);

        registry
            .register("GET", "/foo", json!({"late": true}))
            .expect("Should register");

        // Cursor is already past the new entry's index.
        assert!(registry.pending_entries().is_empty());
        let response = registry.take("/foo", HttpMethod::Get).expect("take");
        assert_eq!(response.body, json!({"late": true}));
    }

    #[rstest]
    fn test_register_declaration_typed() {
        let mut registry = MockRegistry::new();
        registry
            .register_declaration(HttpMethod::Delete, "/item", Declaration::status(204))
            .expect("Should register");

        let pending = registry.pending_entries();
        assert_eq!(pending[0].declaration, json!(204));

        let response = registry.take("/item", HttpMethod::Delete).expect("take");
        assert_eq!(response.status, 204);
        assert_eq!(response.status_text, "No Content");
    }

    #[rstest]
    fn test_reset() {
        let mut registry = registry_with(&[("GET", "/foo", json!(200))]);
        registry.take("/foo", HttpMethod::Get);
        registry.reset();

        assert!(registry.is_empty());
        assert!(registry.patterns().is_empty());
        assert!(registry.pending_entries().is_empty());
        assert!(registry.resolve("/foo").is_none());
    }

    #[rstest]
    fn test_pending_entry_serializes_as_validate_triple() {
        let entry = PendingEntry {
            pattern: "/foo".to_string(),
            method: HttpMethod::Get,
            declaration: json!(404),
        };
        let value = serde_json::to_value(&entry).expect("Should serialize");
        assert_eq!(
            value,
            json!({"url": "/foo", "method": "GET", "payload": 404})
        );
    }
}
