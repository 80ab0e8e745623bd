//! Url pattern matching: exact paths and regular-expression sources.

use regex::Regex;
use std::collections::HashMap;

/// A pattern a mock sequence is filed under.
///
/// Every pattern is first compared with the requested path verbatim. A source
/// that also compiles as a regular expression gets a second, unanchored
/// search pass, so `"/bar.*"` matches `/baritone`.
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Regex { source: String, regex: Regex },
}

impl Pattern {
    /// Compile a pattern source once, at registration time.
    pub fn compile(source: &str) -> Self {
        match Regex::new(source) {
            Ok(regex) => Pattern::Regex {
                source: source.to_owned(),
                regex,
            },
            Err(_) => Pattern::Exact(source.to_owned()),
        }
    }

    /// The string the pattern was registered with.
    pub fn source(&self) -> &str {
        match self {
            Pattern::Exact(source) => source,
            Pattern::Regex { source, .. } => source,
        }
    }

    /// Whether `path` (query already stripped) matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(source) => source == path,
            Pattern::Regex { source, regex } => source == path || regex.is_match(path),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for Pattern {}

/// Drop everything from the first `?` on.
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Ordered set of registered patterns with an exact-source index.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    index: HashMap<String, usize>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern source if it is not present yet and return its source.
    pub fn insert(&mut self, source: &str) -> &Pattern {
        let idx = match self.index.get(source) {
            Some(&idx) => idx,
            None => {
                self.patterns.push(Pattern::compile(source));
                let idx = self.patterns.len() - 1;
                self.index.insert(source.to_owned(), idx);
                idx
            }
        };
        &self.patterns[idx]
    }

    pub fn contains(&self, source: &str) -> bool {
        self.index.contains_key(source)
    }

    /// Resolve a requested url to the pattern it is filed under.
    ///
    /// The query string is ignored. An exact source match wins outright;
    /// otherwise patterns are searched in registration order and the first
    /// hit is returned.
    pub fn resolve(&self, url: &str) -> Option<&Pattern> {
        let path = strip_query(url);

        if let Some(&idx) = self.index.get(path) {
            return self.patterns.get(idx);
        }

        self.patterns.iter().find(|pattern| pattern.matches(path))
    }

    /// Registered pattern sources, in registration order.
    pub fn sources(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.source().to_owned()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn set_of(sources: &[&str]) -> PatternSet {
        let mut set = PatternSet::new();
        for source in sources {
            set.insert(source);
        }
        set
    }

    #[rstest]
    #[case("/bar.*", "/bar", true)]
    #[case("/bar.*", "/baritone", true)]
    #[case("/bar.*", "/fidelity", false)]
    #[case("/foo", "/foo", true)]
    #[case("/foo", "/fool", true)]
    #[case("/foo", "/bar", false)]
    #[case("^/api/users/\\d+$", "/api/users/42", true)]
    #[case("^/api/users/\\d+$", "/api/users/abc", false)]
    #[case("/api/(", "/api/(", true)]
    #[case("/api/(", "/api/", false)]
    fn test_pattern_matches(#[case] source: &str, #[case] path: &str, #[case] expected: bool) {
        assert_eq!(Pattern::compile(source).matches(path), expected);
    }

    #[rstest]
    fn test_invalid_regex_falls_back_to_exact() {
        let pattern = Pattern::compile("/api/(");
        assert!(matches!(pattern, Pattern::Exact(_)));
        assert_eq!(pattern.source(), "/api/(");
    }

    #[rstest]
    #[case("/foo", "/foo")]
    #[case("/foo?x=1", "/foo")]
    #[case("/foo?x=1?y=2", "/foo")]
    #[case("?x", "")]
    fn test_strip_query(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(strip_query(url), expected);
    }

    #[rstest]
    #[case("/foo", Some("/foo"))]
    #[case("/foo?x=1", Some("/foo"))]
    #[case("/bar", Some("/bar.*"))]
    #[case("/baritone?q", Some("/bar.*"))]
    #[case("/fidelity", None)]
    fn test_resolve(#[case] url: &str, #[case] expected: Option<&str>) {
        let set = set_of(&["/foo", "/bar.*"]);
        assert_eq!(set.resolve(url).map(Pattern::source), expected);
    }

    #[rstest]
    fn test_resolve_prefers_exact_over_earlier_regex() {
        let set = set_of(&["/api/.*", "/api/users"]);
        assert_eq!(
            set.resolve("/api/users").map(Pattern::source),
            Some("/api/users")
        );
    }

    #[rstest]
    fn test_resolve_first_registered_regex_wins() {
        let set = set_of(&["/api/.*", "/api/users/.*"]);
        assert_eq!(
            set.resolve("/api/users/1").map(Pattern::source),
            Some("/api/.*")
        );

        let set = set_of(&["/api/users/.*", "/api/.*"]);
        assert_eq!(
            set.resolve("/api/users/1").map(Pattern::source),
            Some("/api/users/.*")
        );
    }

    #[rstest]
    fn test_insert_is_idempotent_per_source() {
        let mut set = set_of(&["/foo", "/bar"]);
        set.insert("/foo");
        assert_eq!(set.len(), 2);
        assert_eq!(set.sources(), vec!["/foo".to_string(), "/bar".to_string()]);
    }

    #[rstest]
    fn test_clear() {
        let mut set = set_of(&["/foo"]);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains("/foo"));
        assert_eq!(set.resolve("/foo"), None);
    }
}
