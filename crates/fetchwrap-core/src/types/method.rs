//! HTTP method keys accepted by the mock registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP method a mock can be registered under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Delete,
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    /// Every method accepted by the registry, in the order error messages list them.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Delete,
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Comma separated list of valid methods, used in error messages.
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(HttpMethod::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive parse; `"get"`, `"Get"` and `"GET"` are all [`HttpMethod::Get`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GET", HttpMethod::Get)]
    #[case("get", HttpMethod::Get)]
    #[case("Post", HttpMethod::Post)]
    #[case("patch", HttpMethod::Patch)]
    #[case(" delete ", HttpMethod::Delete)]
    #[case("HEAD", HttpMethod::Head)]
    #[case("options", HttpMethod::Options)]
    #[case("pUt", HttpMethod::Put)]
    fn test_parse_method(#[case] input: &str, #[case] expected: HttpMethod) {
        assert_eq!(input.parse::<HttpMethod>(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("FETCH")]
    #[case("CONNECT")]
    #[case("TRACE")]
    #[case("GETS")]
    fn test_parse_unknown_method(#[case] input: &str) {
        assert_eq!(
            input.parse::<HttpMethod>(),
            Err(UnknownMethod(input.to_owned()))
        );
    }

    #[rstest]
    fn test_valid_list() {
        assert_eq!(
            HttpMethod::valid_list(),
            "DELETE,GET,HEAD,OPTIONS,POST,PUT,PATCH"
        );
    }

    #[rstest]
    fn test_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Options).expect("Should serialize");
        assert_eq!(json, "\"OPTIONS\"");
        let back: HttpMethod = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, HttpMethod::Options);
    }
}
