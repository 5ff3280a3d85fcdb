//! Route URI normalization and wildcard fallback.
//!
//! # Responsibilities
//! - Normalize route keys (host matching is case-insensitive)
//! - Derive the next less specific wildcard form of a key
//!
//! # Design Decisions
//! - The whole key is lowercased, path included
//! - Only the host portion is generalized; a path suffix is carried unchanged
//! - Generalization stops at a single-label wildcard (`*.com`)

use std::fmt;

use serde::{Serialize, Serializer};

use crate::route::RouteError;

const WILDCARD_PREFIX: &str = "*.";

/// A normalized routing key: host plus optional path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(String);

impl Uri {
    /// Normalize a raw route string into a key.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RouteError> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(RouteError::EmptyUri);
        }
        Ok(Self(raw.to_lowercase()))
    }

    /// Normalized key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host portion of the key (everything before the first `/`).
    pub fn host(&self) -> &str {
        self.split().0
    }

    /// Path portion of the key, including its leading `/`, or `""`.
    pub fn path(&self) -> &str {
        self.split().1
    }

    /// True for keys whose host starts with `*.`.
    pub fn is_wildcard(&self) -> bool {
        self.host().starts_with(WILDCARD_PREFIX)
    }

    /// Produce the next, strictly more general, wildcard form of this key.
    ///
    /// `a.b.example.com` → `*.b.example.com` → `*.example.com` → `*.com`,
    /// after which [`RouteError::WildcardExhausted`] is returned.
    pub fn next_wildcard(&self) -> Result<Uri, RouteError> {
        let (host, path) = self.split();
        let remainder = host.strip_prefix(WILDCARD_PREFIX).unwrap_or(host);

        match remainder.find('.') {
            Some(dot) if dot + 1 < remainder.len() => {
                Ok(Uri(format!("*{}{}", &remainder[dot..], path)))
            }
            _ => Err(RouteError::WildcardExhausted(self.0.clone())),
        }
    }

    fn split(&self) -> (&str, &str) {
        match self.0.find('/') {
            Some(idx) => self.0.split_at(idx),
            None => (self.0.as_str(), ""),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Uri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(raw: &str) -> Uri {
        Uri::new(raw).unwrap()
    }

    #[test]
    fn test_normalizes_case() {
        assert_eq!(uri("Foo.COM"), uri("foo.com"));
        assert_eq!(uri("Foo.Com/Path").as_str(), "foo.com/path");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Uri::new(""), Err(RouteError::EmptyUri));
        assert_eq!(Uri::new("   "), Err(RouteError::EmptyUri));
    }

    #[test]
    fn test_wildcard_chain_terminates() {
        let mut current = uri("a.b.example.com");
        let mut chain = Vec::new();
        while let Ok(next) = current.next_wildcard() {
            chain.push(next.as_str().to_string());
            current = next;
        }
        assert_eq!(chain, vec!["*.b.example.com", "*.example.com", "*.com"]);
        assert!(matches!(
            current.next_wildcard(),
            Err(RouteError::WildcardExhausted(_))
        ));
    }

    #[test]
    fn test_wildcard_keeps_path() {
        let next = uri("foo.example.com/v1.2/api").next_wildcard().unwrap();
        assert_eq!(next.as_str(), "*.example.com/v1.2/api");
        assert_eq!(next.host(), "*.example.com");
        assert_eq!(next.path(), "/v1.2/api");
    }

    #[test]
    fn test_single_label_is_exhausted() {
        assert!(uri("localhost").next_wildcard().is_err());
        assert!(uri("*.com").next_wildcard().is_err());
        assert!(uri("localhost/api").next_wildcard().is_err());
    }
}
