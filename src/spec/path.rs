//! Hierarchical spec address.
//!
//! Example: "/temp/0/name"  =>  Path(vec!["temp", "0", "name"])
//!
//! The root is "/" with no segments. We store segments as a Vec<String> and
//! derive ordering so paths can be used in BTreeSet/Map.

use crate::{Error, Result};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse "/a/b/0" into Path(vec!["a", "b", "0"]).
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::malformed(s, "path is empty"));
        }
        let Some(rest) = s.strip_prefix(SEPARATOR) else {
            return Err(Error::malformed(s, "path must start with the root (/)"));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for seg in rest.split(SEPARATOR) {
            if seg.is_empty() {
                return Err(Error::malformed(s, "empty path segment"));
            }
            segments.push(seg.to_string());
        }
        Ok(Self(segments))
    }

    /// Return a new path with one more segment.
    pub fn join(&self, segment: impl AsRef<str>) -> Result<Self> {
        let segment = segment.as_ref();
        if segment.is_empty() {
            return Err(Error::malformed(segment, "empty path segment"));
        }
        if segment.contains(SEPARATOR) {
            return Err(Error::malformed(segment, "segment contains the separator"));
        }
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Ok(Self(segments))
    }

    /// Sequence-element child; index segments are always valid.
    pub fn join_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Last segment, or "" for the root.
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// None for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// True if `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.len() >= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// Longest shared prefix of `self` and `other`.
    pub fn common_ancestor(&self, other: &Path) -> Self {
        let shared = self
            .0
            .iter()
            .zip(&other.0)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.clone())
            .collect();
        Self(shared)
    }

    /// Full-match the string form against `pattern`.
    pub fn matches(&self, pattern: &Pattern) -> bool {
        pattern.is_match(&self.to_string())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{}", SEPARATOR);
        }
        for seg in &self.0 {
            write!(f, "{}{}", SEPARATOR, seg)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A regular expression that only ever matches whole paths.
///
/// `/temp/[a-z]+` matches `/temp/name` but not `/temp/meta/name`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    re: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let re = Regex::new(&format!(r"\A(?:{})\z", source)).map_err(|e| {
            Error::InvalidPattern {
                pattern: source.to_string(),
                source: e,
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            re,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.re.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn parses_root_and_nested() {
        assert!(p("/").is_root());
        assert_eq!(p("/a/b/0").segments(), ["a", "b", "0"]);
        assert_eq!(p("/a/b/0").to_string(), "/a/b/0");
        assert_eq!(p("/").to_string(), "/");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "a", "a/b", "/a//b", "/a/"] {
            assert!(
                matches!(Path::parse(bad), Err(Error::MalformedPath { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn join_validates_segment() {
        let root = Path::root();
        assert_eq!(root.join("a").unwrap().join("b").unwrap(), p("/a/b"));
        assert!(root.join("a/b").is_err());
        assert!(root.join("").is_err());
        assert_eq!(p("/a").join_index(3), p("/a/3"));
    }

    #[test]
    fn parent_and_name() {
        assert_eq!(p("/a/b").parent(), Some(p("/a")));
        assert_eq!(p("/a").parent(), Some(Path::root()));
        assert_eq!(Path::root().parent(), None);
        assert_eq!(p("/a/b").name(), "b");
        assert_eq!(Path::root().name(), "");
    }

    #[test]
    fn ancestry() {
        assert!(p("/a/b").starts_with(&p("/a")));
        assert!(p("/a").starts_with(&p("/a")));
        assert!(!p("/ab").starts_with(&p("/a")));
        assert_eq!(p("/a/b/c").common_ancestor(&p("/a/b/d")), p("/a/b"));
        assert_eq!(p("/a").common_ancestor(&p("/b")), Path::root());
    }

    #[test]
    fn match_is_anchored() {
        let pat = Pattern::new("/temp/[a-z]+").unwrap();
        assert!(p("/temp/name").matches(&pat));
        assert!(!p("/temp/meta/name").matches(&pat));
        assert!(!p("/x/temp/name").matches(&pat));

        let any = Pattern::new(".*").unwrap();
        assert!(Path::root().matches(&any));
        // Alternation must not escape the anchors.
        let alt = Pattern::new("/a|/b").unwrap();
        assert!(!p("/a/c").matches(&alt));
        assert!(p("/b").matches(&alt));
    }

    #[test]
    fn bad_pattern_is_reported() {
        assert!(matches!(
            Pattern::new("/a/("),
            Err(Error::InvalidPattern { .. })
        ));
    }
}
