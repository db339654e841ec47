//! Chain identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// An ordered, root-to-leaf sequence of identifier segments.
///
/// Segments may repeat. A chain is never mutated once it has been handed to
/// observers; new chains are produced by concatenation.
///
/// # Example
///
/// ```rust
/// use chainspy_core::Chain;
///
/// let root = Chain::from(["form", "field"]);
/// let full = root.concat("click");
///
/// assert_eq!(full, ["form", "field", "click"]);
/// assert_eq!(root.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(Vec<String>);

impl Chain {
    /// Create an empty chain.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a chain holding a single segment.
    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// The segments of this chain, root first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Build a new chain with `tail` appended after this one.
    #[must_use]
    pub fn concat(&self, tail: impl IntoChain) -> Self {
        let tail = tail.into_chain();
        let mut segments = Vec::with_capacity(self.0.len() + tail.0.len());
        segments.extend(self.0.iter().cloned());
        segments.extend(tail.0);
        Self(segments)
    }

    /// Build a new chain with a single segment appended.
    #[must_use]
    pub fn with(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Check whether this chain begins with the given segments.
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        prefix.len() <= self.0.len()
            && self
                .0
                .iter()
                .zip(prefix)
                .all(|(segment, expected)| segment == expected.as_ref())
    }

    /// Consume the chain and return its segments.
    pub fn into_segments(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Chain {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<String> for Chain {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Chain {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for Chain {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<Vec<&str>> for Chain {
    fn from(segments: Vec<&str>) -> Self {
        segments.into_iter().collect()
    }
}

impl From<&[&str]> for Chain {
    fn from(segments: &[&str]) -> Self {
        segments.iter().copied().collect()
    }
}

impl From<&[String]> for Chain {
    fn from(segments: &[String]) -> Self {
        Self(segments.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Chain {
    fn from(segments: [&str; N]) -> Self {
        segments.into_iter().collect()
    }
}

impl From<&Chain> for Chain {
    fn from(chain: &Chain) -> Self {
        chain.clone()
    }
}

impl From<&str> for Chain {
    fn from(segment: &str) -> Self {
        Self::root(segment)
    }
}

impl From<String> for Chain {
    fn from(segment: String) -> Self {
        Self::root(segment)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for Chain {
    fn eq(&self, other: &[&str; N]) -> bool {
        self.0.len() == N && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl PartialEq<[&str]> for Chain {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl PartialEq<Vec<&str>> for Chain {
    fn eq(&self, other: &Vec<&str>) -> bool {
        self == other.as_slice()
    }
}

/// Conversion into a [`Chain`].
///
/// Accepts either a single segment (`&str`, `String`) or a sequence of
/// segments, so that callers can pass `"click"` or `["wow", "click"]` alike.
pub trait IntoChain {
    /// Convert into a chain.
    fn into_chain(self) -> Chain;
}

impl<T: Into<Chain>> IntoChain for T {
    fn into_chain(self) -> Chain {
        self.into()
    }
}
