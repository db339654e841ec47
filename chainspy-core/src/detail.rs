//! Broadcast payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

/// Opaque key/value payload attached to a single broadcast.
///
/// The core enforces no schema. The default is an empty object, which is what
/// observers receive when a caller sends a chain without a detail.
///
/// # Example
///
/// ```rust
/// use chainspy_core::Detail;
///
/// let detail = Detail::new().with("val", 1).with("source", "keyboard");
/// assert_eq!(detail.get("val"), Some(&serde_json::json!(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Detail(Map<String, Value>);

impl Detail {
    /// Create an empty detail.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a field, returning the updated detail.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Consume the detail and return the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Detail {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Detail {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Detail {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Detail {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_empty_object() {
        let detail = Detail::default();
        assert!(detail.is_empty());
        assert_eq!(serde_json::to_value(&detail).unwrap(), json!({}));
    }

    #[test]
    fn test_builder_and_collect_agree() {
        let built = Detail::new().with("val", 1);
        let collected: Detail = [("val", 1)].into_iter().collect();
        assert_eq!(built, collected);
    }
}
