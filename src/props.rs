//! Row and cell props
//!
//! `Props` is the attribute map a renderer attaches to a row or cell (a CSS
//! class, a title, a data attribute). Maps compose by merging, with the later
//! map winning on key conflicts.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

pub const CLASS_NAME: &str = "className";

/// Ordered attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    pub fn new() -> Self {
        Props(BTreeMap::new())
    }

    /// Shorthand for `{"className": name}`.
    pub fn class_name(name: impl Into<String>) -> Self {
        Props::new().with(CLASS_NAME, name)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Merge `other` over `self`; keys from `other` replace existing ones.
    pub fn merge(&mut self, other: Props) {
        self.0.extend(other.0);
    }

    pub fn merged(mut self, other: Props) -> Self {
        self.merge(other);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_later_wins() {
        let parent = Props::class_name("a");
        let decorated = Props::class_name("b").with("title", "t");
        let merged = parent.merged(decorated.clone());
        assert_eq!(merged, decorated);
        assert_eq!(merged.get(CLASS_NAME), Some("b"));
        assert_eq!(merged.get("title"), Some("t"));
    }

    #[test]
    fn test_merge_keeps_unrelated_keys() {
        let mut props = Props::new().with("data-id", "7");
        props.merge(Props::class_name("row"));
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("data-id"), Some("7"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let props: Props = [("className", "odd"), ("title", "x")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&props).unwrap(),
            r#"{"className":"odd","title":"x"}"#
        );
    }
}
