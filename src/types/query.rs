//! Filter query types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value a calling UI supplies for one filter key.
///
/// Select-style inputs send `{label, value}`; only `value` takes part in
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Free text.
    Text(String),
    /// Labelled option.
    Labeled {
        /// Display label, ignored by matching.
        label: String,
        /// Value used for matching.
        value: String,
    },
}

impl FilterValue {
    /// The string used for matching.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Labeled { value, .. } => value,
        }
    }

    /// Empty values impose no constraint.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Filter key → value. Keys mapped to `None` (JSON `null`) are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterQuery(BTreeMap<String, Option<FilterValue>>);

impl FilterQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style setter for a `{label, value}` option.
    pub fn with_option(
        mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.0.insert(
            key.into(),
            Some(FilterValue::Labeled {
                label: label.into(),
                value: value.into(),
            }),
        );
        self
    }

    /// Set a key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), Some(value.into()));
    }

    /// Mark a key as present but unset.
    pub fn unset(&mut self, key: impl Into<String>) {
        self.0.insert(key.into(), None);
    }

    /// Remove a key, returning its value if it had one.
    pub fn take(&mut self, key: &str) -> Option<FilterValue> {
        self.0.remove(key).flatten()
    }

    /// Value for a key, if set.
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key).and_then(Option::as_ref)
    }

    /// Keys with a non-empty value, in key order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(k, v)| match v {
            Some(v) if !v.is_empty() => Some((k.as_str(), v.as_str())),
            _ => None,
        })
    }

    /// Check if no key carries a constraint.
    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_wire_shape() {
        let json = r#"{"name": "item", "owner": {"label": "Team A", "value": "team-a"}, "project": null}"#;
        let query: FilterQuery = serde_json::from_str(json).unwrap();

        assert_eq!(query.get("name").map(FilterValue::as_str), Some("item"));
        assert_eq!(query.get("owner").map(FilterValue::as_str), Some("team-a"));
        assert_eq!(query.get("project"), None);
    }

    #[test]
    fn test_active_skips_empty_and_absent() {
        let mut query = FilterQuery::new().with("a", "").with("b", "x");
        query.unset("c");

        let active: Vec<_> = query.active().collect();
        assert_eq!(active, vec![("b", "x")]);
        assert!(FilterQuery::new().with("a", "").is_unconstrained());
    }
}
