//! Tag matching.
//!
//! Two distinct algorithms live here:
//!
//! - [`matches_tag_query`]: the single-field tag filter with three modes
//!   (exact `key=value`, `key=` / `key=partial` patterns, free text);
//! - [`apply_tag_filters`]: the chip filter, an AND over exact,
//!   case-sensitive `key=value` pairs with no pattern support.
//!
//! They are deliberately separate; the chip filter is stricter.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::path::{contains_ignore_case, eq_ignore_case};
use crate::types::CatalogRecord;

/// Which mode of the tag filter a query string falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagQuery<'a> {
    /// `key=`: any value under a key (key compared ignoring case).
    KeyPrefix {
        /// Key to look for.
        key: &'a str,
    },
    /// `key=value`: key equal ignoring case, value containing the fragment.
    KeyValue {
        /// Key to look for.
        key: &'a str,
        /// Value fragment.
        value: &'a str,
    },
    /// Text with `=` that fits neither pattern (e.g. `=x`); only an exact
    /// composite match can satisfy it.
    Malformed,
    /// No `=`: substring of any key or value.
    Text(&'a str),
}

fn key_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^=]+)=$").expect("tag prefix pattern is valid"))
}

fn key_value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([^=]+)=(.+)$").expect("tag key/value pattern is valid"))
}

impl<'a> TagQuery<'a> {
    /// Classify a (trimmed) query string.
    pub fn parse(query: &'a str) -> Self {
        if let Some(caps) = key_prefix_pattern().captures(query) {
            if let Some(key) = caps.get(1) {
                return Self::KeyPrefix { key: key.as_str() };
            }
        }
        if let Some(caps) = key_value_pattern().captures(query) {
            if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
                return Self::KeyValue {
                    key: key.as_str(),
                    value: value.as_str(),
                };
            }
        }
        if query.contains('=') {
            Self::Malformed
        } else {
            Self::Text(query)
        }
    }

    fn matches(&self, pairs: &[(&str, &str)]) -> bool {
        match self {
            Self::KeyPrefix { key } => pairs.iter().any(|(k, _)| eq_ignore_case(k, key)),
            Self::KeyValue { key, value } => pairs
                .iter()
                .any(|(k, v)| eq_ignore_case(k, key) && contains_ignore_case(v, value)),
            Self::Malformed => false,
            Self::Text(text) => pairs
                .iter()
                .any(|(k, v)| contains_ignore_case(k, text) || contains_ignore_case(v, text)),
        }
    }
}

/// String-valued pairs of a JSON tag mapping; `None` if it is not an object.
pub fn tag_pairs_from_value(tags: &Value) -> Option<Vec<(&str, &str)>> {
    let map = tags.as_object()?;
    Some(
        map.iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
            .collect(),
    )
}

fn has_exact_pair(pairs: &[(&str, &str)], composite: &str) -> bool {
    pairs.iter().any(|(k, v)| {
        composite.len() == k.len() + 1 + v.len()
            && composite.starts_with(k)
            && composite[k.len()..].starts_with('=')
            && composite.ends_with(v)
    })
}

/// Evaluate the single-field tag filter against a tag mapping.
///
/// Modes are tried in priority order: an exact `key=value` composite equal to
/// the trimmed query, then the `key=` / `key=partial` patterns, then (only if
/// the query has no `=`) free text against keys and values. A missing or
/// non-object mapping never matches.
pub fn matches_tag_query(tags: Option<&Value>, query: &str) -> bool {
    let Some(pairs) = tags.and_then(tag_pairs_from_value) else {
        return false;
    };
    matches_tag_pairs(&pairs, query)
}

/// [`matches_tag_query`] over already-extracted pairs.
pub fn matches_tag_pairs(pairs: &[(&str, &str)], query: &str) -> bool {
    let query = query.trim();
    if has_exact_pair(pairs, query) {
        return true;
    }
    TagQuery::parse(query).matches(pairs)
}

/// Keep the items carrying every `key=value` chip verbatim.
///
/// Matching is exact and case-sensitive; no chips keeps everything. Items
/// without a tag mapping are dropped as soon as one chip is given.
pub fn apply_tag_filters<'a, T, S>(items: &'a [T], chips: &[S]) -> Vec<&'a T>
where
    T: CatalogRecord,
    S: AsRef<str>,
{
    if chips.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| match item.tag_pairs() {
            Some(pairs) => chips.iter().all(|chip| has_exact_pair(&pairs, chip.as_ref())),
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags() -> Value {
        json!({ "a": "1", "b": "2" })
    }

    #[test]
    fn test_exact_prefix_partial_and_text_modes() {
        let t = tags();
        assert!(matches_tag_query(Some(&t), "a=1"));
        assert!(!matches_tag_query(Some(&t), "a=2"));
        assert!(matches_tag_query(Some(&t), "a="));
        assert!(!matches_tag_query(Some(&t), "c=1"));
        assert!(matches_tag_query(Some(&t), "2"));
        assert!(matches_tag_query(Some(&t), "B"));
        assert!(!matches_tag_query(Some(&t), "z"));
    }

    #[test]
    fn test_partial_mode_is_case_insensitive() {
        let t = json!({ "Environment": "Production" });
        assert!(matches_tag_query(Some(&t), "environment=prod"));
        assert!(matches_tag_query(Some(&t), "ENVIRONMENT="));
        assert!(!matches_tag_query(Some(&t), "env=prod"));
    }

    #[test]
    fn test_query_is_trimmed() {
        let t = tags();
        assert!(matches_tag_query(Some(&t), "  a=1  "));
    }

    #[test]
    fn test_malformed_queries_need_exact_match() {
        let t = json!({ "": "x" });
        assert_eq!(TagQuery::parse("=x"), TagQuery::Malformed);
        assert!(matches_tag_query(Some(&t), "=x"));
        assert!(!matches_tag_query(Some(&tags()), "=1"));
    }

    #[test]
    fn test_value_containing_equals() {
        let t = json!({ "expr": "a=b" });
        assert!(matches_tag_query(Some(&t), "expr=a=b"));
        assert!(matches_tag_query(Some(&t), "expr=b"));
    }

    #[test]
    fn test_missing_or_invalid_mapping_never_matches() {
        assert!(!matches_tag_query(None, "a"));
        assert!(!matches_tag_query(Some(&Value::Null), "a"));
        assert!(!matches_tag_query(Some(&json!("a=1")), "a=1"));
        assert!(!matches_tag_query(Some(&json!({ "a": 1 })), "a=1"));
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(TagQuery::parse("team="), TagQuery::KeyPrefix { key: "team" });
        assert_eq!(
            TagQuery::parse("team=ml"),
            TagQuery::KeyValue { key: "team", value: "ml" }
        );
        assert_eq!(TagQuery::parse("team"), TagQuery::Text("team"));
    }

    fn chip_items() -> Vec<Value> {
        vec![
            json!({ "spec": { "name": "item-1", "tags": { "environment": "production", "team": "ml" } } }),
            json!({ "spec": { "name": "item-2", "tags": { "environment": "staging", "team": "data" } } }),
            json!({ "spec": { "name": "item-3", "tags": { "environment": "production", "team": "ml" } } }),
            json!({ "spec": { "name": "item-4", "tags": {} } }),
            json!({ "spec": { "name": "item-5" } }),
        ]
    }

    fn names(items: &[&Value]) -> Vec<String> {
        items.iter().filter_map(|i| i.name()).map(str::to_string).collect()
    }

    #[test]
    fn test_chips_and_semantics() {
        let items = chip_items();
        let result = apply_tag_filters(&items, &["environment=production", "team=ml"]);
        assert_eq!(names(&result), vec!["item-1", "item-3"]);

        let result = apply_tag_filters(&items, &["environment=production", "team=data"]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_no_chips_keeps_everything() {
        let items = chip_items();
        let chips: [&str; 0] = [];
        assert_eq!(apply_tag_filters(&items, &chips).len(), 5);
    }

    #[test]
    fn test_chips_are_exact_only() {
        let items = chip_items();
        assert!(apply_tag_filters(&items, &["environment=Production"]).is_empty());
        assert!(apply_tag_filters(&items, &["environment="]).is_empty());
        assert!(apply_tag_filters(&items, &["environment"]).is_empty());
        assert!(apply_tag_filters(&items, &["="]).is_empty());
        assert!(apply_tag_filters(&items, &["environment=prod"]).is_empty());
    }

    #[test]
    fn test_chip_with_empty_value_and_spaces() {
        let items = vec![json!({
            "spec": { "name": "x", "tags": { "status": "", "team name": "ml team" } }
        })];
        assert_eq!(apply_tag_filters(&items, &["status="]).len(), 1);
        assert_eq!(apply_tag_filters(&items, &["team name=ml team"]).len(), 1);
    }
}
