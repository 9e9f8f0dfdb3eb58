//! Declarative multi-field filter engine.
//!
//! ## Algorithm
//!
//! 1. At construction, compile every mapped key into a [`PredicateKind`]
//! 2. Per call, keep the query's active keys that the mapping knows
//!    (unknown keys are ignored)
//! 3. Keep an item when every active predicate holds for it
//!
//! Output preserves input order and hands back references to the input
//! elements, so filtering its own output is possible and idempotent.

use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::date::is_on_or_after;
use super::mapping::{CatalogTable, CompiledKey, FilterKeyMapping, PredicateKind, DEFAULT_TAGS_PATH};
use super::path::{contains_folded, resolve_path, stringify_value};
use super::tags::matches_tag_query;
use crate::types::{CatalogRecord, FilterQuery, RelationshipIndex};

/// Fallback location of a feature collection when the mapped path is empty.
const SPEC_FEATURES_PATH: &str = "spec.features";

/// Filter engine bound to one key mapping.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    mapping: FilterKeyMapping,
    tags_path: String,
    compiled: BTreeMap<String, CompiledKey>,
}

impl FilterEngine {
    /// Engine with tags at `spec.tags`.
    pub fn new(mapping: FilterKeyMapping) -> Self {
        Self::with_tags_path(mapping, DEFAULT_TAGS_PATH)
    }

    /// Engine with a custom tag location.
    pub fn with_tags_path(mapping: FilterKeyMapping, tags_path: impl Into<String>) -> Self {
        let tags_path = tags_path.into();
        let compiled = mapping.compile(&tags_path);
        Self {
            mapping,
            tags_path,
            compiled,
        }
    }

    /// Engine preconfigured for a catalog list view.
    pub fn for_table(table: CatalogTable) -> Self {
        Self::with_tags_path(table.key_mapping(), table.tags_path())
    }

    /// The mapping this engine was built from.
    pub fn mapping(&self) -> &FilterKeyMapping {
        &self.mapping
    }

    /// Tag mapping location.
    pub fn tags_path(&self) -> &str {
        &self.tags_path
    }

    /// Predicate a key compiled to, if the key is mapped.
    pub fn predicate_kind(&self, key: &str) -> Option<PredicateKind> {
        self.compiled.get(key).map(|c| c.kind)
    }

    /// Keep the items satisfying every active filter in `query`.
    pub fn apply_filters<'a, T: CatalogRecord>(
        &self,
        items: &'a [T],
        relationships: &RelationshipIndex,
        query: &FilterQuery,
    ) -> Vec<&'a T> {
        let constraints = self.constraints(query);
        if constraints.is_empty() {
            return items.iter().collect();
        }

        let kept: Vec<&T> = items
            .iter()
            .filter(|item| constraints.hold_for(*item, relationships))
            .collect();

        tracing::trace!(
            target: "feature_lineage::filter",
            total = items.len(),
            kept = kept.len(),
            constraints = constraints.len(),
            "filters applied"
        );
        kept
    }

    /// Whether a single item passes `query`.
    pub fn matches<T: CatalogRecord>(
        &self,
        item: &T,
        relationships: &RelationshipIndex,
        query: &FilterQuery,
    ) -> bool {
        self.constraints(query).hold_for(item, relationships)
    }

    fn constraints<'q>(&'q self, query: &'q FilterQuery) -> Constraints<'q> {
        let list: Vec<Constraint<'q>> = query
            .active()
            .filter_map(|(key, value)| match self.compiled.get(key) {
                Some(compiled) => Some(Constraint::new(compiled, value)),
                None => {
                    tracing::trace!(target: "feature_lineage::filter", key, "ignoring unmapped filter key");
                    None
                }
            })
            .collect();
        let needs_document = list
            .iter()
            .any(|c| c.compiled.kind != PredicateKind::RelatedFeatureView);
        Constraints { list, needs_document }
    }
}

/// One active filter, with its value case-folded once where the predicate
/// compares case-insensitively.
struct Constraint<'q> {
    compiled: &'q CompiledKey,
    value: &'q str,
    folded: Option<String>,
}

impl<'q> Constraint<'q> {
    fn new(compiled: &'q CompiledKey, value: &'q str) -> Self {
        let folded = match compiled.kind {
            PredicateKind::RelatedFeatureView | PredicateKind::Features | PredicateKind::Text => {
                Some(value.to_lowercase())
            }
            PredicateKind::Tag | PredicateKind::Date => None,
        };
        Self { compiled, value, folded }
    }

    fn folded(&self) -> &str {
        self.folded.as_deref().unwrap_or(self.value)
    }
}

/// The constraints of one query. Records are only rendered to JSON when some
/// constraint reads an attribute path.
struct Constraints<'q> {
    list: Vec<Constraint<'q>>,
    needs_document: bool,
}

impl Constraints<'_> {
    fn len(&self) -> usize {
        self.list.len()
    }

    fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    fn hold_for<T: CatalogRecord>(&self, item: &T, relationships: &RelationshipIndex) -> bool {
        let document = if self.needs_document {
            item.document()
        } else {
            Cow::Owned(Value::Null)
        };
        self.list.iter().all(|c| {
            let path = c.compiled.path.as_str();
            match c.compiled.kind {
                PredicateKind::Tag => matches_tag_query(resolve_path(&document, path), c.value),
                PredicateKind::RelatedFeatureView => item
                    .name()
                    .is_some_and(|name| has_related_feature_view(relationships, name, c.folded())),
                PredicateKind::Features => has_feature_named(&document, path, c.folded()),
                PredicateKind::Date => is_on_or_after(resolve_path(&document, path), c.value),
                PredicateKind::Text => {
                    contains_folded(&stringify_value(resolve_path(&document, path)), c.folded())
                }
            }
        })
    }
}

/// Any relationship of `item_key` touching a feature view (either side)
/// whose name contains the lowercase `needle`.
fn has_related_feature_view(relationships: &RelationshipIndex, item_key: &str, needle: &str) -> bool {
    relationships.get(item_key).iter().any(|relationship| {
        [&relationship.source, &relationship.target].into_iter().any(|endpoint| {
            endpoint.kind().is_some_and(|k| k.is_feature_view())
                && endpoint.name().is_some_and(|n| contains_folded(n, needle))
        })
    })
}

/// Any element of the feature collection whose `name` contains the lowercase `needle`.
fn has_feature_named(document: &Value, path: &str, needle: &str) -> bool {
    let features = resolve_path(document, path)
        .filter(|v| v.is_array())
        .or_else(|| resolve_path(document, SPEC_FEATURES_PATH));
    features
        .and_then(Value::as_array)
        .is_some_and(|features| {
            features.iter().any(|feature| {
                feature
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| contains_folded(n, needle))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectRef, Relationship};
    use serde_json::json;

    fn mapping() -> FilterKeyMapping {
        FilterKeyMapping::new([
            ("name", "spec.name"),
            ("owner", "spec.owner"),
            ("project", "project"),
            ("tags", "spec.tags"),
            ("featureViews", "featureViews"),
            ("features", "features"),
            ("created", "meta.createdTimestamp"),
            ("updated", "meta.lastUpdatedTimestamp"),
        ])
    }

    fn items() -> Vec<Value> {
        vec![
            json!({
                "spec": {
                    "name": "item-1",
                    "owner": "team-a",
                    "tags": { "environment": "production", "team": "ml" },
                    "features": [{ "name": "trips_today" }]
                },
                "project": "project-a",
                "meta": {
                    "createdTimestamp": "2023-01-01T00:00:00Z",
                    "lastUpdatedTimestamp": "2023-01-01T00:00:00Z"
                }
            }),
            json!({
                "spec": {
                    "name": "item-2",
                    "owner": "team-b",
                    "tags": { "environment": "staging", "team": "data" }
                },
                "features": [{ "name": "avg_rating" }],
                "project": "project-b",
                "meta": {
                    "createdTimestamp": "2023-01-02T00:00:00Z",
                    "lastUpdatedTimestamp": "2023-01-02T00:00:00Z"
                }
            }),
        ]
    }

    fn relationships() -> RelationshipIndex {
        let mut index = RelationshipIndex::new();
        index.insert(
            "item-1",
            Relationship::new(ObjectRef::new("item-1", "entity"), ObjectRef::new("feature-view-1", "featureView")),
        );
        index.insert(
            "item-2",
            Relationship::new(
                ObjectRef::new("stream-view-2", "streamFeatureView"),
                ObjectRef::new("item-2", "entity"),
            ),
        );
        index
    }

    fn names(result: &[&Value]) -> Vec<String> {
        result.iter().filter_map(|v| v.name()).map(str::to_string).collect()
    }

    fn run(query: FilterQuery) -> Vec<String> {
        let engine = FilterEngine::new(mapping());
        let items = items();
        names(&engine.apply_filters(&items, &relationships(), &query))
    }

    #[test]
    fn test_empty_query_is_identity() {
        let engine = FilterEngine::new(mapping());
        let items = items();
        let result = engine.apply_filters(&items, &relationships(), &FilterQuery::new());
        assert_eq!(result.len(), 2);
        assert!(std::ptr::eq(result[0], &items[0]));
        assert!(std::ptr::eq(result[1], &items[1]));
    }

    #[test]
    fn test_text_filters_are_case_insensitive_substrings() {
        assert_eq!(run(FilterQuery::new().with("name", "ITEM-1")), vec!["item-1"]);
        assert_eq!(run(FilterQuery::new().with("owner", "team-")), vec!["item-1", "item-2"]);
        assert_eq!(run(FilterQuery::new().with("project", "project-b")), vec!["item-2"]);
        assert!(run(FilterQuery::new().with("name", "nonexistent")).is_empty());
    }

    #[test]
    fn test_labeled_value_uses_value() {
        let query = FilterQuery::new().with_option("name", "Item 1", "item-1");
        assert_eq!(run(query), vec!["item-1"]);
    }

    #[test]
    fn test_unknown_keys_and_empty_values_are_ignored() {
        assert_eq!(run(FilterQuery::new().with("unknownKey", "value")).len(), 2);
        assert_eq!(run(FilterQuery::new().with("name", "")).len(), 2);

        let mut query = FilterQuery::new().with("owner", "team-a");
        query.unset("name");
        assert_eq!(run(query), vec!["item-1"]);
    }

    #[test]
    fn test_multiple_filters_and_together() {
        let query = FilterQuery::new().with("name", "item").with("owner", "team-b");
        assert_eq!(run(query), vec!["item-2"]);
    }

    #[test]
    fn test_tag_modes_through_engine() {
        assert_eq!(run(FilterQuery::new().with("tags", "environment")).len(), 2);
        assert_eq!(run(FilterQuery::new().with("tags", "production")), vec!["item-1"]);
        assert_eq!(run(FilterQuery::new().with("tags", "environment=production")), vec!["item-1"]);
        assert_eq!(run(FilterQuery::new().with("tags", "environment=")).len(), 2);
        assert_eq!(run(FilterQuery::new().with("tags", "team=ml")), vec!["item-1"]);
        assert_eq!(run(FilterQuery::new().with("tags", "team=DAT")), vec!["item-2"]);
    }

    #[test]
    fn test_related_feature_view_checks_both_sides() {
        assert_eq!(run(FilterQuery::new().with("featureViews", "feature-view-1")), vec!["item-1"]);
        assert_eq!(run(FilterQuery::new().with("featureViews", "STREAM")), vec!["item-2"]);

        let engine = FilterEngine::new(mapping());
        let items = items();
        let query = FilterQuery::new().with("featureViews", "feature-view-1");
        assert!(engine.apply_filters(&items, &RelationshipIndex::new(), &query).is_empty());
    }

    #[test]
    fn test_related_feature_view_ignores_other_types() {
        let mut index = RelationshipIndex::new();
        index.insert(
            "item-1",
            Relationship::new(ObjectRef::new("item-1", "entity"), ObjectRef::new("view-like", "featureService")),
        );
        let engine = FilterEngine::new(mapping());
        let items = items();
        let query = FilterQuery::new().with("featureViews", "view");
        assert!(engine.apply_filters(&items, &index, &query).is_empty());
    }

    #[test]
    fn test_features_collection() {
        assert_eq!(run(FilterQuery::new().with("features", "RATING")), vec!["item-2"]);
        assert_eq!(run(FilterQuery::new().with("features", "trips")), vec!["item-1"]);
        assert!(run(FilterQuery::new().with("features", "missing")).is_empty());
    }

    #[test]
    fn test_date_thresholds() {
        assert_eq!(run(FilterQuery::new().with("created", "2023-01-01")).len(), 2);
        assert_eq!(run(FilterQuery::new().with("updated", "2023-01-02")), vec!["item-2"]);
        assert!(run(FilterQuery::new().with("created", "2023-01-03")).is_empty());
        assert!(run(FilterQuery::new().with("created", "not-a-date")).is_empty());
    }

    #[test]
    fn test_missing_attributes() {
        let engine = FilterEngine::new(mapping());
        let items = vec![json!({ "spec": { "name": "test", "tags": null } })];
        let index = RelationshipIndex::new();

        assert_eq!(engine.apply_filters(&items, &index, &FilterQuery::new().with("name", "test")).len(), 1);
        assert!(engine.apply_filters(&items, &index, &FilterQuery::new().with("owner", "a")).is_empty());
        assert!(engine.apply_filters(&items, &index, &FilterQuery::new().with("tags", "prod")).is_empty());
        assert!(engine.apply_filters(&items, &index, &FilterQuery::new().with("created", "2020-01-01")).is_empty());
    }

    #[test]
    fn test_filtering_output_again_is_idempotent() {
        let engine = FilterEngine::new(mapping());
        let items = items();
        let index = relationships();
        let query = FilterQuery::new().with("tags", "team=").with("created", "2023-01-01");

        let once = engine.apply_filters(&items, &index, &query);
        let twice = engine.apply_filters(&once, &index, &query);
        assert_eq!(once, twice.into_iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn test_typed_records() {
        use crate::types::{Entity, ObjectSpec};

        let mut driver = Entity::named("driver");
        driver.spec = ObjectSpec::named("driver").with_tags([("team", "ml")]);
        driver.project = Some("rides".to_string());
        let customer = Entity::named("customer");
        let entities = vec![driver, customer];

        let engine = FilterEngine::for_table(CatalogTable::Entities);
        let query = FilterQuery::new().with("tag", "team=ml").with("project", "RIDES");
        let result = engine.apply_filters(&entities, &RelationshipIndex::new(), &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].spec.name, "driver");
    }

    /// Record that counts how often it is rendered for path resolution.
    struct CountingRecord {
        value: Value,
        renders: std::cell::Cell<usize>,
    }

    impl CatalogRecord for CountingRecord {
        fn name(&self) -> Option<&str> {
            self.value.name()
        }

        fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
            self.value.tag_pairs()
        }

        fn document(&self) -> Cow<'_, Value> {
            self.renders.set(self.renders.get() + 1);
            Cow::Borrowed(&self.value)
        }
    }

    #[test]
    fn test_relationship_only_query_skips_rendering() {
        let records: Vec<CountingRecord> = items()
            .into_iter()
            .map(|value| CountingRecord {
                value,
                renders: std::cell::Cell::new(0),
            })
            .collect();
        let engine = FilterEngine::new(mapping());
        let index = relationships();

        let query = FilterQuery::new().with("featureViews", "VIEW");
        let related = engine.apply_filters(&records, &index, &query);
        assert!(!related.is_empty());
        assert!(records.iter().all(|r| r.renders.get() == 0));

        let query = FilterQuery::new().with("featureViews", "VIEW").with("name", "ITEM");
        engine.apply_filters(&records, &index, &query);
        assert!(records.iter().all(|r| r.renders.get() == 1));
    }

    #[test]
    fn test_uppercase_values_match_case_insensitively() {
        let engine = FilterEngine::new(mapping());
        let items = items();
        let index = relationships();
        let query = FilterQuery::new().with("owner", "TEAM-A").with("features", "TRIPS");

        let result = engine.apply_filters(&items, &index, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["spec"]["name"], "item-1");
    }
}
