//! Feature-view list filters, including the online/offline store filter.

use serde_json::Value;

use super::engine::FilterEngine;
use super::mapping::CatalogTable;
use super::path::resolve_path;
use crate::types::{CatalogRecord, FilterQuery, RelationshipIndex};

/// Query key carrying the store-type filter.
pub const STORE_TYPE_KEY: &str = "Store type";

/// Store-type filter: a view matches when any of the terms `online`,
/// `offline` or `-` (neither store) contains the filter text and holds for
/// the view. Empty filters match everything.
pub fn matches_store_type<T: CatalogRecord>(view: &T, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let document = view.document();
    let flag = |path: &str| {
        resolve_path(&document, path)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };
    let online = flag("spec.online");
    let offline = flag("spec.offline");
    let needle = filter.to_lowercase();

    [("online", online), ("offline", offline), ("-", !online && !offline)]
        .into_iter()
        .any(|(term, holds)| holds && term.contains(needle.as_str()))
}

/// Filters for the feature-view list view.
#[derive(Debug, Clone)]
pub struct FeatureViewFilters {
    engine: FilterEngine,
}

impl FeatureViewFilters {
    /// Filters using the built-in feature-view key mapping.
    pub fn new() -> Self {
        Self::with_engine(FilterEngine::for_table(CatalogTable::FeatureViews))
    }

    /// Filters on top of a custom engine.
    pub fn with_engine(engine: FilterEngine) -> Self {
        Self { engine }
    }

    /// Underlying engine.
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// Apply the engine's filters, then the store-type filter if present.
    pub fn apply<'a, T: CatalogRecord>(
        &self,
        views: &'a [T],
        relationships: &RelationshipIndex,
        query: &FilterQuery,
    ) -> Vec<&'a T> {
        let mut rest = query.clone();
        let store_type = rest.take(STORE_TYPE_KEY);

        let mut kept = self.engine.apply_filters(views, relationships, &rest);
        if let Some(store_type) = store_type {
            kept.retain(|view| matches_store_type(*view, store_type.as_str()));
        }
        kept
    }
}

impl Default for FeatureViewFilters {
    fn default() -> Self {
        Self::new()
    }
}
