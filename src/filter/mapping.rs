//! Filter key → attribute path mapping and its compiled predicate table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path literal routed to the relationship predicate.
pub const FEATURE_VIEWS_PATH: &str = "featureViews";
/// Path literal routed to the feature-collection predicate.
pub const FEATURES_PATH: &str = "features";
/// Filter key routed to the creation-date predicate.
pub const CREATED_KEY: &str = "created";
/// Filter key routed to the update-date predicate.
pub const UPDATED_KEY: &str = "updated";
/// Default location of an object's tag mapping.
pub const DEFAULT_TAGS_PATH: &str = "spec.tags";

/// Error type for mapping decoding and validation.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// Payload is not a JSON object of strings.
    #[error("Invalid filter key mapping: {0}")]
    Decode(#[from] serde_json::Error),
    /// A key maps to the empty path.
    #[error("Filter key {0:?} maps to an empty path")]
    EmptyPath(String),
    /// A path has an empty segment (`a..b`, `.a`, `a.`).
    #[error("Filter key {key:?} has malformed path {path:?}")]
    MalformedPath {
        /// Offending key.
        key: String,
        /// Offending path.
        path: String,
    },
}

/// Logical filter key → dotted attribute path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterKeyMapping(BTreeMap<String, String>);

impl FilterKeyMapping {
    /// Build a mapping from `(key, path)` pairs without validation.
    pub fn new<I, K, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, p)| (k.into(), p.into())).collect())
    }

    /// Decode and validate a mapping from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let mapping: Self = serde_json::from_str(json)?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Reject empty paths and paths with empty segments.
    pub fn validate(&self) -> Result<(), MappingError> {
        for (key, path) in &self.0 {
            if path.is_empty() {
                return Err(MappingError::EmptyPath(key.clone()));
            }
            if path.split('.').any(str::is_empty) {
                return Err(MappingError::MalformedPath {
                    key: key.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Path for a key.
    pub fn path(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compile every key into its predicate kind.
    pub(crate) fn compile(&self, tags_path: &str) -> BTreeMap<String, CompiledKey> {
        self.0
            .iter()
            .map(|(key, path)| {
                let kind = PredicateKind::classify(key, path, tags_path);
                (key.clone(), CompiledKey { path: path.clone(), kind })
            })
            .collect()
    }
}

/// Closed set of predicates a filter key can compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    /// Tag DSL against the tag mapping.
    Tag,
    /// Name of a related feature view.
    RelatedFeatureView,
    /// Name of one of the item's features.
    Features,
    /// Timestamp threshold (`created` / `updated`).
    Date,
    /// Case-insensitive substring of the stringified value.
    Text,
}

impl PredicateKind {
    /// Dispatch order: tag path, relationship literal, features literal,
    /// date keys, then plain text.
    pub fn classify(key: &str, path: &str, tags_path: &str) -> Self {
        if path == tags_path {
            Self::Tag
        } else if path == FEATURE_VIEWS_PATH {
            Self::RelatedFeatureView
        } else if path == FEATURES_PATH {
            Self::Features
        } else if key == CREATED_KEY || key == UPDATED_KEY {
            Self::Date
        } else {
            Self::Text
        }
    }
}

/// A filter key resolved at engine construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledKey {
    pub(crate) path: String,
    pub(crate) kind: PredicateKind,
}

/// Catalog list views with a built-in key mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogTable {
    /// Entities list.
    Entities,
    /// Data sources list.
    DataSources,
    /// Feature views list.
    FeatureViews,
    /// Feature services list.
    FeatureServices,
    /// Features list.
    Features,
}

impl CatalogTable {
    /// Key mapping for this table.
    pub fn key_mapping(&self) -> FilterKeyMapping {
        const TIMESTAMPS: [(&str, &str); 2] = [
            (CREATED_KEY, "meta.createdTimestamp"),
            (UPDATED_KEY, "meta.lastUpdatedTimestamp"),
        ];
        let specific: &[(&str, &str)] = match self {
            Self::Entities => &[
                ("name", "spec.name"),
                ("project", "project"),
                ("tag", "spec.tags"),
                ("joinKey", "spec.joinKey"),
                ("valueType", "spec.valueType"),
                ("owner", "spec.owner"),
                ("featureViews", FEATURE_VIEWS_PATH),
            ],
            Self::DataSources => &[
                ("name", "name"),
                ("project", "project"),
                ("tag", "tags"),
                ("type", "type"),
                ("owner", "owner"),
                ("featureViews", FEATURE_VIEWS_PATH),
            ],
            Self::FeatureViews => &[
                ("name", "spec.name"),
                ("project", "project"),
                ("tag", "spec.tags"),
                ("features", FEATURES_PATH),
                ("owner", "spec.owner"),
            ],
            Self::FeatureServices => &[
                ("name", "spec.name"),
                ("project", "project"),
                ("tag", "spec.tags"),
                ("owner", "spec.owner"),
                ("featureViews", FEATURE_VIEWS_PATH),
            ],
            Self::Features => &[
                ("name", "name"),
                ("project", "project"),
                ("tag", "tags"),
                ("featureView", "featureView"),
                ("valueType", "valueType"),
                ("owner", "owner"),
            ],
        };
        FilterKeyMapping::new(specific.iter().chain(TIMESTAMPS.iter()).copied())
    }

    /// Where this table's records keep their tags.
    pub fn tags_path(&self) -> &'static str {
        match self {
            Self::DataSources | Self::Features => "tags",
            Self::Entities | Self::FeatureViews | Self::FeatureServices => DEFAULT_TAGS_PATH,
        }
    }
}
