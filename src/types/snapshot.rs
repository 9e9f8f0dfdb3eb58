//! Lineage snapshot: the full catalog bundle the graph builder consumes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::catalog::{DataSource, Entity, FeatureService, LineageFeatureView};
use super::relationship::Relationship;

/// Error type for snapshot decoding.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Payload is not valid JSON or does not have the snapshot shape.
    #[error("Invalid lineage snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Pagination metadata the catalog API sometimes mixes into the
/// feature-view collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Total number of objects across pages.
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

/// One entry of the snapshot's feature-view collection.
///
/// Decoding never fails on an odd entry: objects carrying both `totalCount`
/// and `totalPages` become [`FeatureViewEntry::Pagination`] (even if they also
/// look like a view), and anything that is neither a view nor pagination is
/// kept verbatim as [`FeatureViewEntry::Unrecognized`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureViewEntry {
    /// A real feature view.
    View(LineageFeatureView),
    /// Pagination metadata, never rendered.
    Pagination(PaginationInfo),
    /// Something else, never rendered.
    Unrecognized(Value),
}

impl FeatureViewEntry {
    /// The feature view, if this entry is one.
    pub fn as_view(&self) -> Option<&LineageFeatureView> {
        match self {
            Self::View(v) => Some(v),
            _ => None,
        }
    }

    fn from_value(value: Value) -> Self {
        if is_pagination_record(&value) {
            let total_count = value.get("totalCount").and_then(Value::as_u64).unwrap_or(0);
            let total_pages = value.get("totalPages").and_then(Value::as_u64).unwrap_or(0);
            return Self::Pagination(PaginationInfo {
                total_count,
                total_pages,
            });
        }
        match serde_json::from_value::<LineageFeatureView>(value.clone()) {
            Ok(view) => Self::View(view),
            Err(e) if is_view_shaped(&value) => {
                tracing::warn!(error = %e, "feature view entry could not be decoded");
                Self::Unrecognized(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "unrecognized entry in feature view collection");
                Self::Unrecognized(value)
            }
        }
    }
}

/// Single-key objects tagged with one of the feature-view variants.
fn is_view_shaped(value: &Value) -> bool {
    value.as_object().is_some_and(|o| {
        o.len() == 1
            && o.keys()
                .all(|k| matches!(k.as_str(), "featureView" | "onDemandFeatureView" | "streamFeatureView"))
    })
}

/// Pagination records are detected purely by the co-occurrence of the two
/// count fields, whatever their values.
fn is_pagination_record(value: &Value) -> bool {
    value
        .as_object()
        .map(|o| o.contains_key("totalCount") && o.contains_key("totalPages"))
        .unwrap_or(false)
}

impl From<LineageFeatureView> for FeatureViewEntry {
    fn from(view: LineageFeatureView) -> Self {
        Self::View(view)
    }
}

impl<'de> Deserialize<'de> for FeatureViewEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl Serialize for FeatureViewEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::View(v) => v.serialize(serializer),
            Self::Pagination(p) => p.serialize(serializer),
            Self::Unrecognized(v) => v.serialize(serializer),
        }
    }
}

/// Object collections of a lineage snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageObjects {
    /// Entities (layer 0).
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Data sources (layer 1).
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    /// Feature views of any variant (layer 2).
    #[serde(default)]
    pub feature_views: Vec<FeatureViewEntry>,
    /// Feature services (layer 3).
    #[serde(default)]
    pub feature_services: Vec<FeatureService>,
}

/// Point-in-time bundle of catalog objects and their relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageSnapshot {
    /// Object collections.
    #[serde(default)]
    pub objects: LineageObjects,
    /// Direct relationships.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Relationships inferred through intermediate objects.
    #[serde(default)]
    pub indirect_relationships: Vec<Relationship>,
}

impl LineageSnapshot {
    /// Decode a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a snapshot from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Real feature views, pagination and unrecognized entries skipped.
    pub fn feature_views(&self) -> impl Iterator<Item = &LineageFeatureView> {
        self.objects.feature_views.iter().filter_map(FeatureViewEntry::as_view)
    }
}
