//! Relationship types for the lineage engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of catalog object a relationship endpoint can point at.
///
/// Only the kinds listed here can become lineage nodes. Endpoint types outside
/// this set (e.g. `feature`) still appear in relationship lists but are never
/// mapped to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    /// Entity (join key owner).
    Entity,
    /// Data source of unspecified flavour.
    DataSource,
    /// File/warehouse backed data source.
    BatchDataSource,
    /// Push data source.
    PushDataSource,
    /// Request-time data source.
    RequestDataSource,
    /// Batch feature view.
    FeatureView,
    /// On-demand feature view.
    OnDemandFeatureView,
    /// Stream feature view.
    StreamFeatureView,
    /// Feature service.
    FeatureService,
}

impl ObjectKind {
    /// Every kind, in table order.
    pub const ALL: [ObjectKind; 9] = [
        Self::Entity,
        Self::DataSource,
        Self::BatchDataSource,
        Self::PushDataSource,
        Self::RequestDataSource,
        Self::FeatureView,
        Self::OnDemandFeatureView,
        Self::StreamFeatureView,
        Self::FeatureService,
    ];

    /// Parse the wire type string used in relationship endpoints.
    ///
    /// Matching is exact: the catalog API emits camelCase identifiers.
    pub fn from_type_str(s: &str) -> Option<Self> {
        match s {
            "entity" => Some(Self::Entity),
            "dataSource" => Some(Self::DataSource),
            "batchDataSource" => Some(Self::BatchDataSource),
            "pushDataSource" => Some(Self::PushDataSource),
            "requestDataSource" => Some(Self::RequestDataSource),
            "featureView" => Some(Self::FeatureView),
            "onDemandFeatureView" => Some(Self::OnDemandFeatureView),
            "streamFeatureView" => Some(Self::StreamFeatureView),
            "featureService" => Some(Self::FeatureService),
            _ => None,
        }
    }

    /// Wire type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::DataSource => "dataSource",
            Self::BatchDataSource => "batchDataSource",
            Self::PushDataSource => "pushDataSource",
            Self::RequestDataSource => "requestDataSource",
            Self::FeatureView => "featureView",
            Self::OnDemandFeatureView => "onDemandFeatureView",
            Self::StreamFeatureView => "streamFeatureView",
            Self::FeatureService => "featureService",
        }
    }

    /// Whether this kind belongs to the feature-view family.
    pub fn is_feature_view(&self) -> bool {
        matches!(
            self,
            Self::FeatureView | Self::OnDemandFeatureView | Self::StreamFeatureView
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One endpoint of a relationship.
///
/// Both fields are optional on the wire; an endpoint missing either one cannot
/// be placed in a lineage graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Object type as emitted by the catalog API (e.g. `featureView`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

impl ObjectRef {
    /// Create a fully specified endpoint.
    pub fn new(name: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            object_type: Some(object_type.into()),
        }
    }

    /// Endpoint name, if present.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Endpoint type string, if present.
    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    /// Endpoint kind, if the type is present and recognized.
    pub fn kind(&self) -> Option<ObjectKind> {
        self.object_type().and_then(ObjectKind::from_type_str)
    }

    /// True when the type string equals `object_type` exactly.
    pub fn has_type(&self, object_type: &str) -> bool {
        self.object_type() == Some(object_type)
    }
}

/// Directed relationship between two catalog objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Source endpoint.
    #[serde(default)]
    pub source: ObjectRef,
    /// Target endpoint.
    #[serde(default)]
    pub target: ObjectRef,
}

impl Relationship {
    /// Create a relationship between two endpoints.
    pub fn new(source: ObjectRef, target: ObjectRef) -> Self {
        Self { source, target }
    }

    /// Endpoint on the requested side.
    pub fn endpoint(&self, position: Position) -> &ObjectRef {
        match position {
            Position::Source => &self.source,
            Position::Target => &self.target,
        }
    }
}

/// Which side of a relationship a lookup inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Position {
    /// The source endpoint.
    Source,
    /// The target endpoint.
    #[default]
    Target,
}

/// Relationships grouped by the name of their source object.
///
/// Backed by a `BTreeMap` so iteration is deterministic; the per-key sequences
/// keep the order the catalog API returned them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipIndex(BTreeMap<String, Vec<Relationship>>);

impl RelationshipIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relationship under `key`.
    pub fn insert(&mut self, key: impl Into<String>, relationship: Relationship) {
        self.0.entry(key.into()).or_default().push(relationship);
    }

    /// Build an index keyed by each relationship's source name.
    ///
    /// Relationships without a source name are not indexable and are dropped.
    pub fn from_relationships<I>(relationships: I) -> Self
    where
        I: IntoIterator<Item = Relationship>,
    {
        let mut index = Self::new();
        for relationship in relationships {
            if let Some(name) = relationship.source.name.clone() {
                index.insert(name, relationship);
            }
        }
        index
    }

    /// Relationships recorded for `key`, in original order.
    pub fn get(&self, key: &str) -> &[Relationship] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `key` has an entry (possibly empty).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the index has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate keys and their relationships in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Relationship])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<BTreeMap<String, Vec<Relationship>>> for RelationshipIndex {
    fn from(map: BTreeMap<String, Vec<Relationship>>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Vec<Relationship>)> for RelationshipIndex {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Relationship>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind_round_trip_names() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_type_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ObjectKind::from_type_str("feature"), None);
        assert_eq!(ObjectKind::from_type_str("FeatureView"), None);
    }

    #[test]
    fn test_relationship_wire_shape() {
        let json = r#"{"source":{"name":"driver","type":"entity"},"target":{"type":"featureView"}}"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();

        assert_eq!(rel.source.kind(), Some(ObjectKind::Entity));
        assert_eq!(rel.target.name(), None);
        assert!(rel.target.has_type("featureView"));
    }

    #[test]
    fn test_index_from_relationships_groups_by_source() {
        let index = RelationshipIndex::from_relationships(vec![
            Relationship::new(ObjectRef::new("a", "entity"), ObjectRef::new("fv1", "featureView")),
            Relationship::new(ObjectRef::new("b", "entity"), ObjectRef::new("fv2", "featureView")),
            Relationship::new(ObjectRef::new("a", "entity"), ObjectRef::new("fs1", "featureService")),
            Relationship::new(ObjectRef::default(), ObjectRef::new("fs2", "featureService")),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").len(), 2);
        assert_eq!(index.get("a")[1].target.name(), Some("fs1"));
        assert!(index.get("missing").is_empty());
    }
}
