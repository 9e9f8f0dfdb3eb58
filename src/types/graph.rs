//! Graph types handed to the rendering layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::catalog::Feature;
use crate::canonical::canonical_hash_hex;

/// Node type used by the renderer to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Entity.
    Entity,
    /// Batch data source.
    BatchDataSource,
    /// Push data source.
    PushDataSource,
    /// Request data source.
    RequestDataSource,
    /// Batch feature view.
    BatchFeatureView,
    /// On-demand feature view.
    OnDemandFeatureView,
    /// Stream feature view.
    StreamFeatureView,
    /// Feature service.
    FeatureService,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Entity => "entity",
            Self::BatchDataSource => "batch_data_source",
            Self::PushDataSource => "push_data_source",
            Self::RequestDataSource => "request_data_source",
            Self::BatchFeatureView => "batch_feature_view",
            Self::OnDemandFeatureView => "on_demand_feature_view",
            Self::StreamFeatureView => "stream_feature_view",
            Self::FeatureService => "feature_service",
        };
        f.write_str(s)
    }
}

/// Coarse object category; one per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsObjectType {
    /// Entities.
    Entity,
    /// Data sources.
    DataSource,
    /// Feature views of every variant.
    FeatureView,
    /// Feature services.
    FeatureService,
}

impl FsObjectType {
    /// Layer rank of this category.
    pub fn layer(&self) -> u32 {
        match self {
            Self::Entity => 0,
            Self::DataSource => 1,
            Self::FeatureView => 2,
            Self::FeatureService => 3,
        }
    }
}

/// Line style of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStyle {
    /// Solid line.
    #[default]
    Default,
    /// Dashed line.
    Dashed,
}

/// Edge shape understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeShape {
    /// Curved connector.
    #[default]
    #[serde(rename = "curved-edge")]
    Curved,
}

/// Node in a lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique id, `<prefix>-<name>`.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Fine-grained node type.
    pub entity_type: EntityType,
    /// Coarse category.
    #[serde(rename = "fsObjectTypes")]
    pub fs_object_type: FsObjectType,
    /// Layer rank (column in a layered layout).
    pub layer: u32,
    /// Object name.
    pub name: String,
    /// Object description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Feature columns (feature views only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    /// Label truncation hint for the renderer.
    pub truncate_length: usize,
    /// Whether the node is the focus of the graph.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
}

/// Directed edge in a lineage graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Edge id.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Line style.
    pub edge_style: EdgeStyle,
    /// Edge shape.
    #[serde(rename = "type")]
    pub shape: EdgeShape,
    /// Set on synthetic, non-semantic layout edges.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_positioning_edge: bool,
}

impl GraphEdge {
    /// Create a semantic edge with default style.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_style: EdgeStyle::Default,
            shape: EdgeShape::Curved,
            is_positioning_edge: false,
        }
    }

    /// Create a synthetic layout edge.
    pub fn positioning(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            is_positioning_edge: true,
            ..Self::new(id, source, target)
        }
    }
}

/// Nodes and edges ready for a layered-graph renderer.
///
/// Order is significant: both vectors come out of the builder in a
/// deterministic order and renderers rely on it for stable layouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineageGraph {
    /// Nodes in emission order.
    pub nodes: Vec<GraphNode>,
    /// Positioning edges first, then semantic edges.
    pub edges: Vec<GraphEdge>,
}

impl LineageGraph {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Semantic (non-positioning) edges.
    pub fn semantic_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| !e.is_positioning_edge)
    }

    /// Synthetic positioning edges.
    pub fn positioning_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.is_positioning_edge)
    }

    /// Check the structural invariants: unique node ids and edges that only
    /// reference existing nodes.
    pub fn is_consistent(&self) -> bool {
        let mut ids = BTreeSet::new();
        if !self.nodes.iter().all(|n| ids.insert(n.id.as_str())) {
            return false;
        }
        self.edges
            .iter()
            .all(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
    }

    /// Canonical xxh64 fingerprint; equal graphs (same order) share it.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, layer: u32) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            label: id.to_string(),
            entity_type: EntityType::Entity,
            fs_object_type: FsObjectType::Entity,
            layer,
            name: id.to_string(),
            description: None,
            features: None,
            truncate_length: 30,
            highlighted: false,
        }
    }

    #[test]
    fn test_edge_wire_shape() {
        let edge = GraphEdge::positioning("positioning-edge-0-1", "a", "b");
        let json = serde_json::to_value(&edge).unwrap();

        assert_eq!(json["edgeStyle"], "default");
        assert_eq!(json["type"], "curved-edge");
        assert_eq!(json["isPositioningEdge"], true);

        let plain = serde_json::to_value(GraphEdge::new("edge-0", "a", "b")).unwrap();
        assert!(plain.get("isPositioningEdge").is_none());
    }

    #[test]
    fn test_node_wire_shape() {
        let json = serde_json::to_value(node("entity-a", 0)).unwrap();
        assert_eq!(json["entityType"], "entity");
        assert_eq!(json["fsObjectTypes"], "entity");
        assert_eq!(json["truncateLength"], 30);
        assert!(json.get("highlighted").is_none());
    }

    #[test]
    fn test_consistency_check() {
        let mut graph = LineageGraph {
            nodes: vec![node("a", 0), node("b", 1)],
            edges: vec![GraphEdge::new("edge-0", "a", "b")],
        };
        assert!(graph.is_consistent());

        graph.edges.push(GraphEdge::new("edge-1", "a", "missing"));
        assert!(!graph.is_consistent());

        graph.edges.pop();
        graph.nodes.push(node("a", 0));
        assert!(!graph.is_consistent());
    }

    #[test]
    fn test_fingerprint_tracks_order() {
        let g1 = LineageGraph {
            nodes: vec![node("a", 0), node("b", 1)],
            edges: vec![],
        };
        let g2 = LineageGraph {
            nodes: vec![node("b", 1), node("a", 0)],
            edges: vec![],
        };

        assert_eq!(g1.fingerprint(), g1.clone().fingerprint());
        assert_ne!(g1.fingerprint(), g2.fingerprint());
    }
}
