//! Lineage graph centred on a single feature view.
//!
//! Built from a relationship list only (no object payloads), for the
//! feature-view detail page. The focused view is highlighted.

use std::collections::BTreeSet;

use super::builder::SHORT_TRUNCATE_LENGTH;
use super::kinds::{map_endpoint, KindConfig};
use crate::types::{
    EntityType, FsObjectType, GraphEdge, GraphNode, LineageGraph, ObjectKind, ObjectRef,
    Relationship,
};

/// Layer for endpoints whose type is not in the type table.
const UNKNOWN_TYPE_LAYER: u32 = 1;
/// Layer of the focused view.
const FOCUS_LAYER: u32 = 2;

/// Build the graph around `feature_view_name`.
///
/// Every distinct `{type, name}` endpoint becomes a node in first-seen order;
/// endpoints lacking a name or type are skipped. Each relationship whose
/// endpoints both map through the type table becomes an `fv-edge-<index>`.
pub fn build_feature_view_graph(
    relationships: &[Relationship],
    feature_view_name: &str,
) -> LineageGraph {
    let mut seen = BTreeSet::new();
    let mut nodes = Vec::new();

    for relationship in relationships {
        for endpoint in [&relationship.source, &relationship.target] {
            let Some(node) = endpoint_node(endpoint, feature_view_name) else {
                continue;
            };
            if seen.insert(node.id.clone()) {
                nodes.push(node);
            }
        }
    }

    let edges: Vec<GraphEdge> = relationships
        .iter()
        .enumerate()
        .filter_map(|(index, relationship)| {
            let (source, _) = map_endpoint(&relationship.source)?;
            let (target, _) = map_endpoint(&relationship.target)?;
            Some(GraphEdge::new(format!("fv-edge-{index}"), source, target))
        })
        .collect();

    tracing::debug!(
        target: "feature_lineage::lineage",
        feature_view = feature_view_name,
        nodes = nodes.len(),
        edges = edges.len(),
        "built feature view graph"
    );

    LineageGraph { nodes, edges }
}

fn endpoint_node(endpoint: &ObjectRef, focus: &str) -> Option<GraphNode> {
    let name = endpoint.name().filter(|n| !n.is_empty())?;
    let object_type = endpoint.object_type().filter(|t| !t.is_empty())?;

    let node = match ObjectKind::from_type_str(object_type) {
        Some(kind) => {
            let config = KindConfig::of(kind);
            let highlighted = kind.is_feature_view() && name == focus;
            GraphNode {
                id: config.node_id(name),
                label: format!("{}: {}", config.label_prefix, name),
                entity_type: config.entity_type,
                fs_object_type: config.fs_object_type,
                layer: if highlighted { FOCUS_LAYER } else { config.layer },
                name: name.to_string(),
                description: None,
                features: None,
                truncate_length: SHORT_TRUNCATE_LENGTH,
                highlighted,
            }
        }
        None => {
            tracing::warn!(
                target: "feature_lineage::lineage",
                name,
                object_type,
                "unknown object type in feature view lineage"
            );
            GraphNode {
                id: format!("{object_type}-{name}"),
                label: format!("{object_type}: {name}"),
                entity_type: EntityType::BatchDataSource,
                fs_object_type: FsObjectType::DataSource,
                layer: UNKNOWN_TYPE_LAYER,
                name: name.to_string(),
                description: None,
                features: None,
                truncate_length: SHORT_TRUNCATE_LENGTH,
                highlighted: false,
            }
        }
    };
    Some(node)
}
