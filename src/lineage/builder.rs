//! Full-registry lineage graph construction.
//!
//! Nodes come out in snapshot order (entities, data sources, feature views,
//! feature services), followed by nodes synthesized for relationship
//! endpoints the snapshot never listed. Edges come out as the layout hints
//! first, then one `edge-<index>` per relationship whose endpoints both map
//! to a node.

use std::collections::BTreeSet;

use super::kinds::{map_endpoint, KindConfig};
use super::layout::{ConsecutiveLayerHints, LayoutHints};
use crate::types::{
    DataSource, DataSourceKind, Entity, FeatureService, GraphEdge, GraphNode, LineageFeatureView,
    LineageGraph, LineageSnapshot, ObjectKind, ObjectRef,
};

/// Label truncation for entities, data sources and synthesized nodes.
pub const SHORT_TRUNCATE_LENGTH: usize = 30;
/// Label truncation for feature views and feature services.
pub const LONG_TRUNCATE_LENGTH: usize = 40;

/// Knobs for [`LineageGraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Add a node for every relationship endpoint missing from the object
    /// lists. When off, edges touching such endpoints are dropped.
    pub synthesize_missing_nodes: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            synthesize_missing_nodes: true,
        }
    }
}

/// Builds a [`LineageGraph`] from a [`LineageSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct LineageGraphBuilder<H: LayoutHints = ConsecutiveLayerHints> {
    options: BuilderOptions,
    hints: H,
}

impl LineageGraphBuilder<ConsecutiveLayerHints> {
    /// Builder with default options and consecutive-layer hints.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: LayoutHints> LineageGraphBuilder<H> {
    /// Builder with explicit options and layout hints.
    pub fn with_hints(options: BuilderOptions, hints: H) -> Self {
        Self { options, hints }
    }

    /// Replace the options.
    pub fn options(mut self, options: BuilderOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn current_options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Build the graph. Deterministic for a given snapshot.
    pub fn build(&self, snapshot: &LineageSnapshot) -> LineageGraph {
        let objects = &snapshot.objects;
        let mut nodes = NodeSet::default();

        for entity in &objects.entities {
            nodes.push(entity_node(entity));
        }
        for source in &objects.data_sources {
            nodes.push(data_source_node(source));
        }
        for view in snapshot.feature_views() {
            nodes.push(feature_view_node(view));
        }
        for service in &objects.feature_services {
            nodes.push(feature_service_node(service));
        }
        let listed = nodes.len();

        if self.options.synthesize_missing_nodes {
            for relationship in &snapshot.relationships {
                for endpoint in [&relationship.source, &relationship.target] {
                    if let Some(node) = synthesized_node(endpoint) {
                        nodes.push(node);
                    }
                }
            }
        }

        let mut edges = self.hints.positioning_edges(&nodes.nodes);
        let mut dropped = 0usize;
        for (index, relationship) in snapshot.relationships.iter().enumerate() {
            let source = endpoint_id(&relationship.source, index);
            let target = endpoint_id(&relationship.target, index);
            match (source, target) {
                (Some(source), Some(target))
                    if nodes.contains(&source) && nodes.contains(&target) =>
                {
                    edges.push(GraphEdge::new(format!("edge-{index}"), source, target));
                }
                _ => dropped += 1,
            }
        }

        tracing::debug!(
            target: "feature_lineage::lineage",
            listed_nodes = listed,
            synthesized_nodes = nodes.len() - listed,
            edges = edges.len(),
            dropped_relationships = dropped,
            indirect_relationships = snapshot.indirect_relationships.len(),
            "built lineage graph"
        );

        LineageGraph {
            nodes: nodes.nodes,
            edges,
        }
    }
}

/// Build with default options and hints.
pub fn build_lineage_graph(snapshot: &LineageSnapshot) -> LineageGraph {
    LineageGraphBuilder::new().build(snapshot)
}

/// Ordered node list with first-wins id deduplication.
#[derive(Default)]
struct NodeSet {
    nodes: Vec<GraphNode>,
    ids: BTreeSet<String>,
}

impl NodeSet {
    fn push(&mut self, node: GraphNode) {
        if self.ids.insert(node.id.clone()) {
            self.nodes.push(node);
        } else {
            tracing::trace!(target: "feature_lineage::lineage", id = %node.id, "duplicate node skipped");
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

fn endpoint_id(endpoint: &ObjectRef, index: usize) -> Option<String> {
    let mapped = map_endpoint(endpoint).map(|(id, _)| id);
    if mapped.is_none() {
        match (endpoint.name(), endpoint.object_type()) {
            (Some(name), Some(object_type)) if !name.is_empty() => tracing::warn!(
                target: "feature_lineage::lineage",
                relationship = index,
                name,
                object_type,
                "unknown object type in relationship"
            ),
            _ => tracing::debug!(
                target: "feature_lineage::lineage",
                relationship = index,
                "relationship endpoint missing name or type"
            ),
        }
    }
    mapped
}

fn entity_node(entity: &Entity) -> GraphNode {
    let config = KindConfig::of(ObjectKind::Entity);
    GraphNode {
        id: config.node_id(&entity.spec.name),
        label: format!("Entity: {}", entity.spec.name),
        entity_type: config.entity_type,
        fs_object_type: config.fs_object_type,
        layer: config.layer,
        name: entity.spec.name.clone(),
        description: entity.spec.description.clone(),
        features: None,
        truncate_length: SHORT_TRUNCATE_LENGTH,
        highlighted: false,
    }
}

fn data_source_node(source: &DataSource) -> GraphNode {
    let kind = source.kind();
    let config = KindConfig::of(kind.object_kind());
    let flavour = match kind {
        DataSourceKind::Batch => "Batch",
        DataSourceKind::Push => "Push",
        DataSourceKind::Request => "Request",
    };
    GraphNode {
        id: config.node_id(&source.name),
        label: format!("{flavour} Data Source: {}", source.name),
        entity_type: config.entity_type,
        fs_object_type: config.fs_object_type,
        layer: config.layer,
        name: source.name.clone(),
        description: source.description.clone(),
        features: None,
        truncate_length: SHORT_TRUNCATE_LENGTH,
        highlighted: false,
    }
}

fn feature_view_node(view: &LineageFeatureView) -> GraphNode {
    let kind = view.kind();
    let config = KindConfig::of(kind);
    let flavour = match kind {
        ObjectKind::OnDemandFeatureView => "On demand",
        ObjectKind::StreamFeatureView => "Stream",
        _ => "Batch",
    };
    let spec = &view.view().spec;
    GraphNode {
        id: config.node_id(&spec.name),
        label: format!("{flavour} Feature View: {}", spec.name),
        entity_type: config.entity_type,
        fs_object_type: config.fs_object_type,
        layer: config.layer,
        name: spec.name.clone(),
        description: spec.description.clone(),
        features: Some(spec.features.clone()),
        truncate_length: LONG_TRUNCATE_LENGTH,
        highlighted: false,
    }
}

fn feature_service_node(service: &FeatureService) -> GraphNode {
    let config = KindConfig::of(ObjectKind::FeatureService);
    GraphNode {
        id: config.node_id(&service.spec.name),
        label: format!("FeatureService: {}", service.spec.name),
        entity_type: config.entity_type,
        fs_object_type: config.fs_object_type,
        layer: config.layer,
        name: service.spec.name.clone(),
        description: service.spec.description.clone(),
        features: None,
        truncate_length: LONG_TRUNCATE_LENGTH,
        highlighted: false,
    }
}

/// Node for an endpoint known only from a relationship.
pub(crate) fn synthesized_node(endpoint: &ObjectRef) -> Option<GraphNode> {
    let (id, kind) = map_endpoint(endpoint)?;
    let name = endpoint.name()?.to_string();
    let config = KindConfig::of(kind);
    Some(GraphNode {
        id,
        label: format!("{}: {}", config.label_prefix, name),
        entity_type: config.entity_type,
        fs_object_type: config.fs_object_type,
        layer: config.layer,
        name,
        description: None,
        features: None,
        truncate_length: SHORT_TRUNCATE_LENGTH,
        highlighted: false,
    })
}
