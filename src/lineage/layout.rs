//! Layout hints: synthetic edges that steer a layered layout engine.
//!
//! The hints are coupled to how a dagre-style layered layout ranks nodes, so
//! they sit behind [`LayoutHints`] and can be swapped per renderer.

use std::collections::BTreeMap;

use crate::types::{GraphEdge, GraphNode};

/// Produces non-semantic edges for a finished node list.
pub trait LayoutHints {
    /// Positioning edges for `nodes` (in emission order).
    fn positioning_edges(&self, nodes: &[GraphNode]) -> Vec<GraphEdge>;
}

/// Links each present layer to the next present layer.
///
/// Layers are sorted ascending; for every consecutive pair one edge runs from
/// the first node of the lower layer to the first node of the higher one, so
/// the layout keeps layer order even when no real edge connects them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsecutiveLayerHints;

impl LayoutHints for ConsecutiveLayerHints {
    fn positioning_edges(&self, nodes: &[GraphNode]) -> Vec<GraphEdge> {
        let mut first_by_layer: BTreeMap<u32, &GraphNode> = BTreeMap::new();
        for node in nodes {
            first_by_layer.entry(node.layer).or_insert(node);
        }

        let layers: Vec<(u32, &GraphNode)> = first_by_layer.into_iter().collect();
        layers
            .windows(2)
            .map(|pair| {
                let (lower, from) = pair[0];
                let (upper, to) = pair[1];
                GraphEdge::positioning(
                    format!("positioning-edge-{lower}-{upper}"),
                    from.id.clone(),
                    to.id.clone(),
                )
            })
            .collect()
    }
}

/// Emits no positioning edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayoutHints;

impl LayoutHints for NoLayoutHints {
    fn positioning_edges(&self, _nodes: &[GraphNode]) -> Vec<GraphEdge> {
        Vec::new()
    }
}
