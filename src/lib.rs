//! # feature-lineage
//!
//! Relationship filtering and lineage graph construction for a feature-store
//! catalog UI.
//!
//! The crate answers two questions:
//!
//! > Which catalog objects does the user's filter keep?
//!
//! > How do entities, data sources, feature views and feature services
//! > connect, laid out in layers?
//!
//! ## Architecture
//!
//! ```text
//! FilterQuery + RelationshipIndex ──> FilterEngine ──> Vec<&record>
//!
//! LineageSnapshot ──> LineageGraphBuilder ──> LineageGraph ──> renderer
//!                            ↓
//!                       LayoutHints
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Filtering preserves input order and returns references into the input
//! - Identical snapshot → identical node and edge order
//! - [`LineageGraph::fingerprint`] is stable across runs
//!
//! Everything here is a pure, synchronous transformation of its inputs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod filter;
pub mod lineage;
pub mod canonical;

// Re-exports
pub use types::{
    CatalogRecord, DataSource, DataSourceKind, Entity, Feature, FeatureService, FeatureView,
    FeatureViewSpec, LineageFeatureView, Meta, ObjectSpec, TagMap,
};
pub use types::{ObjectKind, ObjectRef, Position, Relationship, RelationshipIndex};
pub use types::{FeatureViewEntry, LineageObjects, LineageSnapshot, PaginationInfo, SnapshotError};
pub use types::{EdgeShape, EdgeStyle, EntityType, FsObjectType, GraphEdge, GraphNode, LineageGraph};
pub use types::{FilterQuery, FilterValue};
pub use filter::{
    apply_tag_filters, resolve_path, CatalogTable, FeatureViewFilters, FilterEngine,
    FilterKeyMapping, MappingError, PredicateKind,
};
pub use lineage::{
    build_feature_view_graph, build_lineage_graph, BuilderOptions, ConsecutiveLayerHints,
    LayoutHints, LineageGraphBuilder, NoLayoutHints,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
