//! Core types for the lineage engine.

pub mod catalog;
pub mod relationship;
pub mod snapshot;
pub mod graph;
pub mod query;

pub use catalog::{
    CatalogRecord, TagMap, Meta, ObjectSpec, Entity, DataSource, DataSourceKind,
    Feature, FeatureViewSpec, FeatureView, LineageFeatureView, FeatureService,
};
pub use relationship::{ObjectKind, ObjectRef, Relationship, RelationshipIndex, Position};
pub use snapshot::{
    LineageSnapshot, LineageObjects, FeatureViewEntry, PaginationInfo, SnapshotError,
};
pub use graph::{
    GraphNode, GraphEdge, EdgeStyle, EdgeShape, EntityType, FsObjectType, LineageGraph,
};
pub use query::{FilterQuery, FilterValue};
