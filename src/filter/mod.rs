//! Path resolver and filter engine for catalog list views.
//!
//! ```text
//! FilterKeyMapping ──compile──> FilterEngine
//!                                   │
//! items + RelationshipIndex + FilterQuery ──> apply_filters ──> Vec<&item>
//! ```
//!
//! Every operation is a pure function of its inputs; nothing here allocates
//! state beyond the returned collections.

pub mod path;
pub mod tags;
pub mod date;
pub mod relationships;
pub mod mapping;
pub mod engine;
pub mod store_type;

pub use path::{resolve_path, stringify_value};
pub use tags::{apply_tag_filters, matches_tag_query, matches_tag_pairs, TagQuery};
pub use date::{parse_timestamp, is_on_or_after};
pub use relationships::{
    relationships_of_type, relationships_by_position, relationships_in, count_relationship_types,
};
pub use mapping::{FilterKeyMapping, MappingError, PredicateKind, CatalogTable};
pub use engine::FilterEngine;
pub use store_type::{FeatureViewFilters, matches_store_type, STORE_TYPE_KEY};
