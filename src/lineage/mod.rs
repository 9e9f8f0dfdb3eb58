//! Lineage graph construction.
//!
//! ```text
//! LineageSnapshot ──LineageGraphBuilder──> LineageGraph ──> renderer
//!                         │
//!                    LayoutHints (positioning edges)
//! ```

pub mod kinds;
pub mod layout;
pub mod builder;
pub mod feature_view;

pub use kinds::{map_endpoint, KindConfig};
pub use layout::{ConsecutiveLayerHints, LayoutHints, NoLayoutHints};
pub use builder::{
    build_lineage_graph, BuilderOptions, LineageGraphBuilder, LONG_TRUNCATE_LENGTH,
    SHORT_TRUNCATE_LENGTH,
};
pub use feature_view::build_feature_view_graph;
