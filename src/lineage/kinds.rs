//! Fixed table mapping relationship endpoint types to node attributes.

use crate::types::{EntityType, FsObjectType, ObjectKind, ObjectRef};

/// Node attributes shared by every object of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindConfig {
    /// Layer rank.
    pub layer: u32,
    /// Label prefix for nodes known only from a relationship.
    pub label_prefix: &'static str,
    /// Coarse category.
    pub fs_object_type: FsObjectType,
    /// Fine-grained node type.
    pub entity_type: EntityType,
    /// Node id prefix; all feature-view variants share one.
    pub node_id_prefix: &'static str,
}

const fn config(
    fs_object_type: FsObjectType,
    entity_type: EntityType,
    label_prefix: &'static str,
    node_id_prefix: &'static str,
) -> KindConfig {
    let layer = match fs_object_type {
        FsObjectType::Entity => 0,
        FsObjectType::DataSource => 1,
        FsObjectType::FeatureView => 2,
        FsObjectType::FeatureService => 3,
    };
    KindConfig {
        layer,
        label_prefix,
        fs_object_type,
        entity_type,
        node_id_prefix,
    }
}

/// Node id prefix of entities.
pub const ENTITY_PREFIX: &str = "entity";
/// Node id prefix of data sources.
pub const DATA_SOURCE_PREFIX: &str = "datasource";
/// Node id prefix of feature views (all variants).
pub const FEATURE_VIEW_PREFIX: &str = "featureview";
/// Node id prefix of feature services.
pub const FEATURE_SERVICE_PREFIX: &str = "featureservice";

impl KindConfig {
    /// Table entry for a kind.
    pub const fn of(kind: ObjectKind) -> Self {
        use EntityType as E;
        use FsObjectType as F;
        match kind {
            ObjectKind::Entity => config(F::Entity, E::Entity, "Entity", ENTITY_PREFIX),
            ObjectKind::DataSource => {
                config(F::DataSource, E::BatchDataSource, "Data Source", DATA_SOURCE_PREFIX)
            }
            ObjectKind::BatchDataSource => {
                config(F::DataSource, E::BatchDataSource, "Batch Data Source", DATA_SOURCE_PREFIX)
            }
            ObjectKind::PushDataSource => {
                config(F::DataSource, E::PushDataSource, "Push Data Source", DATA_SOURCE_PREFIX)
            }
            ObjectKind::RequestDataSource => {
                config(F::DataSource, E::RequestDataSource, "Request Data Source", DATA_SOURCE_PREFIX)
            }
            ObjectKind::FeatureView => {
                config(F::FeatureView, E::BatchFeatureView, "Batch Feature View", FEATURE_VIEW_PREFIX)
            }
            ObjectKind::OnDemandFeatureView => config(
                F::FeatureView,
                E::OnDemandFeatureView,
                "On Demand Feature View",
                FEATURE_VIEW_PREFIX,
            ),
            ObjectKind::StreamFeatureView => {
                config(F::FeatureView, E::StreamFeatureView, "Stream Feature View", FEATURE_VIEW_PREFIX)
            }
            ObjectKind::FeatureService => {
                config(F::FeatureService, E::FeatureService, "Feature Service", FEATURE_SERVICE_PREFIX)
            }
        }
    }

    /// Node id for an object of this kind.
    pub fn node_id(&self, name: &str) -> String {
        format!("{}-{}", self.node_id_prefix, name)
    }
}

/// Node id and kind of a relationship endpoint, if it has a name and a
/// recognized type.
pub fn map_endpoint(endpoint: &ObjectRef) -> Option<(String, ObjectKind)> {
    let name = endpoint.name().filter(|n| !n.is_empty())?;
    let kind = endpoint.kind()?;
    Some((KindConfig::of(kind).node_id(name), kind))
}
