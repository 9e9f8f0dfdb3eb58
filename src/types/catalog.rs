//! Catalog object types and the record capability the filter engine needs.
//!
//! Every domain struct keeps fields it does not model in a flattened `extra`
//! map, so a record survives a decode/encode cycle untouched and filter paths
//! can still reach attributes this crate knows nothing about.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::relationship::ObjectKind;

/// Tag mapping attached to a catalog object.
pub type TagMap = BTreeMap<String, String>;

/// Narrow view of a catalog record used by the filter engine.
///
/// A record has a name (the key into a relationship index), an optional tag
/// mapping, and a JSON rendering that dotted attribute paths are resolved
/// against.
pub trait CatalogRecord {
    /// Record name, if it has one.
    fn name(&self) -> Option<&str>;

    /// String-valued tag pairs, or `None` when the record has no tag mapping.
    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>>;

    /// The record as a JSON tree.
    fn document(&self) -> Cow<'_, Value>;
}

impl<T: CatalogRecord + ?Sized> CatalogRecord for &T {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        (**self).tag_pairs()
    }

    fn document(&self) -> Cow<'_, Value> {
        (**self).document()
    }
}

/// Untyped records: `spec.name` / `spec.tags` first, then top-level
/// `name` / `tags` (data sources carry both at the top level).
impl CatalogRecord for Value {
    fn name(&self) -> Option<&str> {
        self.pointer("/spec/name")
            .or_else(|| self.get("name"))
            .and_then(Value::as_str)
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        let tags = self
            .pointer("/spec/tags")
            .or_else(|| self.get("tags"))?
            .as_object()?;
        Some(
            tags.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
                .collect(),
        )
    }

    fn document(&self) -> Cow<'_, Value> {
        Cow::Borrowed(self)
    }
}

fn tag_pairs_of(tags: Option<&TagMap>) -> Option<Vec<(&str, &str)>> {
    tags.map(|t| t.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
}

fn to_document<T: Serialize>(record: &T) -> Cow<'static, Value> {
    match serde_json::to_value(record) {
        Ok(value) => Cow::Owned(value),
        Err(e) => {
            tracing::warn!(error = %e, "catalog record could not be rendered for filtering");
            Cow::Owned(Value::Null)
        }
    }
}

/// Tag mapping with non-string values dropped; anything but an object reads
/// as no mapping.
fn string_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TagMap>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Object(map)) => Some(
            map.into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps arrive as strings or epoch milliseconds; the latter are kept
/// as RFC 3339 text.
fn timestamp_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        _ => None,
    })
}

/// Creation and update timestamps, as emitted by the catalog API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// RFC 3339 creation time.
    #[serde(default, deserialize_with = "timestamp_text", skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<String>,
    /// RFC 3339 last update time.
    #[serde(default, deserialize_with = "timestamp_text", skip_serializing_if = "Option::is_none")]
    pub last_updated_timestamp: Option<String>,
}

/// Common spec block shared by entities and feature services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    /// Object name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner (usually an email).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Classification tags.
    #[serde(default, deserialize_with = "string_tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectSpec {
    /// Spec with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style tag setter.
    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }
}

/// Entity: the object features are keyed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity spec.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: ObjectSpec,
    /// Timestamps.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    /// Entity with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            spec: ObjectSpec::named(name),
            ..Self::default()
        }
    }
}

/// Flavour of a data source, from its wire `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    /// `BATCH_FILE` and anything unrecognized.
    Batch,
    /// `PUSH_SOURCE`.
    Push,
    /// `REQUEST_SOURCE`.
    Request,
}

impl DataSourceKind {
    /// Parse the wire type; unknown values fall back to `Batch`.
    pub fn from_wire(s: Option<&str>) -> Self {
        match s {
            Some("PUSH_SOURCE") => Self::Push,
            Some("REQUEST_SOURCE") => Self::Request,
            _ => Self::Batch,
        }
    }

    /// Relationship kind for this flavour.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Batch => ObjectKind::BatchDataSource,
            Self::Push => ObjectKind::PushDataSource,
            Self::Request => ObjectKind::RequestDataSource,
        }
    }
}

/// Data source. Unlike the other objects its fields sit at the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    /// Data source name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Wire type (`BATCH_FILE`, `PUSH_SOURCE`, `REQUEST_SOURCE`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Classification tags.
    #[serde(default, deserialize_with = "string_tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
    /// Timestamps.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataSource {
    /// Data source with a name and wire type.
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_type: Some(source_type.into()),
            ..Self::default()
        }
    }

    /// Parsed flavour.
    pub fn kind(&self) -> DataSourceKind {
        DataSourceKind::from_wire(self.source_type.as_deref())
    }
}

/// A single feature column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Feature name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Value type (e.g. `INT64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Classification tags.
    #[serde(default, deserialize_with = "string_tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    /// Feature with a name and value type.
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: Some(value_type.into()),
            ..Self::default()
        }
    }
}

/// Spec block of a feature view (any variant).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureViewSpec {
    /// View name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Classification tags.
    #[serde(default, deserialize_with = "string_tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
    /// Feature columns.
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
    /// Served from the online store.
    #[serde(default, deserialize_with = "null_as_default")]
    pub online: bool,
    /// Materialized to the offline store.
    #[serde(default, deserialize_with = "null_as_default")]
    pub offline: bool,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Feature view payload shared by all three variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureView {
    /// View spec.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: FeatureViewSpec,
    /// Timestamps.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureView {
    /// View with a name and feature columns.
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            spec: FeatureViewSpec {
                name: name.into(),
                features,
                ..FeatureViewSpec::default()
            },
            ..Self::default()
        }
    }
}

/// Feature view as it appears in a lineage snapshot.
///
/// Externally tagged on the wire, e.g. `{"onDemandFeatureView": {...}}`; the
/// discriminant decides the node's entity type and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineageFeatureView {
    /// Batch feature view.
    FeatureView(FeatureView),
    /// On-demand feature view.
    OnDemandFeatureView(FeatureView),
    /// Stream feature view.
    StreamFeatureView(FeatureView),
}

impl LineageFeatureView {
    /// Shared payload.
    pub fn view(&self) -> &FeatureView {
        match self {
            Self::FeatureView(v) | Self::OnDemandFeatureView(v) | Self::StreamFeatureView(v) => v,
        }
    }

    /// Relationship kind of this variant.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::FeatureView(_) => ObjectKind::FeatureView,
            Self::OnDemandFeatureView(_) => ObjectKind::OnDemandFeatureView,
            Self::StreamFeatureView(_) => ObjectKind::StreamFeatureView,
        }
    }
}

/// Feature service: a named bundle of feature projections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureService {
    /// Service spec.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: ObjectSpec,
    /// Timestamps.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureService {
    /// Service with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            spec: ObjectSpec::named(name),
            ..Self::default()
        }
    }
}

impl CatalogRecord for Entity {
    fn name(&self) -> Option<&str> {
        Some(&self.spec.name)
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        tag_pairs_of(self.spec.tags.as_ref())
    }

    fn document(&self) -> Cow<'_, Value> {
        to_document(self)
    }
}

impl CatalogRecord for DataSource {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        tag_pairs_of(self.tags.as_ref())
    }

    fn document(&self) -> Cow<'_, Value> {
        to_document(self)
    }
}

impl CatalogRecord for Feature {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        tag_pairs_of(self.tags.as_ref())
    }

    fn document(&self) -> Cow<'_, Value> {
        to_document(self)
    }
}

impl CatalogRecord for FeatureView {
    fn name(&self) -> Option<&str> {
        Some(&self.spec.name)
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        tag_pairs_of(self.spec.tags.as_ref())
    }

    fn document(&self) -> Cow<'_, Value> {
        to_document(self)
    }
}

impl CatalogRecord for LineageFeatureView {
    fn name(&self) -> Option<&str> {
        self.view().name()
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        self.view().tag_pairs()
    }

    fn document(&self) -> Cow<'_, Value> {
        self.view().document()
    }
}

impl CatalogRecord for FeatureService {
    fn name(&self) -> Option<&str> {
        Some(&self.spec.name)
    }

    fn tag_pairs(&self) -> Option<Vec<(&str, &str)>> {
        tag_pairs_of(self.spec.tags.as_ref())
    }

    fn document(&self) -> Cow<'_, Value> {
        to_document(self)
    }
}
