//! Hierarchical metadata layers
//!
//! A bundle composes up to five layers — identity, provenance,
//! characteristics, lineage, rights — each a tagged variant with typed
//! required fields plus an open extensions map for forward-compatible
//! unknown fields. Every layer knows its standard tag, validates its
//! own required-field invariant, and projects to its named external
//! vocabulary.

pub mod characteristics;
pub mod identity;
pub mod lineage;
pub mod provenance;
pub mod rights;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{MetadataError, MetadataResult};

pub use characteristics::{CharacteristicsLayer, CharacteristicsSchema};
pub use identity::IdentityLayer;
pub use lineage::LineageLayer;
pub use provenance::{ProvenanceLayer, ProvenanceSignature};
pub use rights::{License, PolicyConstraint, PolicyRule, RightsLayer};

/// The five layer slots of a metadata bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Identity,
    Provenance,
    Characteristics,
    Lineage,
    Rights,
}

impl LayerKind {
    /// All layer slots, in bundle order.
    pub const ALL: [LayerKind; 5] = [
        LayerKind::Identity,
        LayerKind::Provenance,
        LayerKind::Characteristics,
        LayerKind::Lineage,
        LayerKind::Rights,
    ];
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayerKind::Identity => "identity",
            LayerKind::Provenance => "provenance",
            LayerKind::Characteristics => "characteristics",
            LayerKind::Lineage => "lineage",
            LayerKind::Rights => "rights",
        };
        f.write_str(s)
    }
}

impl FromStr for LayerKind {
    type Err = MetadataError;

    /// Resolve a standard tag (or layer name) to its slot.
    fn from_str(s: &str) -> MetadataResult<Self> {
        match s {
            "identity" | "did" => Ok(LayerKind::Identity),
            "provenance" | "c2pa" => Ok(LayerKind::Provenance),
            "characteristics" | "model-card" | "data-sheet" | "general" => {
                Ok(LayerKind::Characteristics)
            }
            "lineage" | "prov" => Ok(LayerKind::Lineage),
            "rights" | "odrl" | "odrl-like" => Ok(LayerKind::Rights),
            other => Err(MetadataError::UnknownLayerTag(other.to_string())),
        }
    }
}

/// The contract every layer satisfies
pub trait MetadataLayer {
    /// Which bundle slot this layer occupies.
    fn kind(&self) -> LayerKind;

    /// The layer's standard tag (`did`, `c2pa`, `model-card`, ...).
    fn standard_tag(&self) -> &'static str;

    /// Check the layer's required-field invariant.
    fn validate(&self) -> MetadataResult<()>;

    /// Project the layer into its named external vocabulary.
    fn project(&self) -> Value;

    /// When this layer was last modified (ISO-8601 UTC).
    fn updated_at(&self) -> &str;

    /// Refresh the modification timestamp.
    fn touch(&mut self);
}

/// Update one field of a layer by dot-path, creating missing
/// intermediate objects.
///
/// The layer is rewritten through its serialized form so unknown path
/// segments land in the extensions map rather than being lost.
pub fn update_layer_field<L>(layer: &mut L, path: &str, value: Value) -> MetadataResult<()>
where
    L: MetadataLayer + Serialize + DeserializeOwned,
{
    let mut tree = serde_json::to_value(&*layer)?;
    set_path(&mut tree, path, value)?;
    *layer = serde_json::from_value(tree)?;
    layer.touch();
    Ok(())
}

/// Set `value` at a dot-separated path inside a JSON tree, creating
/// missing intermediate objects along the way.
pub fn set_path(tree: &mut Value, path: &str, value: Value) -> MetadataResult<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(MetadataError::InvalidFieldPath(path.to_string()));
    }

    let mut current = tree;
    for segment in &segments[..segments.len() - 1] {
        let map = current
            .as_object_mut()
            .ok_or_else(|| MetadataError::InvalidFieldPath(path.to_string()))?;
        current = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !current.is_object() {
            return Err(MetadataError::InvalidFieldPath(path.to_string()));
        }
    }

    let map = current
        .as_object_mut()
        .ok_or_else(|| MetadataError::InvalidFieldPath(path.to_string()))?;
    map.insert(segments[segments.len() - 1].to_string(), value);
    Ok(())
}

/// Read the value at a dot-separated path, if present.
pub fn get_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub(crate) fn now_iso() -> String {
    sigil_core::document::iso_millis(chrono::Utc::now())
}
