//! Metadata bundle assembly and views
//!
//! A bundle is a sparse composition over the five layer slots, not a
//! fixed record: missing layers are permitted everywhere, and views
//! omit them rather than emitting nulls. The bundle owns its layers;
//! dropping the bundle releases them all.

use serde_json::{json, Map, Value};
use tracing::debug;

use sigil_core::canonical;
use sigil_core::identifier::AssetId;

use crate::error::{MetadataError, MetadataResult};
use crate::layers::{
    update_layer_field, CharacteristicsLayer, IdentityLayer, LayerKind, LineageLayer,
    MetadataLayer, ProvenanceLayer, RightsLayer,
};

/// Fixed `@context` list of the integrated view
pub const INTEGRATED_CONTEXT: [&str; 4] = [
    "https://www.w3.org/ns/did/v1",
    "https://schema.org",
    "https://www.w3.org/ns/prov#",
    "https://www.w3.org/ns/odrl.jsonld",
];

/// Layered metadata bound to one asset identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataBundle {
    identity: Option<IdentityLayer>,
    provenance: Option<ProvenanceLayer>,
    characteristics: Option<CharacteristicsLayer>,
    lineage: Option<LineageLayer>,
    rights: Option<RightsLayer>,
}

impl MetadataBundle {
    /// An empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundle with its identity layer initialized from a freshly
    /// derived identifier.
    pub fn for_identifier(id: &AssetId, controller: Option<&str>) -> Self {
        let did = id.to_string();
        let controller = controller.unwrap_or(&did).to_string();
        let mut bundle = Self::new();
        bundle.set_identity(IdentityLayer::new(did, controller));
        bundle
    }

    // =========================================================================
    // Layer slots
    // =========================================================================

    /// Replace the identity layer.
    pub fn set_identity(&mut self, layer: IdentityLayer) -> &mut Self {
        self.identity = Some(layer);
        self
    }

    /// Replace the provenance layer.
    pub fn set_provenance(&mut self, layer: ProvenanceLayer) -> &mut Self {
        self.provenance = Some(layer);
        self
    }

    /// Replace the characteristics layer.
    pub fn set_characteristics(&mut self, layer: CharacteristicsLayer) -> &mut Self {
        self.characteristics = Some(layer);
        self
    }

    /// Replace the lineage layer.
    pub fn set_lineage(&mut self, layer: LineageLayer) -> &mut Self {
        self.lineage = Some(layer);
        self
    }

    /// Replace the rights layer.
    pub fn set_rights(&mut self, layer: RightsLayer) -> &mut Self {
        self.rights = Some(layer);
        self
    }

    pub fn identity(&self) -> Option<&IdentityLayer> {
        self.identity.as_ref()
    }

    pub fn provenance(&self) -> Option<&ProvenanceLayer> {
        self.provenance.as_ref()
    }

    pub fn provenance_mut(&mut self) -> Option<&mut ProvenanceLayer> {
        self.provenance.as_mut()
    }

    pub fn characteristics(&self) -> Option<&CharacteristicsLayer> {
        self.characteristics.as_ref()
    }

    pub fn lineage(&self) -> Option<&LineageLayer> {
        self.lineage.as_ref()
    }

    pub fn lineage_mut(&mut self) -> Option<&mut LineageLayer> {
        self.lineage.as_mut()
    }

    pub fn rights(&self) -> Option<&RightsLayer> {
        self.rights.as_ref()
    }

    /// Remove a layer, returning whether it was present.
    pub fn remove_layer(&mut self, kind: LayerKind) -> bool {
        let removed = match kind {
            LayerKind::Identity => self.identity.take().is_some(),
            LayerKind::Provenance => self.provenance.take().is_some(),
            LayerKind::Characteristics => self.characteristics.take().is_some(),
            LayerKind::Lineage => self.lineage.take().is_some(),
            LayerKind::Rights => self.rights.take().is_some(),
        };
        if removed {
            debug!(layer = %kind, "removed metadata layer");
        }
        removed
    }

    /// The slots currently populated, in bundle order.
    pub fn present_layers(&self) -> Vec<LayerKind> {
        LayerKind::ALL
            .into_iter()
            .filter(|kind| self.has_layer(*kind))
            .collect()
    }

    /// Whether a slot is populated.
    pub fn has_layer(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Identity => self.identity.is_some(),
            LayerKind::Provenance => self.provenance.is_some(),
            LayerKind::Characteristics => self.characteristics.is_some(),
            LayerKind::Lineage => self.lineage.is_some(),
            LayerKind::Rights => self.rights.is_some(),
        }
    }

    // =========================================================================
    // Field updates
    // =========================================================================

    /// Update one field of a layer by dot-path, creating missing
    /// intermediate objects.
    pub fn update_field(
        &mut self,
        kind: LayerKind,
        path: &str,
        value: Value,
    ) -> MetadataResult<()> {
        match kind {
            LayerKind::Identity => match self.identity.as_mut() {
                Some(layer) => update_layer_field(layer, path, value),
                None => Err(MetadataError::LayerNotPresent(kind.to_string())),
            },
            LayerKind::Provenance => match self.provenance.as_mut() {
                Some(layer) => update_layer_field(layer, path, value),
                None => Err(MetadataError::LayerNotPresent(kind.to_string())),
            },
            LayerKind::Characteristics => match self.characteristics.as_mut() {
                Some(layer) => update_layer_field(layer, path, value),
                None => Err(MetadataError::LayerNotPresent(kind.to_string())),
            },
            LayerKind::Lineage => match self.lineage.as_mut() {
                Some(layer) => update_layer_field(layer, path, value),
                None => Err(MetadataError::LayerNotPresent(kind.to_string())),
            },
            LayerKind::Rights => match self.rights.as_mut() {
                Some(layer) => update_layer_field(layer, path, value),
                None => Err(MetadataError::LayerNotPresent(kind.to_string())),
            },
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate one layer's required-field invariant.
    pub fn validate_layer(&self, kind: LayerKind) -> MetadataResult<()> {
        self.layer(kind)
            .ok_or_else(|| MetadataError::LayerNotPresent(kind.to_string()))?
            .validate()
    }

    /// Validate every present layer, collecting all failures.
    pub fn validate_all(&self) -> Result<(), Vec<MetadataError>> {
        let errors: Vec<MetadataError> = LayerKind::ALL
            .into_iter()
            .filter_map(|kind| self.layer(kind))
            .filter_map(|layer| layer.validate().err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether every present layer is valid.
    pub fn is_valid(&self) -> bool {
        self.validate_all().is_ok()
    }

    fn layer(&self, kind: LayerKind) -> Option<&dyn MetadataLayer> {
        match kind {
            LayerKind::Identity => self.identity.as_ref().map(|l| l as &dyn MetadataLayer),
            LayerKind::Provenance => self.provenance.as_ref().map(|l| l as &dyn MetadataLayer),
            LayerKind::Characteristics => self
                .characteristics
                .as_ref()
                .map(|l| l as &dyn MetadataLayer),
            LayerKind::Lineage => self.lineage.as_ref().map(|l| l as &dyn MetadataLayer),
            LayerKind::Rights => self.rights.as_ref().map(|l| l as &dyn MetadataLayer),
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// A document holding only the requested layers, keyed by their
    /// standard tags.
    ///
    /// The identity layer is always included as context when present:
    /// its `id` at the top level and its projection under `did`.
    /// Absent layers are omitted, never rendered as null.
    pub fn selective_view(&self, tags: &[&str]) -> MetadataResult<Value> {
        let mut requested = Vec::new();
        for tag in tags {
            requested.push(tag.parse::<LayerKind>()?);
        }

        let mut view = Map::new();
        if let Some(ref identity) = self.identity {
            view.insert("id".to_string(), json!(identity.id));
            view.insert(identity.standard_tag().to_string(), identity.project());
        }
        for kind in LayerKind::ALL {
            if kind == LayerKind::Identity || !requested.contains(&kind) {
                continue;
            }
            if let Some(layer) = self.layer(kind) {
                view.insert(layer.standard_tag().to_string(), layer.project());
            }
        }
        Ok(Value::Object(view))
    }

    /// The integrated view: the fixed `@context` list merged with the
    /// identity projection and the remaining layers' projections.
    pub fn integrated_view(&self) -> Value {
        let mut view = Map::new();
        view.insert("@context".to_string(), json!(INTEGRATED_CONTEXT));

        if let Some(ref identity) = self.identity {
            if let Value::Object(projection) = identity.project() {
                for (key, value) in projection {
                    if key != "@context" {
                        view.insert(key, value);
                    }
                }
            }
        }
        if let Some(ref provenance) = self.provenance {
            view.insert("provenance".to_string(), provenance.project());
        }
        if let Some(ref characteristics) = self.characteristics {
            view.insert(
                characteristics.standard_tag().to_string(),
                characteristics.project(),
            );
        }
        if let Some(ref lineage) = self.lineage {
            view.insert("lineage".to_string(), lineage.project());
        }
        if let Some(ref rights) = self.rights {
            view.insert("rights".to_string(), rights.project());
        }

        Value::Object(view)
    }

    /// `hex(sha256(canonical-json(integrated view)))`, the hash the
    /// registry collaborator anchors.
    pub fn metadata_hash(&self) -> String {
        canonical::canonical_sha256_hex(&self.integrated_view())
    }
}
