//! Identity layer (`did`)
//!
//! Binds the bundle to its identifier and controller. Required fields:
//! `id`, `controller`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{now_iso, LayerKind, MetadataLayer};
use crate::error::{MetadataError, MetadataResult};

/// Fixed `@context` of the identity projection
pub const IDENTITY_CONTEXT: [&str; 2] = [
    "https://www.w3.org/ns/did/v1",
    "https://w3id.org/security/suites/ed25519-2020/v1",
];

/// The identity layer of a metadata bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityLayer {
    /// The asset identifier this bundle describes
    pub id: String,
    /// Controller of the identifier
    pub controller: String,
    /// Forward-compatible unknown fields
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
    /// Last modification (ISO-8601 UTC)
    pub updated_at: String,
}

impl IdentityLayer {
    /// Create an identity layer for an identifier and its controller.
    pub fn new(id: impl Into<String>, controller: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            controller: controller.into(),
            extensions: BTreeMap::new(),
            updated_at: now_iso(),
        }
    }
}

impl MetadataLayer for IdentityLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Identity
    }

    fn standard_tag(&self) -> &'static str {
        "did"
    }

    fn validate(&self) -> MetadataResult<()> {
        let mut fields = Vec::new();
        if self.id.is_empty() {
            fields.push("id".to_string());
        }
        if self.controller.is_empty() {
            fields.push("controller".to_string());
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(MetadataError::InvalidIdentityLayer { fields })
        }
    }

    fn project(&self) -> Value {
        let mut doc = json!({
            "@context": IDENTITY_CONTEXT,
            "id": self.id,
            "controller": self.controller,
        });
        let map = doc.as_object_mut().expect("object literal");
        for (key, value) in &self.extensions {
            map.insert(key.clone(), value.clone());
        }
        doc
    }

    fn updated_at(&self) -> &str {
        &self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = now_iso();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_layer() {
        let layer = IdentityLayer::new("did:asset:text:abc", "did:asset:generic:ctrl");
        assert!(layer.validate().is_ok());
        assert_eq!(layer.standard_tag(), "did");
    }

    #[test]
    fn test_validation_lists_empty_fields() {
        let layer = IdentityLayer::new("", "");
        match layer.validate().unwrap_err() {
            MetadataError::InvalidIdentityLayer { fields } => {
                assert_eq!(fields, vec!["id", "controller"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_projection_has_fixed_context() {
        let layer = IdentityLayer::new("did:asset:text:abc", "ctrl");
        let projected = layer.project();
        assert_eq!(projected["@context"][0], "https://www.w3.org/ns/did/v1");
        assert_eq!(projected["id"], "did:asset:text:abc");
    }

    #[test]
    fn test_extensions_survive_projection() {
        let mut layer = IdentityLayer::new("did:asset:text:abc", "ctrl");
        layer
            .extensions
            .insert("alsoKnownAs".into(), serde_json::json!(["urn:x:1"]));
        assert_eq!(layer.project()["alsoKnownAs"][0], "urn:x:1");
    }
}
