//! Provenance layer (`c2pa`)
//!
//! Carries the asset's claim tree and an optional signature block.
//! Required: a non-empty `claim`; a `signature`, when present, must
//! carry a value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{now_iso, LayerKind, MetadataLayer};
use crate::error::{MetadataError, MetadataResult};

/// Signature block of a provenance claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceSignature {
    /// Encoded signature value
    pub value: String,
    /// Signature algorithm tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Key reference used to produce the signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<String>,
}

/// The provenance layer of a metadata bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceLayer {
    /// Claim tree (non-empty object)
    pub claim: Value,
    /// Optional signature over the claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<ProvenanceSignature>,
    /// Forward-compatible unknown fields
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
    /// Last modification (ISO-8601 UTC)
    pub updated_at: String,
}

impl ProvenanceLayer {
    /// Create a provenance layer around a claim tree.
    pub fn new(claim: Value) -> Self {
        Self {
            claim,
            signature: None,
            extensions: BTreeMap::new(),
            updated_at: now_iso(),
        }
    }

    /// Attach a signature block.
    pub fn with_signature(mut self, signature: ProvenanceSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Append an assertion to `claim.assertions`, creating the array
    /// when absent.
    pub fn add_assertion(&mut self, assertion_type: &str, data: Value) -> MetadataResult<()> {
        let claim = match &mut self.claim {
            Value::Object(map) => map,
            Value::Null => {
                self.claim = Value::Object(Map::new());
                self.claim.as_object_mut().expect("just set")
            }
            _ => {
                return Err(MetadataError::InvalidProvenanceLayer {
                    fields: vec!["claim".to_string()],
                })
            }
        };

        let assertions = claim
            .entry("assertions".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(items) = assertions else {
            return Err(MetadataError::InvalidProvenanceLayer {
                fields: vec!["claim.assertions".to_string()],
            });
        };

        items.push(json!({"type": assertion_type, "data": data}));
        self.touch();
        Ok(())
    }
}

impl MetadataLayer for ProvenanceLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Provenance
    }

    fn standard_tag(&self) -> &'static str {
        "c2pa"
    }

    fn validate(&self) -> MetadataResult<()> {
        let mut fields = Vec::new();
        match &self.claim {
            Value::Object(map) if !map.is_empty() => {}
            _ => fields.push("claim".to_string()),
        }
        if let Some(ref signature) = self.signature {
            if signature.value.is_empty() {
                fields.push("signature.value".to_string());
            }
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(MetadataError::InvalidProvenanceLayer { fields })
        }
    }

    /// The raw claim/signature tree.
    fn project(&self) -> Value {
        let mut doc = json!({"claim": self.claim});
        if let Some(ref signature) = self.signature {
            doc["signature"] = serde_json::to_value(signature).expect("plain struct");
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
