//! Identity document synthesis
//!
//! Every identifier gets a structured identity document: verification
//! keys, authentication references, and the standard service endpoints
//! for its resource type. The document serializes to the external JSON
//! shape with `https://www.w3.org/ns/did/v1` first in `@context`.

use chrono::{DateTime, SecondsFormat, Utc};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SigilError};
use crate::identifier::AssetId;
use crate::resource::ResourceType;

/// First `@context` entry, fixed by the external interface
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// `@context` entry for the Ed25519 verification suite
pub const ED25519_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// Key type tag for the default verification method
pub const ED25519_KEY_TYPE: &str = "Ed25519VerificationKey2020";

/// Default base URL for synthesized service endpoints
pub const DEFAULT_SERVICE_BASE: &str = "https://resolver.sigil.network";

// multicodec prefix for ed25519 public keys, per the did:key method
const ED25519_MULTICODEC: [u8; 2] = [0xED, 0x01];

/// A verification method entry in an identity document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Fragment identifier, e.g. `{did}#key-1`
    pub id: String,
    /// Key type tag
    #[serde(rename = "type")]
    pub key_type: String,
    /// Controller of this key
    pub controller: String,
    /// Multibase-encoded public key (`z` + base58btc of multicodec + key)
    pub public_key_multibase: String,
}

/// A service endpoint entry in an identity document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    /// Fragment identifier, e.g. `{did}#metadata`
    pub id: String,
    /// Service type tag
    #[serde(rename = "type")]
    pub service_type: String,
    /// Endpoint URL
    pub service_endpoint: String,
}

/// The identity document bound to an identifier at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub controller: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authentication: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub assertion_method: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub service: Vec<ServiceEndpoint>,
    /// ISO-8601 UTC, millisecond precision
    pub created: String,
    /// ISO-8601 UTC, millisecond precision
    pub updated: String,
}

/// Ed25519 key pair backing a verification method
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("verifying_key", &self.public_key_multibase())
            .finish()
    }
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing-key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Raw signing-key bytes.
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Raw verifying-key bytes.
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Public key in multibase form: `z` + base58btc(multicodec ‖ key).
    pub fn public_key_multibase(&self) -> String {
        encode_public_key_multibase(&self.verifying_key.to_bytes())
    }
}

/// Encode raw Ed25519 public-key bytes in multibase base58btc form.
pub fn encode_public_key_multibase(key_bytes: &[u8; 32]) -> String {
    let mut prefixed = Vec::with_capacity(2 + key_bytes.len());
    prefixed.extend_from_slice(&ED25519_MULTICODEC);
    prefixed.extend_from_slice(key_bytes);
    format!("z{}", bs58::encode(prefixed).into_string())
}

/// Decode a multibase base58btc public key back to its raw bytes.
pub fn decode_public_key_multibase(multibase: &str) -> Result<[u8; 32]> {
    let b58 = multibase.strip_prefix('z').ok_or_else(|| {
        SigilError::InvalidKeyMaterial("expected base58btc (z-prefix) multibase".into())
    })?;
    let decoded = bs58::decode(b58)
        .into_vec()
        .map_err(|e| SigilError::InvalidKeyMaterial(format!("invalid base58: {e}")))?;
    if decoded.len() != 34 || decoded[..2] != ED25519_MULTICODEC {
        return Err(SigilError::InvalidKeyMaterial(
            "expected ed25519 multicodec prefix and 32 key bytes".into(),
        ));
    }
    Ok(decoded[2..].try_into().expect("32-byte slice"))
}

impl IdentityDocument {
    /// Synthesize the identity document for a freshly derived identifier.
    ///
    /// Emits the standard service endpoints for the identifier's
    /// resource type, one default Ed25519 verification method (from
    /// `key_pair`, or freshly generated), and authentication/assertion
    /// references to that method.
    pub fn synthesize(
        id: &AssetId,
        controller: Option<&str>,
        key_pair: Option<&KeyPair>,
        service_base: Option<&str>,
    ) -> Self {
        let did = id.to_string();
        let controller = controller.unwrap_or(&did).to_string();
        let now = iso_millis(Utc::now());

        let generated;
        let key_pair = match key_pair {
            Some(kp) => kp,
            None => {
                generated = KeyPair::generate();
                &generated
            }
        };

        let method_id = format!("{did}#key-1");
        let verification_method = vec![VerificationMethod {
            id: method_id.clone(),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: controller.clone(),
            public_key_multibase: key_pair.public_key_multibase(),
        }];

        Self {
            context: vec![DID_CONTEXT.to_string(), ED25519_CONTEXT.to_string()],
            id: did.clone(),
            controller,
            verification_method,
            authentication: vec![method_id.clone()],
            assertion_method: vec![method_id],
            service: standard_services(&did, id.resource_type, service_base),
            created: now.clone(),
            updated: now,
        }
    }

    /// Refresh the `updated` timestamp.
    pub fn touch(&mut self) {
        self.updated = iso_millis(Utc::now());
    }

    /// Append a service endpoint and refresh `updated`.
    pub fn add_service(
        &mut self,
        fragment: &str,
        service_type: impl Into<String>,
        endpoint: impl Into<String>,
    ) {
        self.service.push(ServiceEndpoint {
            id: format!("{}#{fragment}", self.id),
            service_type: service_type.into(),
            service_endpoint: endpoint.into(),
        });
        self.touch();
    }

    /// Append a verification method and refresh `updated`.
    pub fn add_verification_method(&mut self, fragment: &str, key_pair: &KeyPair) {
        self.verification_method.push(VerificationMethod {
            id: format!("{}#{fragment}", self.id),
            key_type: ED25519_KEY_TYPE.to_string(),
            controller: self.controller.clone(),
            public_key_multibase: key_pair.public_key_multibase(),
        });
        self.touch();
    }
}

/// Format a timestamp as ISO-8601 UTC with millisecond precision.
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn standard_services(
    did: &str,
    resource_type: ResourceType,
    service_base: Option<&str>,
) -> Vec<ServiceEndpoint> {
    let base = service_base.unwrap_or(DEFAULT_SERVICE_BASE);
    let endpoint = |path: &str| format!("{base}/{did}/{path}");
    let entry = |fragment: &str, service_type: &str, path: &str| ServiceEndpoint {
        id: format!("{did}#{fragment}"),
        service_type: service_type.to_string(),
        service_endpoint: endpoint(path),
    };

    let mut services = vec![
        entry("metadata", "MetadataService", "metadata"),
        entry("watermark", "WatermarkService", "watermark"),
        entry("provenance", "ProvenanceService", "provenance"),
        entry("c2pa", "C2paManifestService", "c2pa"),
    ];

    match resource_type {
        ResourceType::AiModel => services.push(entry("mcp", "ModelInterfaceService", "mcp")),
        ResourceType::Dataset => services.push(entry("explore", "DataExploreService", "explore")),
        ResourceType::Code => services.push(entry("execute", "CodeExecutionService", "execute")),
        _ => {}
    }

    services
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DigestEncoding;
    use crate::resource::content_digest;
    use serde_json::{json, Map, Value};

    fn derive_id(resource_type: ResourceType) -> AssetId {
        let attrs: Map<String, Value> = json!({
            "content_hash": content_digest(b"doc subject"),
            "model_hash": content_digest(b"doc subject"),
            "data_hash": content_digest(b"doc subject"),
            "code_hash": content_digest(b"doc subject"),
            "mime_type": "application/octet-stream",
            "charset": "utf-8",
            "dimensions": "64x64",
            "duration": 1.0,
            "sample_rate": 44100,
            "architecture": "transformer",
            "parameters": 7,
            "training_dataset_ref": "did:asset:dataset:ref",
            "record_count": 10,
            "schema_ref": "s",
            "language": "rust",
            "version": "1.0.0",
        })
        .as_object()
        .unwrap()
        .clone();
        AssetId::derive("asset", resource_type, &attrs, None, DigestEncoding::Base58).unwrap()
    }

    #[test]
    fn test_context_order_fixed() {
        let doc = IdentityDocument::synthesize(&derive_id(ResourceType::Text), None, None, None);
        assert_eq!(doc.context[0], DID_CONTEXT);
    }

    #[test]
    fn test_standard_services_for_every_type() {
        let doc = IdentityDocument::synthesize(&derive_id(ResourceType::Text), None, None, None);
        let fragments: Vec<&str> = doc
            .service
            .iter()
            .map(|s| s.id.rsplit('#').next().unwrap())
            .collect();
        assert_eq!(fragments, ["metadata", "watermark", "provenance", "c2pa"]);
    }

    #[test]
    fn test_type_specific_services() {
        let model = IdentityDocument::synthesize(&derive_id(ResourceType::AiModel), None, None, None);
        assert!(model.service.iter().any(|s| s.id.ends_with("#mcp")));

        let dataset = IdentityDocument::synthesize(&derive_id(ResourceType::Dataset), None, None, None);
        assert!(dataset.service.iter().any(|s| s.id.ends_with("#explore")));

        let code = IdentityDocument::synthesize(&derive_id(ResourceType::Code), None, None, None);
        assert!(code.service.iter().any(|s| s.id.ends_with("#execute")));
    }

    #[test]
    fn test_authentication_references_first_method() {
        let doc = IdentityDocument::synthesize(&derive_id(ResourceType::Text), None, None, None);
        assert_eq!(doc.authentication, vec![doc.verification_method[0].id.clone()]);
        assert_eq!(doc.assertion_method, doc.authentication);
    }

    #[test]
    fn test_caller_supplied_key_pair() {
        let kp = KeyPair::from_bytes(&[7u8; 32]);
        let doc = IdentityDocument::synthesize(
            &derive_id(ResourceType::Text),
            Some("did:asset:generic:controller"),
            Some(&kp),
            None,
        );
        assert_eq!(
            doc.verification_method[0].public_key_multibase,
            kp.public_key_multibase()
        );
        assert_eq!(doc.controller, "did:asset:generic:controller");
    }

    #[test]
    fn test_multibase_roundtrip() {
        let kp = KeyPair::generate();
        let multibase = kp.public_key_multibase();
        assert!(multibase.starts_with('z'));
        let decoded = decode_public_key_multibase(&multibase).unwrap();
        assert_eq!(decoded, kp.verifying_key_bytes());
    }

    #[test]
    fn test_multibase_rejects_wrong_prefix() {
        assert!(decode_public_key_multibase("madeup").is_err());
        assert!(decode_public_key_multibase("z3vQB7B6MW").is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let doc = IdentityDocument::synthesize(&derive_id(ResourceType::Text), None, None, None);
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("@context").is_some());
        assert!(value.get("verificationMethod").is_some());
        let created = value["created"].as_str().unwrap();
        // millisecond precision: ...T12:34:56.789Z
        assert!(created.ends_with('Z') && created.contains('.'));
    }

    #[test]
    fn test_touch_refreshes_updated() {
        let mut doc = IdentityDocument::synthesize(&derive_id(ResourceType::Text), None, None, None);
        let created = doc.created.clone();
        doc.add_service("audit", "AuditService", "https://audit.example/log");
        assert_eq!(doc.created, created);
        assert!(doc.service.iter().any(|s| s.id.ends_with("#audit")));
    }
}
