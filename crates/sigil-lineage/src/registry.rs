//! Registry collaborator seam
//!
//! The distributed-ledger registry is an external collaborator: this
//! module fixes its interface and the registration data flow, nothing
//! more. Deriving the identifier, synthesizing the identity document,
//! and initializing the bundle happen here; anchoring the result is
//! the registry implementation's business.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use sigil_core::digest::sha256_hex;
use sigil_core::{AssetId, DigestEncoding, IdentityDocument, ResourceType, SigilError};

use crate::bundle::MetadataBundle;

/// What the registry returns when it anchors a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    /// Content identifier in the registry's own addressing scheme
    pub content_id: String,
    /// `hex(sha256(canonical-json(integrated metadata)))`
    pub metadata_hash: String,
    /// Ledger transaction reference
    pub transaction: String,
}

/// A resource as the registry returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResource {
    pub identifier: String,
    pub metadata: Value,
    pub verification: Value,
}

/// The registry collaborator's interface
pub trait ResourceRegistry {
    /// Anchor an identifier and its integrated metadata.
    fn register(
        &mut self,
        identifier: &str,
        integrated_metadata: &Value,
        owner_ref: &str,
    ) -> RegistrationReceipt;

    /// Fetch a previously anchored resource.
    fn get_resource(&self, identifier: &str) -> Option<RegisteredResource>;
}

/// In-memory registry for tests and single-process callers
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    resources: BTreeMap<String, RegisteredResource>,
}

impl MemoryRegistry {
    /// An empty in-memory registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of anchored resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing has been anchored.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceRegistry for MemoryRegistry {
    fn register(
        &mut self,
        identifier: &str,
        integrated_metadata: &Value,
        owner_ref: &str,
    ) -> RegistrationReceipt {
        let metadata_hash =
            sigil_core::canonical::canonical_sha256_hex(integrated_metadata);
        // content-derived references keep the memory registry pure
        let content_id = format!("mem:{}", sha256_hex(identifier.as_bytes()));
        let transaction = format!(
            "tx:{}",
            sha256_hex(format!("{identifier}:{metadata_hash}:{owner_ref}").as_bytes())
        );

        debug!(%identifier, %metadata_hash, "anchoring resource in memory registry");
        self.resources.insert(
            identifier.to_string(),
            RegisteredResource {
                identifier: identifier.to_string(),
                metadata: integrated_metadata.clone(),
                verification: json!({
                    "metadataHash": metadata_hash,
                    "owner": owner_ref,
                }),
            },
        );

        RegistrationReceipt {
            content_id,
            metadata_hash,
            transaction,
        }
    }

    fn get_resource(&self, identifier: &str) -> Option<RegisteredResource> {
        self.resources.get(identifier).cloned()
    }
}

/// A registration request: a resource plus typed attributes
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Identifier method tag
    pub method: String,
    /// Type of the resource being registered
    pub resource_type: ResourceType,
    /// Type-specific attributes feeding the identifier digest
    pub attributes: Map<String, Value>,
    /// Owner string, hashed into the identifier's owner tag
    pub owner: Option<String>,
    /// Digest encoding of the identifier's compact form
    pub encoding: DigestEncoding,
    /// Controller of the identity document and bundle
    pub controller: Option<String>,
}

impl RegistrationRequest {
    /// A request with the default method and encoding.
    pub fn new(resource_type: ResourceType, attributes: Map<String, Value>) -> Self {
        Self {
            method: sigil_core::DEFAULT_METHOD.to_string(),
            resource_type,
            attributes,
            owner: None,
            encoding: DigestEncoding::default(),
            controller: None,
        }
    }

    /// Set the owner (builder pattern).
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the digest encoding.
    pub fn with_encoding(mut self, encoding: DigestEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Derive the identifier, synthesize its identity document, and
    /// initialize the metadata bundle's identity layer.
    pub fn execute(&self) -> Result<RegisteredAsset, SigilError> {
        let identifier = AssetId::derive(
            self.method.clone(),
            self.resource_type,
            &self.attributes,
            self.owner.as_deref(),
            self.encoding,
        )?;
        let document =
            IdentityDocument::synthesize(&identifier, self.controller.as_deref(), None, None);
        let bundle = MetadataBundle::for_identifier(&identifier, self.controller.as_deref());

        Ok(RegisteredAsset {
            identifier,
            document,
            bundle,
        })
    }
}

/// The product of a successful registration
#[derive(Debug, Clone)]
pub struct RegisteredAsset {
    pub identifier: AssetId,
    pub document: IdentityDocument,
    pub bundle: MetadataBundle,
}

/// Structured boundary result: `{ok, errorKind?, details?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RegistrationOutcome {
    /// Project a registration result onto the boundary shape.
    pub fn from_result(result: &Result<RegisteredAsset, SigilError>) -> Self {
        match result {
            Ok(asset) => Self {
                ok: true,
                error_kind: None,
                details: Some(json!({
                    "identifier": asset.identifier.to_string(),
                    "metadataHash": asset.bundle.metadata_hash(),
                })),
            },
            Err(err) => Self {
                ok: false,
                error_kind: Some(error_kind(err).to_string()),
                details: Some(json!({"message": err.to_string()})),
            },
        }
    }
}

fn error_kind(err: &SigilError) -> &'static str {
    match err {
        SigilError::IdentifierMalformed(_) => "IdentifierMalformed",
        SigilError::UnsupportedResourceType(_) => "UnsupportedResourceType",
        SigilError::UnsupportedEncoding(_) => "UnsupportedEncoding",
        SigilError::MissingRequiredAttribute { .. } => "MissingRequiredAttribute",
        SigilError::SerializationUnsupported(_) => "SerializationUnsupported",
        SigilError::InvalidTlv(_) => "InvalidTlv",
        SigilError::InvalidKeyMaterial(_) => "InvalidKeyMaterial",
        SigilError::SerializationError(_) => "SerializationError",
    }
}
