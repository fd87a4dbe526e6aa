//! Resource types and their canonical attribute sets
//!
//! Every resource type declares the ordered set of fields that
//! contribute to its content digest. Required fields must be present;
//! optional fields are included when supplied and omitted otherwise
//! (never inserted as null). Raw byte content is digested directly and
//! enters the attribute map as a hex content hash.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical;
use crate::digest::sha256_hex;
use crate::error::{Result, SigilError};

/// Closed set of resource types an identifier can be derived for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Text,
    Image,
    Audio,
    Video,
    AiModel,
    Dataset,
    Code,
    Generic,
    ExecutionStructure,
}

impl ResourceType {
    /// All declared resource types.
    pub const ALL: [ResourceType; 9] = [
        ResourceType::Text,
        ResourceType::Image,
        ResourceType::Audio,
        ResourceType::Video,
        ResourceType::AiModel,
        ResourceType::Dataset,
        ResourceType::Code,
        ResourceType::Generic,
        ResourceType::ExecutionStructure,
    ];

    /// String form used inside identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Text => "text",
            ResourceType::Image => "image",
            ResourceType::Audio => "audio",
            ResourceType::Video => "video",
            ResourceType::AiModel => "ai-model",
            ResourceType::Dataset => "dataset",
            ResourceType::Code => "code",
            ResourceType::Generic => "generic",
            ResourceType::ExecutionStructure => "execution-structure",
        }
    }

    /// Attribute fields that must be present to derive an identifier.
    pub fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceType::Text => &["content_hash", "mime_type", "charset"],
            ResourceType::Image => &["content_hash", "mime_type", "dimensions"],
            ResourceType::Audio => &["content_hash", "mime_type", "duration", "sample_rate"],
            ResourceType::Video => &["content_hash", "mime_type", "duration", "dimensions"],
            ResourceType::AiModel => &[
                "model_hash",
                "architecture",
                "parameters",
                "training_dataset_ref",
            ],
            ResourceType::Dataset => &["data_hash", "record_count", "schema_ref"],
            ResourceType::Code => &["code_hash", "language", "version"],
            ResourceType::Generic => &["content_hash"],
            ResourceType::ExecutionStructure => &["content_hash"],
        }
    }

    /// Attribute fields that contribute to the digest when present.
    pub fn optional_attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceType::Text => &["encoding", "language", "format"],
            ResourceType::Image => &["color_depth", "format"],
            ResourceType::Audio => &["channels", "format"],
            ResourceType::Video => &["frame_rate", "format"],
            ResourceType::AiModel => &["license", "framework"],
            ResourceType::Dataset => &["format", "license"],
            ResourceType::Code => &["repository", "license"],
            ResourceType::Generic => &["mime_type", "description"],
            ResourceType::ExecutionStructure => &["entry_point", "runtime"],
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = SigilError;

    fn from_str(s: &str) -> Result<Self> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SigilError::UnsupportedResourceType(s.to_string()))
    }
}

/// Digest raw resource content; the result is the `content_hash` (or
/// `model_hash` / `data_hash` / `code_hash`) attribute value.
pub fn content_digest(content: &[u8]) -> String {
    sha256_hex(content)
}

/// Compute the 256-bit content digest of a resource's canonical
/// attribute set.
///
/// The digest input is the canonical JSON of `{resourceType} ∪ required
/// ∪ optional`, with required fields validated and unknown fields
/// ignored. Fields absent from the input are omitted.
pub fn canonical_attribute_digest(
    resource_type: ResourceType,
    attributes: &Map<String, Value>,
) -> Result<[u8; 32]> {
    let mut canonical_set = Map::new();
    canonical_set.insert(
        "resourceType".to_string(),
        Value::String(resource_type.as_str().to_string()),
    );

    for field in resource_type.required_attributes() {
        let value = attributes
            .get(*field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| SigilError::MissingRequiredAttribute {
                resource_type: resource_type.to_string(),
                field: (*field).to_string(),
            })?;
        canonical_set.insert((*field).to_string(), value.clone());
    }

    for field in resource_type.optional_attributes() {
        if let Some(value) = attributes.get(*field) {
            if !value.is_null() {
                canonical_set.insert((*field).to_string(), value.clone());
            }
        }
    }

    Ok(canonical::canonical_sha256(&Value::Object(canonical_set)))
}
