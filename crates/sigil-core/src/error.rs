//! Error types for identifier derivation and canonical encoding

use thiserror::Error;

/// Result type alias using SigilError
pub type Result<T> = std::result::Result<T, SigilError>;

/// Errors that can occur while deriving, encoding, or parsing identifiers
#[derive(Error, Debug)]
pub enum SigilError {
    /// Identifier string could not be parsed
    #[error("Malformed identifier: {0}")]
    IdentifierMalformed(String),

    /// Resource type is not in the closed vocabulary
    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    /// Digest encoding is not one of hex / base58 / base64url
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Canonical attribute set for a resource type lacks a required field
    #[error("Missing required attribute '{field}' for resource type '{resource_type}'")]
    MissingRequiredAttribute {
        resource_type: String,
        field: String,
    },

    /// A declared serialization format is not provided by this implementation
    #[error("Serialization format not supported: {0}")]
    SerializationUnsupported(String),

    /// TLV decoding failed (truncated length, unknown tag, bad scalar layout)
    #[error("Invalid TLV encoding: {0}")]
    InvalidTlv(String),

    /// Public key bytes could not be interpreted
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SigilError {
    fn from(err: serde_json::Error) -> Self {
        SigilError::SerializationError(err.to_string())
    }
}
