//! Error types for metadata layers and the relationship graph

use thiserror::Error;

/// Result type alias for metadata operations
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Result type alias for graph operations
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Errors from metadata layer validation and field updates
///
/// Validation failures carry the list of offending fields so callers
/// can surface them without re-validating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Identity layer failed validation
    #[error("Invalid identity layer, fields: {fields:?}")]
    InvalidIdentityLayer { fields: Vec<String> },

    /// Provenance layer failed validation
    #[error("Invalid provenance layer, fields: {fields:?}")]
    InvalidProvenanceLayer { fields: Vec<String> },

    /// Characteristics layer failed validation
    #[error("Invalid characteristics layer, fields: {fields:?}")]
    InvalidCharacteristicsLayer { fields: Vec<String> },

    /// Lineage layer failed validation
    #[error("Invalid lineage layer, fields: {fields:?}")]
    InvalidLineageLayer { fields: Vec<String> },

    /// Rights layer failed validation
    #[error("Invalid rights layer, fields: {fields:?}")]
    InvalidRightsLayer { fields: Vec<String> },

    /// The addressed layer is not present in the bundle
    #[error("Layer '{0}' is not present in the bundle")]
    LayerNotPresent(String),

    /// A dot-path update hit a non-object intermediate
    #[error("Field path '{0}' crosses a non-object value")]
    InvalidFieldPath(String),

    /// Unknown layer tag in a selective-view or update request
    #[error("Unknown layer tag: {0}")]
    UnknownLayerTag(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        MetadataError::SerializationError(err.to_string())
    }
}

/// Errors from relationship-graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An operation referenced a node that is not in the graph
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Relationship type is not in the closed vocabulary
    #[error("Unsupported relationship type: {0}")]
    UnsupportedRelationshipType(String),

    /// Entity type is not in the closed vocabulary
    #[error("Unsupported entity type: {0}")]
    UnsupportedEntityType(String),
}
