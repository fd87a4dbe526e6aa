//! Error types for the watermark codec

use thiserror::Error;

/// Result type alias using WatermarkError
pub type Result<T> = std::result::Result<T, WatermarkError>;

/// Errors that can occur while embedding a watermark
///
/// Extraction failure is not an error: extract returns `None` when no
/// valid payload can be reconstructed, and verify reports
/// verified-false.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// The carrier has fewer candidate positions than payload bits
    #[error("Insufficient carrier capacity: need {needed} candidate positions, found {available}")]
    InsufficientCarrierCapacity { needed: usize, available: usize },

    /// The strategy cannot operate on this resource form
    #[error("Unsupported resource for this strategy: {0}")]
    UnsupportedResource(String),

    /// No strategy is registered for the requested resource type
    #[error("No watermark strategy registered for resource type '{0}'")]
    StrategyUnavailable(String),

    /// Payload serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for WatermarkError {
    fn from(err: serde_json::Error) -> Self {
        WatermarkError::SerializationError(err.to_string())
    }
}
