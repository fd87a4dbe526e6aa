//! # Sigil Watermark
//!
//! Text watermark codec: embeds a binary payload into natural-language
//! text while preserving readability, and recovers it later.
//!
//! ## Key Concepts
//!
//! - **Payload**: a compact JSON binding `{did, timestamp, ...}`
//!   rendered as a bit sequence
//! - **Channel**: one of three substitution mechanisms (spaces,
//!   punctuation, synonyms) that each map a single bit onto a
//!   visible-equivalent alternative
//! - **Strategy slot**: the same embed/extract/verify capability
//!   interface declared per resource type; only text is implemented
//!   here
//!
//! ## Contracts
//!
//! - Embedding fails with `InsufficientCarrierCapacity` when the text
//!   offers fewer candidate positions than payload bits, and never
//!   alters a character outside a candidate position
//! - Extraction is a predicate: unreadable or absent marks yield
//!   `None`, never an error
//! - An embedded mark survives re-encoding by this codec and decodes
//!   to the original payload

pub mod bits;
pub mod error;
pub mod payload;
pub mod strategy;
pub mod text;

pub use bits::BitString;
pub use error::{Result, WatermarkError};
pub use payload::WatermarkPayload;
pub use strategy::{
    EmbedStrength, Resource, StrategyRegistry, TextWatermarker, VerificationReport,
    WatermarkStrategy,
};
pub use text::{TextChannel, TextOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
