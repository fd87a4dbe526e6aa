//! # Sigil Core
//!
//! Content-addressed identifiers and canonical encodings for
//! heterogeneous digital assets (text, images, audio, video, code,
//! datasets, AI models).
//!
//! ## Key Concepts
//!
//! - **Asset identifier**: `did:{method}:{resource-type}:{encoded-id}`
//!   with an optional owner tag, derived deterministically from the
//!   resource's canonical attribute set
//! - **Canonical JSON**: recursively key-sorted, whitespace-free
//!   serialization underlying every digest
//! - **Identity document**: verification keys and service endpoints
//!   bound to an identifier at creation
//!
//! ## Invariants
//!
//! 1. **Determinism**: identical (method, resource type, attributes,
//!    encoding) produce a byte-identical identifier anywhere
//! 2. **Reversibility**: parsing the compact form recovers the method,
//!    resource type, digest bytes, and owner tag
//! 3. **Encoding round-trip**: hex, Base58, and Base64URL-nopad are
//!    exact inverses on any byte sequence

pub mod canonical;
pub mod digest;
pub mod document;
pub mod error;
pub mod format;
pub mod identifier;
pub mod resource;
pub mod tlv;

pub use digest::{sha256, sha256_hex, DigestEncoding};
pub use document::{IdentityDocument, KeyPair, ServiceEndpoint, VerificationMethod};
pub use error::{Result, SigilError};
pub use format::SerializationFormat;
pub use identifier::{owner_tag, AssetId, DEFAULT_METHOD};
pub use resource::{canonical_attribute_digest, content_digest, ResourceType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
