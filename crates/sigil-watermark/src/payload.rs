//! Watermark payload
//!
//! The payload binds an identifier (and optionally a metadata hash and
//! issuance details) to the carrier. On the wire it is compact JSON;
//! the bit form emits the low byte of each UTF-16 code unit, eight bits
//! big-endian per unit, which is lossless for the ASCII JSON this codec
//! produces.

use serde::{Deserialize, Serialize};

use crate::bits::BitString;
use crate::error::Result;

/// The payload embedded by every watermark strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkPayload {
    /// Identifier of the watermarked asset
    pub did: String,
    /// Issuance timestamp (ISO-8601 UTC)
    pub timestamp: String,
    /// Hash of the asset's integrated metadata at issuance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_hash: Option<String>,
    /// Issuing party
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Expiry of the binding (ISO-8601 UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

impl WatermarkPayload {
    /// Create a payload carrying just the identifier binding.
    pub fn new(did: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            timestamp: timestamp.into(),
            metadata_hash: None,
            issuer: None,
            expiration_date: None,
        }
    }

    /// Attach the integrated-metadata hash.
    pub fn with_metadata_hash(mut self, hash: impl Into<String>) -> Self {
        self.metadata_hash = Some(hash.into());
        self
    }

    /// Attach the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Attach an expiration date.
    pub fn with_expiration_date(mut self, at: impl Into<String>) -> Self {
        self.expiration_date = Some(at.into());
        self
    }

    /// Serialize to the embedded bit form.
    pub fn to_bits(&self) -> Result<BitString> {
        let json = serde_json::to_string(self)?;
        let mut bits = BitString::new();
        for unit in json.encode_utf16() {
            bits.push_byte((unit & 0xFF) as u8);
        }
        Ok(bits)
    }

    /// Reconstruct a payload from recovered bits.
    ///
    /// The bit sequence is truncated to a byte multiple and parsed as
    /// JSON; any failure yields `None` rather than an error.
    pub fn from_bits(bits: &BitString) -> Option<Self> {
        let bytes = bits.to_bytes();
        let json = String::from_utf8(bytes).ok()?;
        serde_json::from_str(&json).ok()
    }
}
