//! Declared serialization formats
//!
//! JSON-LD is the default wire form; plain JSON and TLV are also
//! implemented. CBOR and XML are declared so callers can negotiate
//! formats, but this implementation does not provide them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical;
use crate::error::{Result, SigilError};
use crate::tlv;

/// Wire formats a caller may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerializationFormat {
    /// JSON-LD: the value carries its own `@context`
    JsonLd,
    /// Plain canonical JSON
    Json,
    /// TLV binary framing
    Tlv,
    /// Declared but not provided
    Cbor,
    /// Declared but not provided
    Xml,
}

impl SerializationFormat {
    /// Serialize a JSON value under this format.
    pub fn serialize_value(&self, value: &Value) -> Result<Vec<u8>> {
        match self {
            // JSON-LD and plain JSON share the canonical byte form; the
            // difference is whether the value carries @context, which is
            // the caller's concern.
            SerializationFormat::JsonLd | SerializationFormat::Json => {
                Ok(canonical::to_canonical_bytes(value))
            }
            SerializationFormat::Tlv => Ok(tlv::encode_value(value)),
            SerializationFormat::Cbor | SerializationFormat::Xml => {
                Err(SigilError::SerializationUnsupported(self.to_string()))
            }
        }
    }
}

impl Default for SerializationFormat {
    fn default() -> Self {
        SerializationFormat::JsonLd
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SerializationFormat::JsonLd => "json-ld",
            SerializationFormat::Json => "json",
            SerializationFormat::Tlv => "tlv",
            SerializationFormat::Cbor => "cbor",
            SerializationFormat::Xml => "xml",
        };
        f.write_str(s)
    }
}

impl FromStr for SerializationFormat {
    type Err = SigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json-ld" | "jsonld" => Ok(SerializationFormat::JsonLd),
            "json" => Ok(SerializationFormat::Json),
            "tlv" => Ok(SerializationFormat::Tlv),
            "cbor" => Ok(SerializationFormat::Cbor),
            "xml" => Ok(SerializationFormat::Xml),
            other => Err(SigilError::SerializationUnsupported(other.to_string())),
        }
    }
}
