//! Asset identifier derivation and the compact ↔ canonical forms
//!
//! An identifier is `did:{method}:{resource-type}:{encoded-id}` with an
//! optional `:{owner-tag}` suffix. The encoded id is the 256-bit content
//! digest of the resource's canonical attribute set under one of the
//! declared encodings. Derivation is a pure function: identical input
//! produces a byte-identical identifier anywhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::digest::{sha256, DigestEncoding};
use crate::error::{Result, SigilError};
use crate::resource::{canonical_attribute_digest, ResourceType};

/// Default identifier method tag
pub const DEFAULT_METHOD: &str = "asset";

/// Number of hex digits in an owner tag
const OWNER_TAG_LEN: usize = 8;

/// A content-derived asset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId {
    /// Method tag (short ASCII, default `asset`)
    pub method: String,
    /// Resource type segment
    pub resource_type: ResourceType,
    /// 256-bit content digest of the canonical attributes
    #[serde(with = "serde_digest_hex")]
    pub digest: [u8; 32],
    /// Optional 8-hex-digit owner tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_tag: Option<String>,
    /// Encoding applied to the digest in the compact form
    pub encoding: DigestEncoding,
}

mod serde_digest_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 digest bytes"))
    }
}

impl AssetId {
    /// Derive an identifier from a resource's typed attributes.
    ///
    /// Deterministic: two invocations with the same `(method,
    /// resource_type, attributes, owner, encoding)` yield the same
    /// identifier bytewise.
    pub fn derive(
        method: impl Into<String>,
        resource_type: ResourceType,
        attributes: &Map<String, Value>,
        owner: Option<&str>,
        encoding: DigestEncoding,
    ) -> Result<Self> {
        let digest = canonical_attribute_digest(resource_type, attributes)?;
        Ok(Self {
            method: method.into(),
            resource_type,
            digest,
            owner_tag: owner.map(owner_tag),
            encoding,
        })
    }

    /// Derive an identifier from an external identifier in another
    /// system.
    ///
    /// The digest input is `"{idType}:{externalId}"`, so any two callers
    /// bridging the same external id produce the same identifier.
    pub fn from_external(
        external_id: &str,
        id_type: &str,
        resource_type: ResourceType,
        owner: Option<&str>,
        encoding: DigestEncoding,
    ) -> Self {
        let digest = sha256(format!("{id_type}:{external_id}").as_bytes());
        Self {
            method: DEFAULT_METHOD.to_string(),
            resource_type,
            digest,
            owner_tag: owner.map(owner_tag),
            encoding,
        }
    }

    /// Parse the compact string form back into its components,
    /// detecting the digest encoding from the encoded segment.
    ///
    /// Detection is exact for hex and Base64URL. A 43-character Base58
    /// segment can collide with the Base64URL alphabet and is then
    /// read as Base64URL; callers that know the encoding should use
    /// [`parse_with_encoding`](Self::parse_with_encoding).
    pub fn parse(identifier: &str) -> Result<Self> {
        Self::parse_with_encoding(identifier, None)
    }

    /// Parse the compact string form with a known digest encoding.
    pub fn parse_with_encoding(
        identifier: &str,
        encoding: Option<DigestEncoding>,
    ) -> Result<Self> {
        let segments: Vec<&str> = identifier.split(':').collect();
        if segments.len() < 4 {
            return Err(SigilError::IdentifierMalformed(format!(
                "expected at least 4 ':'-separated segments, got {}",
                segments.len()
            )));
        }
        if segments[0] != "did" {
            return Err(SigilError::IdentifierMalformed(format!(
                "identifier must start with 'did:', got '{}:'",
                segments[0]
            )));
        }

        let method = segments[1];
        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(SigilError::IdentifierMalformed(format!(
                "invalid method segment '{method}'"
            )));
        }

        let resource_type = segments[2].parse::<ResourceType>().map_err(|_| {
            SigilError::IdentifierMalformed(format!("unknown resource type '{}'", segments[2]))
        })?;

        let encoded = segments[3];
        let (encoding, digest) = match encoding {
            Some(encoding) => {
                let bytes = encoding.decode(encoded)?;
                let digest: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                    SigilError::IdentifierMalformed(format!(
                        "decoded digest is {} bytes, expected 32",
                        b.len()
                    ))
                })?;
                (encoding, digest)
            }
            None => DigestEncoding::detect_digest(encoded)?,
        };

        let owner_tag = match segments.len() {
            4 => None,
            5 => {
                let tag = segments[4];
                if tag.len() != OWNER_TAG_LEN
                    || !tag.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
                {
                    return Err(SigilError::IdentifierMalformed(format!(
                        "owner tag '{tag}' is not {OWNER_TAG_LEN} lowercase hex digits"
                    )));
                }
                Some(tag.to_string())
            }
            n => {
                return Err(SigilError::IdentifierMalformed(format!(
                    "too many segments: {n}"
                )))
            }
        };

        Ok(Self {
            method: method.to_string(),
            resource_type,
            digest,
            owner_tag,
            encoding,
        })
    }

    /// The encoded digest segment of the compact form.
    pub fn encoded_digest(&self) -> String {
        self.encoding.encode(&self.digest)
    }

    /// Re-encode this identifier under a different digest encoding.
    ///
    /// The underlying digest bytes are unchanged, so both forms resolve
    /// to the same resource.
    pub fn with_encoding(mut self, encoding: DigestEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "did:{}:{}:{}",
            self.method,
            self.resource_type,
            self.encoded_digest()
        )?;
        if let Some(ref tag) = self.owner_tag {
            write!(f, ":{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for AssetId {
    type Err = SigilError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The 8-hex-digit owner tag for an owner string.
pub fn owner_tag(owner: &str) -> String {
    hex::encode(sha256(owner.as_bytes()))[..OWNER_TAG_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::content_digest;
    use serde_json::json;

    fn text_attributes(content: &[u8]) -> Map<String, Value> {
        json!({
            "content_hash": content_digest(content),
            "mime_type": "text/plain",
            "charset": "utf-8"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_derive_is_deterministic() {
        let attrs = text_attributes(b"hello world");
        let a = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs, None,
            DigestEncoding::Base64Url).unwrap();
        let b = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs, None,
            DigestEncoding::Base64Url).unwrap();
        assert_eq!(a.to_string(), b.to_string());
        assert!(a.to_string().starts_with("did:asset:text:"));
    }

    #[test]
    fn test_different_content_different_id() {
        let a = AssetId::derive(DEFAULT_METHOD, ResourceType::Text,
            &text_attributes(b"one"), None, DigestEncoding::Hex).unwrap();
        let b = AssetId::derive(DEFAULT_METHOD, ResourceType::Text,
            &text_attributes(b"two"), None, DigestEncoding::Hex).unwrap();
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_compact_form_roundtrips() {
        let attrs = text_attributes(b"roundtrip subject");
        for encoding in [
            DigestEncoding::Hex,
            DigestEncoding::Base58,
            DigestEncoding::Base64Url,
        ] {
            let id = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs,
                Some("alice"), encoding).unwrap();
            let parsed = AssetId::parse_with_encoding(&id.to_string(), Some(encoding)).unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_detection_roundtrips_hex_and_base64url() {
        // detection is exact for these two; base58 is covered by the
        // explicit-encoding path above
        let attrs = text_attributes(b"roundtrip subject");
        for encoding in [DigestEncoding::Hex, DigestEncoding::Base64Url] {
            let id = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs,
                None, encoding).unwrap();
            assert_eq!(AssetId::parse(&id.to_string()).unwrap(), id);
        }
    }

    #[test]
    fn test_owner_tag_recoverable() {
        let attrs = text_attributes(b"owned");
        let id = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs,
            Some("alice"), DigestEncoding::Base64Url).unwrap();
        let parsed = AssetId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed.owner_tag.as_deref(), Some(owner_tag("alice").as_str()));
    }

    #[test]
    fn test_owner_tag_is_hash_prefix() {
        let tag = owner_tag("alice");
        assert_eq!(tag.len(), 8);
        assert!(hex::encode(sha256(b"alice")).starts_with(&tag));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "did:asset:text",                       // too few segments
            "urn:asset:text:abcd",                  // wrong prefix
            "did:asset:hologram:abcd",              // unknown type
            "did:as set:text:abcd",                 // bad method
            "did:asset:text:zz!!",                  // no alphabet matches
            "did:asset:text:abcd",                  // digest too short
        ] {
            assert!(
                matches!(AssetId::parse(bad), Err(SigilError::IdentifierMalformed(_))),
                "expected malformed: {bad}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_owner_tag() {
        let attrs = text_attributes(b"x");
        let id = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs, None,
            DigestEncoding::Hex).unwrap();
        let with_bad_tag = format!("{id}:nothex!!");
        assert!(AssetId::parse(&with_bad_tag).is_err());
    }

    #[test]
    fn test_external_bridge_is_stable() {
        let a = AssetId::from_external("10.5281/zenodo.123", "doi",
            ResourceType::Dataset, None, DigestEncoding::Base58);
        let b = AssetId::from_external("10.5281/zenodo.123", "doi",
            ResourceType::Dataset, None, DigestEncoding::Base58);
        assert_eq!(a, b);

        let other = AssetId::from_external("10.5281/zenodo.123", "ark",
            ResourceType::Dataset, None, DigestEncoding::Base58);
        assert_ne!(a.digest, other.digest);
    }

    #[test]
    fn test_with_encoding_preserves_digest() {
        let attrs = text_attributes(b"re-encode");
        let id = AssetId::derive(DEFAULT_METHOD, ResourceType::Text, &attrs, None,
            DigestEncoding::Hex).unwrap();
        let re = id.clone().with_encoding(DigestEncoding::Base64Url);
        assert_eq!(AssetId::parse(&re.to_string()).unwrap().digest, id.digest);
    }
}
