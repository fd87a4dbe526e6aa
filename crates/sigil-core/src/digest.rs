//! SHA-256 digests and the digest encodings used inside identifiers
//!
//! All identifier digests are SHA-256 over exact bytes. The encoded form
//! is one of lowercase hex, Base58 (Bitcoin alphabet), or Base64URL
//! without padding; every encoding is an exact round-trip inverse on any
//! byte sequence.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SigilError};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// SHA-256 over exact bytes.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// SHA-256 as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

/// Encoding applied to digest bytes inside an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    /// Lowercase hexadecimal
    Hex,
    /// Base58 with the Bitcoin alphabet
    Base58,
    /// Base64URL without padding
    #[serde(rename = "base64url")]
    Base64Url,
}

impl DigestEncoding {
    /// Encode raw bytes under this encoding.
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            DigestEncoding::Hex => hex::encode(bytes),
            DigestEncoding::Base58 => bs58::encode(bytes).into_string(),
            DigestEncoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Decode a string produced by [`encode`](Self::encode) back to bytes.
    pub fn decode(&self, encoded: &str) -> Result<Vec<u8>> {
        match self {
            DigestEncoding::Hex => hex::decode(encoded)
                .map_err(|e| SigilError::IdentifierMalformed(format!("invalid hex: {e}"))),
            DigestEncoding::Base58 => bs58::decode(encoded)
                .into_vec()
                .map_err(|e| SigilError::IdentifierMalformed(format!("invalid base58: {e}"))),
            DigestEncoding::Base64Url => URL_SAFE_NO_PAD
                .decode(encoded)
                .map_err(|e| SigilError::IdentifierMalformed(format!("invalid base64url: {e}"))),
        }
    }

    /// Detect the encoding of an encoded 256-bit digest and decode it.
    ///
    /// Detection is by alphabet, length, and decode validation: 64
    /// lowercase hex digits are hex; a 44-character Base58 string is
    /// unambiguous (Base64URL would yield 33 bytes); at 43 characters
    /// the Base58 and Base64URL alphabets overlap, and a string valid
    /// under both is read as Base64URL. Callers that encoded with
    /// Base58 and need certainty at 43 characters should carry the
    /// encoding out of band (see `AssetId::parse_with_encoding`).
    pub fn detect_digest(encoded: &str) -> Result<(Self, [u8; 32])> {
        if encoded.len() == 64
            && encoded
                .bytes()
                .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
        {
            if let Some(digest) = Self::Hex.decode_exact(encoded) {
                return Ok((DigestEncoding::Hex, digest));
            }
        }
        // strict Base64URL decoding rejects non-canonical trailing
        // bits, so most Base58 strings fall through to the next branch
        if let Some(digest) = Self::Base64Url.decode_exact(encoded) {
            return Ok((DigestEncoding::Base64Url, digest));
        }
        if encoded.chars().all(|c| BASE58_ALPHABET.contains(c)) {
            if let Some(digest) = Self::Base58.decode_exact(encoded) {
                return Ok((DigestEncoding::Base58, digest));
            }
        }
        Err(SigilError::IdentifierMalformed(format!(
            "encoded digest '{encoded}' decodes under no known encoding"
        )))
    }

    /// Decode and require exactly 32 digest bytes.
    fn decode_exact(&self, encoded: &str) -> Option<[u8; 32]> {
        self.decode(encoded).ok()?.try_into().ok()
    }
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DigestEncoding::Hex => "hex",
            DigestEncoding::Base58 => "base58",
            DigestEncoding::Base64Url => "base64url",
        };
        f.write_str(s)
    }
}

impl FromStr for DigestEncoding {
    type Err = SigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hex" => Ok(DigestEncoding::Hex),
            "base58" => Ok(DigestEncoding::Base58),
            "base64url" | "base64url-nopad" => Ok(DigestEncoding::Base64Url),
            other => Err(SigilError::UnsupportedEncoding(other.to_string())),
        }
    }
}

impl Default for DigestEncoding {
    fn default() -> Self {
        DigestEncoding::Base64Url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_encodings_roundtrip() {
        let digest = sha256(b"round trip subject");
        for enc in [
            DigestEncoding::Hex,
            DigestEncoding::Base58,
            DigestEncoding::Base64Url,
        ] {
            let encoded = enc.encode(&digest);
            assert_eq!(enc.decode(&encoded).unwrap(), digest.to_vec());
        }
    }

    #[test]
    fn test_base64url_has_no_padding() {
        let digest = sha256(b"padding check");
        let encoded = DigestEncoding::Base64Url.encode(&digest);
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_detect_recovers_digest_bytes() {
        let digest = sha256(b"detection subject");
        for encoding in [DigestEncoding::Hex, DigestEncoding::Base64Url] {
            let (_, decoded) =
                DigestEncoding::detect_digest(&encoding.encode(&digest)).unwrap();
            assert_eq!(decoded, digest, "encoding {encoding}");
        }

        // a digest this large always encodes to 44 base58 characters,
        // which no other encoding of 32 bytes can produce
        let high = [0xFFu8; 32];
        let encoded = DigestEncoding::Base58.encode(&high);
        assert_eq!(encoded.len(), 44);
        let (enc, decoded) = DigestEncoding::detect_digest(&encoded).unwrap();
        assert_eq!(enc, DigestEncoding::Base58);
        assert_eq!(decoded, high);
    }

    #[test]
    fn test_detect_hex_and_base64url_exactly() {
        // these two never overlap: hex is 64 chars, base64url is 43
        let digest = sha256(b"detection subject");
        let (enc, _) =
            DigestEncoding::detect_digest(&DigestEncoding::Hex.encode(&digest)).unwrap();
        assert_eq!(enc, DigestEncoding::Hex);
        let (enc, _) =
            DigestEncoding::detect_digest(&DigestEncoding::Base64Url.encode(&digest)).unwrap();
        assert_eq!(enc, DigestEncoding::Base64Url);
    }

    #[test]
    fn test_detect_rejects_foreign_characters() {
        assert!(DigestEncoding::detect_digest("not/an/encoding!").is_err());
        assert!(DigestEncoding::detect_digest("").is_err());
        assert!(DigestEncoding::detect_digest("abcd").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "base64url-nopad".parse::<DigestEncoding>().unwrap(),
            DigestEncoding::Base64Url
        );
        assert!(matches!(
            "base32".parse::<DigestEncoding>(),
            Err(SigilError::UnsupportedEncoding(_))
        ));
    }
}
