//! Canonical JSON serialization
//!
//! Two callers anywhere must derive the same identifier for the same
//! input, so every digest in this crate is computed over a canonical
//! byte form: object keys recursively sorted by UTF-8 byte order,
//! no insignificant whitespace.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialize a JSON value to its canonical string form.
///
/// Object keys are sorted lexicographically (byte order over UTF-8) at
/// every nesting level. Arrays keep their element order. The output
/// contains no insignificant whitespace.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Canonical serialization as bytes.
pub fn to_canonical_bytes(value: &Value) -> Vec<u8> {
    to_canonical_string(value).into_bytes()
}

/// SHA-256 over the canonical serialization, as raw bytes.
pub fn canonical_sha256(value: &Value) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(to_canonical_bytes(value));
    hasher.finalize().into()
}

/// SHA-256 over the canonical serialization, lowercase hex.
pub fn canonical_sha256_hex(value: &Value) -> String {
    hex::encode(canonical_sha256(value))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(key, out);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars already have a single serde_json rendering.
        other => out.push_str(&other.to_string()),
    }
}

fn write_json_string(s: &str, out: &mut String) {
    // serde_json's escaping rules, so scalar and key rendering agree
    out.push_str(&Value::String(s.to_owned()).to_string());
}
