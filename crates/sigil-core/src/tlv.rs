//! TLV binary framing
//!
//! Fixed type-length-value layout: a 1-byte type tag, a big-endian
//! 4-byte length, then the value bytes. Containers nest TLV frames.
//! Decoding rejects any length that would run off the end of the input.

use serde_json::{Map, Number, Value};

use crate::error::{Result, SigilError};

/// Type tags for TLV frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TlvType {
    /// Empty value
    Null = 0x00,
    /// Single byte, 0 or 1
    Boolean = 0x01,
    /// Big-endian, leading-zero-trimmed (empty for zero)
    Uint = 0x02,
    /// Big-endian 8-byte two's complement
    Int = 0x03,
    /// 8-byte IEEE-754 big-endian
    Float = 0x04,
    /// UTF-8 bytes
    String = 0x05,
    /// Raw bytes
    Bytes = 0x06,
    /// Concatenated TLV-encoded elements
    Array = 0x07,
    /// Concatenated (key, value) TLV pairs with STRING keys
    Map = 0x08,
}

impl TlvType {
    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0x00 => Ok(TlvType::Null),
            0x01 => Ok(TlvType::Boolean),
            0x02 => Ok(TlvType::Uint),
            0x03 => Ok(TlvType::Int),
            0x04 => Ok(TlvType::Float),
            0x05 => Ok(TlvType::String),
            0x06 => Ok(TlvType::Bytes),
            0x07 => Ok(TlvType::Array),
            0x08 => Ok(TlvType::Map),
            other => Err(SigilError::InvalidTlv(format!("unknown type tag {other:#04x}"))),
        }
    }
}

/// Encode a JSON value as a TLV frame.
///
/// Type selection for numbers: UINT for non-negative integers, INT for
/// negative integers, FLOAT for non-integer numerics.
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_frame(value, &mut out);
    out
}

/// Encode raw bytes as a BYTES frame.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    write_header(TlvType::Bytes, bytes.len(), &mut out);
    out.extend_from_slice(bytes);
    out
}

/// Decode one TLV frame into a JSON value.
///
/// The input must contain exactly one frame; trailing bytes are
/// rejected. BYTES frames surface as arrays of numbers.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor { bytes, pos: 0 };
    let value = cursor.read_frame()?;
    if cursor.pos != bytes.len() {
        return Err(SigilError::InvalidTlv(format!(
            "{} trailing bytes after frame",
            bytes.len() - cursor.pos
        )));
    }
    Ok(value)
}

fn write_header(tlv_type: TlvType, len: usize, out: &mut Vec<u8>) {
    out.push(tlv_type as u8);
    out.extend_from_slice(&(len as u32).to_be_bytes());
}

fn write_frame(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => write_header(TlvType::Null, 0, out),
        Value::Bool(b) => {
            write_header(TlvType::Boolean, 1, out);
            out.push(u8::from(*b));
        }
        Value::Number(n) => write_number(n, out),
        Value::String(s) => {
            write_header(TlvType::String, s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
        Value::Array(items) => {
            let mut body = Vec::new();
            for item in items {
                write_frame(item, &mut body);
            }
            write_header(TlvType::Array, body.len(), out);
            out.extend_from_slice(&body);
        }
        Value::Object(map) => {
            let mut body = Vec::new();
            for (key, item) in map {
                write_frame(&Value::String(key.clone()), &mut body);
                write_frame(item, &mut body);
            }
            write_header(TlvType::Map, body.len(), out);
            out.extend_from_slice(&body);
        }
    }
}

fn write_number(n: &Number, out: &mut Vec<u8>) {
    if let Some(u) = n.as_u64() {
        // trim leading zero bytes; zero encodes as the empty value
        let be = u.to_be_bytes();
        let start = be.iter().position(|&b| b != 0).unwrap_or(be.len());
        write_header(TlvType::Uint, be.len() - start, out);
        out.extend_from_slice(&be[start..]);
    } else if let Some(i) = n.as_i64() {
        write_header(TlvType::Int, 8, out);
        out.extend_from_slice(&i.to_be_bytes());
    } else {
        let f = n.as_f64().unwrap_or(f64::NAN);
        write_header(TlvType::Float, 8, out);
        out.extend_from_slice(&f.to_be_bytes());
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(SigilError::InvalidTlv(format!(
                "length {n} runs off the end of the input at offset {}",
                self.pos
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_frame(&mut self) -> Result<Value> {
        let tag = self.take(1)?[0];
        let tlv_type = TlvType::from_tag(tag)?;
        let len_bytes: [u8; 4] = self.take(4)?.try_into().expect("4-byte slice");
        let len = u32::from_be_bytes(len_bytes) as usize;
        let body = self.take(len)?.to_vec();

        match tlv_type {
            TlvType::Null => {
                if !body.is_empty() {
                    return Err(SigilError::InvalidTlv("NULL with non-empty body".into()));
                }
                Ok(Value::Null)
            }
            TlvType::Boolean => match body.as_slice() {
                [0] => Ok(Value::Bool(false)),
                [1] => Ok(Value::Bool(true)),
                _ => Err(SigilError::InvalidTlv("BOOLEAN must be one byte of 0 or 1".into())),
            },
            TlvType::Uint => {
                if body.len() > 8 {
                    return Err(SigilError::InvalidTlv("UINT wider than 8 bytes".into()));
                }
                let mut be = [0u8; 8];
                be[8 - body.len()..].copy_from_slice(&body);
                Ok(Value::Number(u64::from_be_bytes(be).into()))
            }
            TlvType::Int => {
                let be: [u8; 8] = body
                    .as_slice()
                    .try_into()
                    .map_err(|_| SigilError::InvalidTlv("INT must be exactly 8 bytes".into()))?;
                Ok(Value::Number(i64::from_be_bytes(be).into()))
            }
            TlvType::Float => {
                let be: [u8; 8] = body
                    .as_slice()
                    .try_into()
                    .map_err(|_| SigilError::InvalidTlv("FLOAT must be exactly 8 bytes".into()))?;
                let f = f64::from_be_bytes(be);
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| SigilError::InvalidTlv("FLOAT is not a finite number".into()))
            }
            TlvType::String => String::from_utf8(body)
                .map(Value::String)
                .map_err(|e| SigilError::InvalidTlv(format!("STRING is not UTF-8: {e}"))),
            TlvType::Bytes => Ok(Value::Array(
                body.iter().map(|&b| Value::Number(b.into())).collect(),
            )),
            TlvType::Array => {
                let mut inner = Cursor { bytes: &body, pos: 0 };
                let mut items = Vec::new();
                while inner.pos < body.len() {
                    items.push(inner.read_frame()?);
                }
                Ok(Value::Array(items))
            }
            TlvType::Map => {
                let mut inner = Cursor { bytes: &body, pos: 0 };
                let mut map = Map::new();
                while inner.pos < body.len() {
                    let key = match inner.read_frame()? {
                        Value::String(s) => s,
                        other => {
                            return Err(SigilError::InvalidTlv(format!(
                                "MAP key must be a STRING, got {other}"
                            )))
                        }
                    };
                    let value = inner.read_frame()?;
                    map.insert(key, value);
                }
                Ok(Value::Object(map))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_roundtrips() {
        for value in [
            Value::Null,
            json!(true),
            json!(false),
            json!(0),
            json!(42),
            json!(u64::MAX),
            json!(-17),
            json!(2.5),
            json!("hello"),
            json!(""),
        ] {
            let encoded = encode_value(&value);
            assert_eq!(decode_value(&encoded).unwrap(), value, "value {value}");
        }
    }

    #[test]
    fn test_zero_uint_has_empty_body() {
        let encoded = encode_value(&json!(0));
        assert_eq!(encoded, vec![0x02, 0, 0, 0, 0]);
    }

    #[test]
    fn test_int_is_full_width() {
        let encoded = encode_value(&json!(-1));
        assert_eq!(encoded.len(), 1 + 4 + 8);
        assert_eq!(&encoded[5..], &[0xFF; 8]);
    }

    #[test]
    fn test_container_roundtrip() {
        let value = json!({
            "name": "model-a",
            "tags": ["vision", "generative"],
            "depth": 12,
            "nested": {"score": -3, "ratio": 0.5, "flag": true, "none": null}
        });
        let encoded = encode_value(&value);
        assert_eq!(decode_value(&encoded).unwrap(), value);
    }

    #[test]
    fn test_truncated_length_rejected() {
        let mut encoded = encode_value(&json!("hello"));
        // claim more bytes than are present
        encoded[4] = 0xFF;
        assert!(matches!(
            decode_value(&encoded),
            Err(SigilError::InvalidTlv(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut encoded = encode_value(&json!(true));
        encoded.push(0x00);
        assert!(decode_value(&encoded).is_err());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(decode_value(&[0x7F, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_bytes_decode_as_number_array() {
        let encoded = encode_bytes(&[1, 2, 255]);
        assert_eq!(decode_value(&encoded).unwrap(), json!([1, 2, 255]));
    }

    #[test]
    fn test_map_key_must_be_string() {
        // MAP whose first frame is a UINT key
        let mut body = Vec::new();
        body.extend_from_slice(&encode_value(&json!(1)));
        body.extend_from_slice(&encode_value(&json!("v")));
        let mut encoded = vec![0x08];
        encoded.extend_from_slice(&(body.len() as u32).to_be_bytes());
        encoded.extend_from_slice(&body);
        assert!(decode_value(&encoded).is_err());
    }
}
