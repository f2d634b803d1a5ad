//! Compact binary form (CBOR).
//!
//! Encoding goes through serde so `ciborium` writes the wire format;
//! `streaming` containers are serialized without a length and come out
//! indefinite-length (break terminated). Decoding reads a generic
//! `ciborium::Value` and maps it back onto a [`Document`].

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::{CodecError, CodecResult};
use crate::config::ContainerEncoding;
use crate::document::{Document, Number};

/// First byte of an indefinite-length array.
pub const INDEFINITE_ARRAY: u8 = 0x9f;
/// First byte of an indefinite-length map.
pub const INDEFINITE_MAP: u8 = 0xbf;

/// Serde adapter writing a document with the chosen container framing.
struct Framed<'a> {
    doc: &'a Document,
    streaming: bool,
}

impl Serialize for Framed<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = |n: usize| if self.streaming { None } else { Some(n) };
        match self.doc {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Document::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Document::String(s) => serializer.serialize_str(s),
            Document::Array(items) => {
                let mut seq = serializer.serialize_seq(len(items.len()))?;
                for item in items {
                    seq.serialize_element(&Framed {
                        doc: item,
                        streaming: self.streaming,
                    })?;
                }
                seq.end()
            }
            Document::Object(entries) => {
                let mut map = serializer.serialize_map(len(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(
                        key,
                        &Framed {
                            doc: value,
                            streaming: self.streaming,
                        },
                    )?;
                }
                map.end()
            }
        }
    }
}

/// Encode a document.
pub fn encode(doc: &Document, encoding: ContainerEncoding) -> CodecResult<Vec<u8>> {
    let framed = Framed {
        doc,
        streaming: encoding == ContainerEncoding::Streaming,
    };
    let mut out = Vec::new();
    ciborium::into_writer(&framed, &mut out).map_err(|e| CodecError::Binary(e.to_string()))?;
    Ok(out)
}

/// Decode a single item; trailing bytes are an error.
pub fn decode(bytes: &[u8]) -> CodecResult<Document> {
    let mut reader = bytes;
    let value: ciborium::Value =
        ciborium::from_reader(&mut reader).map_err(|e| CodecError::Binary(e.to_string()))?;
    if !reader.is_empty() {
        return Err(CodecError::Binary(format!(
            "{} trailing bytes after item",
            reader.len()
        )));
    }
    from_cbor(value)
}

fn from_cbor(value: ciborium::Value) -> CodecResult<Document> {
    use ciborium::Value;

    let doc = match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(b),
        Value::Integer(i) => {
            let wide = i128::from(i);
            let narrow = i64::try_from(wide)
                .map_err(|_| CodecError::Binary(format!("integer {wide} exceeds i64")))?;
            Document::Number(Number::Int(narrow))
        }
        Value::Float(f) => Document::Number(Number::Float(f)),
        Value::Text(s) => Document::String(s),
        Value::Array(items) => Document::Array(
            items
                .into_iter()
                .map(from_cbor)
                .collect::<CodecResult<Vec<_>>>()?,
        ),
        Value::Map(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let Value::Text(key) = key else {
                    return Err(CodecError::Binary("map key is not text".to_string()));
                };
                out.push((key, from_cbor(value)?));
            }
            Document::Object(out)
        }
        other => {
            return Err(CodecError::Binary(format!(
                "unsupported item {other:?}"
            )))
        }
    };
    Ok(doc)
}

/// Returns true if the encoding's top-level container is indefinite-length.
pub fn is_streaming(bytes: &[u8]) -> bool {
    matches!(bytes.first(), Some(&INDEFINITE_ARRAY) | Some(&INDEFINITE_MAP))
}
