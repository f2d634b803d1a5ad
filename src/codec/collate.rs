//! Order-preserving binary form.
//!
//! Every item starts with a type tag whose numeric order is the type order
//! of the comparator, and every item is self-delimiting, so comparing two
//! encodings byte by byte gives the same answer as [`Collator::compare`]
//! on the decoded values.
//!
//! # Layout
//!
//! - numbers: tag, 8 order-preserving bytes of the f64 value, a sub-kind
//!   byte (float sorts before int at equal magnitude), and for integers 8
//!   order-preserving bytes of the i64
//! - strings: tag, bytes with 0x00 escaped as 0x00 0x01, then 0x00 0x00
//! - arrays: tag, optional length prefix, items, terminator
//! - objects: tag, optional count prefix, (key, value) pairs sorted by key,
//!   terminator

use std::cmp::Ordering;

use super::{CodecError, CodecResult};
use crate::config::Config;
use crate::document::{Document, Number};

/// Ends arrays and objects; sorts below every type tag.
pub const TERMINATOR: u8 = 0x00;
/// Missing value.
pub const MISSING: u8 = 0x01;
/// null
pub const NULL: u8 = 0x02;
/// false
pub const FALSE: u8 = 0x03;
/// true
pub const TRUE: u8 = 0x04;
/// number
pub const NUMBER: u8 = 0x05;
/// string
pub const STRING: u8 = 0x06;
/// length / count prefix marker
pub const LENGTH: u8 = 0x07;
/// array
pub const ARRAY: u8 = 0x08;
/// object
pub const OBJECT: u8 = 0x09;

/// Number sub-kind for floats.
pub const SUBKIND_FLOAT: u8 = 0x01;
/// Number sub-kind for integers.
pub const SUBKIND_INT: u8 = 0x02;

/// String standing in for a missing value when missing support is on.
pub const MISSING_LITERAL: &str = "~[]{}falsenilNA~";

/// Encoder, decoder and comparator for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Collator {
    array_length_prefix: bool,
    property_count_prefix: bool,
    support_missing: bool,
}

impl Collator {
    /// Collator honoring the ordering flags of a configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            array_length_prefix: config.array_length_prefix,
            property_count_prefix: config.property_count_prefix,
            support_missing: config.support_missing,
        }
    }

    fn is_missing(&self, doc: &Document) -> bool {
        self.support_missing && doc.as_str() == Some(MISSING_LITERAL)
    }

    fn tag(&self, doc: &Document) -> u8 {
        match doc {
            _ if self.is_missing(doc) => MISSING,
            Document::Null => NULL,
            Document::Bool(false) => FALSE,
            Document::Bool(true) => TRUE,
            Document::Number(_) => NUMBER,
            Document::String(_) => STRING,
            Document::Array(_) => ARRAY,
            Document::Object(_) => OBJECT,
        }
    }

    /// Encode a document.
    pub fn encode(&self, doc: &Document) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(doc, &mut out);
        out
    }

    fn encode_into(&self, doc: &Document, out: &mut Vec<u8>) {
        let tag = self.tag(doc);
        out.push(tag);
        if tag == MISSING {
            return;
        }
        match doc {
            Document::Null | Document::Bool(_) => {}
            Document::Number(n) => encode_number(n, out),
            Document::String(s) => encode_string_body(s, out),
            Document::Array(items) => {
                if self.array_length_prefix {
                    encode_length(items.len(), out);
                }
                for item in items {
                    self.encode_into(item, out);
                }
                out.push(TERMINATOR);
            }
            Document::Object(entries) => {
                if self.property_count_prefix {
                    encode_length(entries.len(), out);
                }
                for (key, value) in sorted_entries(entries) {
                    out.push(STRING);
                    encode_string_body(key, out);
                    self.encode_into(value, out);
                }
                out.push(TERMINATOR);
            }
        }
    }

    /// Decode a complete encoding.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Document> {
        let mut reader = Reader { bytes, pos: 0 };
        let doc = self.decode_item(&mut reader)?;
        if reader.pos != bytes.len() {
            return Err(reader.error("trailing bytes"));
        }
        Ok(doc)
    }

    fn decode_item(&self, r: &mut Reader<'_>) -> CodecResult<Document> {
        let tag = r.byte()?;
        let doc = match tag {
            MISSING if self.support_missing => Document::String(MISSING_LITERAL.to_string()),
            NULL => Document::Null,
            FALSE => Document::Bool(false),
            TRUE => Document::Bool(true),
            NUMBER => Document::Number(decode_number(r)?),
            STRING => Document::String(r.string()?),
            ARRAY => {
                let expected = if self.array_length_prefix {
                    Some(r.length()?)
                } else {
                    None
                };
                let mut items = Vec::new();
                while r.peek()? != TERMINATOR {
                    items.push(self.decode_item(r)?);
                }
                r.pos += 1;
                if expected.is_some_and(|n| n != items.len()) {
                    return Err(r.error("array length prefix mismatch"));
                }
                Document::Array(items)
            }
            OBJECT => {
                let expected = if self.property_count_prefix {
                    Some(r.length()?)
                } else {
                    None
                };
                let mut entries = Vec::new();
                while r.peek()? != TERMINATOR {
                    if r.byte()? != STRING {
                        return Err(r.error("object key is not a string"));
                    }
                    let key = r.string()?;
                    entries.push((key, self.decode_item(r)?));
                }
                r.pos += 1;
                if expected.is_some_and(|n| n != entries.len()) {
                    return Err(r.error("property count prefix mismatch"));
                }
                Document::Object(entries)
            }
            other => return Err(r.error(&format!("unknown tag {other:#04x}"))),
        };
        Ok(doc)
    }

    /// Total order reproduced byte for byte by [`Collator::encode`].
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let (ta, tb) = (self.tag(a), self.tag(b));
        if ta != tb || ta == MISSING {
            return ta.cmp(&tb);
        }
        match (a, b) {
            (Document::Number(x), Document::Number(y)) => compare_numbers(x, y),
            (Document::String(x), Document::String(y)) => x.as_bytes().cmp(y.as_bytes()),
            (Document::Array(xs), Document::Array(ys)) => {
                if self.array_length_prefix {
                    let by_len = xs.len().cmp(&ys.len());
                    if by_len != Ordering::Equal {
                        return by_len;
                    }
                }
                for (x, y) in xs.iter().zip(ys) {
                    let ord = self.compare(x, y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                xs.len().cmp(&ys.len())
            }
            (Document::Object(xs), Document::Object(ys)) => {
                if self.property_count_prefix {
                    let by_len = xs.len().cmp(&ys.len());
                    if by_len != Ordering::Equal {
                        return by_len;
                    }
                }
                let (xs, ys) = (sorted_entries(xs), sorted_entries(ys));
                for ((kx, vx), (ky, vy)) in xs.iter().zip(&ys) {
                    let ord = kx
                        .as_bytes()
                        .cmp(ky.as_bytes())
                        .then_with(|| self.compare(vx, vy));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                xs.len().cmp(&ys.len())
            }
            // same tag, so both are null or the same boolean
            _ => Ordering::Equal,
        }
    }
}

fn sorted_entries(entries: &[(String, Document)]) -> Vec<(&String, &Document)> {
    let mut sorted: Vec<(&String, &Document)> = entries.iter().map(|(k, v)| (k, v)).collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    sorted
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    let by_value = x.as_f64().total_cmp(&y.as_f64());
    let by_kind = || subkind(x).cmp(&subkind(y));
    let by_int = || match (x, y) {
        (Number::Int(a), Number::Int(b)) => a.cmp(b),
        _ => Ordering::Equal,
    };
    by_value.then_with(by_kind).then_with(by_int)
}

fn subkind(n: &Number) -> u8 {
    match n {
        Number::Float(_) => SUBKIND_FLOAT,
        Number::Int(_) => SUBKIND_INT,
    }
}

fn sortable_f64(f: f64) -> u64 {
    let bits = f.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

fn unsortable_f64(key: u64) -> f64 {
    if key >> 63 == 1 {
        f64::from_bits(key & !(1 << 63))
    } else {
        f64::from_bits(!key)
    }
}

fn encode_number(n: &Number, out: &mut Vec<u8>) {
    out.extend_from_slice(&sortable_f64(n.as_f64()).to_be_bytes());
    out.push(subkind(n));
    if let Number::Int(i) = n {
        out.extend_from_slice(&((*i as u64) ^ (1 << 63)).to_be_bytes());
    }
}

fn decode_number(r: &mut Reader<'_>) -> CodecResult<Number> {
    let value = unsortable_f64(r.u64()?);
    match r.byte()? {
        SUBKIND_FLOAT => Ok(Number::Float(value)),
        SUBKIND_INT => Ok(Number::Int((r.u64()? ^ (1 << 63)) as i64)),
        other => Err(r.error(&format!("unknown number sub-kind {other:#04x}"))),
    }
}

fn encode_string_body(s: &str, out: &mut Vec<u8>) {
    for &b in s.as_bytes() {
        out.push(b);
        if b == 0x00 {
            out.push(0x01);
        }
    }
    out.extend_from_slice(&[0x00, 0x00]);
}

fn encode_length(n: usize, out: &mut Vec<u8>) {
    out.push(LENGTH);
    out.extend_from_slice(&(n as u64).to_be_bytes());
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn error(&self, what: &str) -> CodecError {
        CodecError::Ordered(format!("{what} at byte {}", self.pos))
    }

    fn peek(&self) -> CodecResult<u8> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end"))
    }

    fn byte(&mut self) -> CodecResult<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Ok(b)
    }

    fn u64(&mut self) -> CodecResult<u64> {
        let end = self.pos + 8;
        let chunk: [u8; 8] = self
            .bytes
            .get(self.pos..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| self.error("unexpected end"))?;
        self.pos = end;
        Ok(u64::from_be_bytes(chunk))
    }

    fn length(&mut self) -> CodecResult<usize> {
        if self.byte()? != LENGTH {
            return Err(self.error("missing length prefix"));
        }
        usize::try_from(self.u64()?).map_err(|_| self.error("length overflow"))
    }

    fn string(&mut self) -> CodecResult<String> {
        let mut raw = Vec::new();
        loop {
            let b = self.byte()?;
            if b != 0x00 {
                raw.push(b);
                continue;
            }
            match self.byte()? {
                0x00 => break,
                0x01 => raw.push(0x00),
                _ => return Err(self.error("bad string escape")),
            }
        }
        String::from_utf8(raw).map_err(|_| self.error("string is not UTF-8"))
    }
}
