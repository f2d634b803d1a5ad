//! Compact text serialization.
//!
//! Emits members in insertion order with no insignificant whitespace.
//! Floats always carry a fraction or an exponent, so a float re-parsed
//! under the int-preferring number kind stays a float.

use super::types::{Document, Number};

/// Serialize a document to compact text.
pub fn to_text(doc: &Document) -> String {
    let mut output = String::new();
    serialize_value(doc, &mut output);
    output
}

/// Serialize a document to compact text bytes.
pub fn to_bytes(doc: &Document) -> Vec<u8> {
    to_text(doc).into_bytes()
}

fn serialize_value(doc: &Document, output: &mut String) {
    match doc {
        Document::Null => output.push_str("null"),
        Document::Bool(true) => output.push_str("true"),
        Document::Bool(false) => output.push_str("false"),
        Document::Number(n) => serialize_number(n, output),
        Document::String(s) => serialize_string(s, output),
        Document::Array(items) => {
            output.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                serialize_value(item, output);
            }
            output.push(']');
        }
        Document::Object(entries) => {
            output.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                serialize_string(key, output);
                output.push(':');
                serialize_value(value, output);
            }
            output.push('}');
        }
    }
}

fn serialize_number(n: &Number, output: &mut String) {
    output.push_str(&n.to_string());
}

/// Serialize a string with JSON escaping.
pub fn serialize_string(s: &str, output: &mut String) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\x08' => output.push_str("\\b"),
            '\x0C' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c < '\x20' => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
    output.push('"');
}
