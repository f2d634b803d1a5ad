//! Document value types.
//!
//! `Document` is the closed six-way union every component pattern-matches
//! over. Objects keep insertion order and unique keys; equality is
//! order-sensitive, so comparisons that should ignore key order go through
//! the codec's `normalize` first.
//!
//! # Requirements
//!
//! - Exactly six kinds: null, boolean, number, string, array, object
//! - Numbers carry their kind (integer or float) so configuration-driven
//!   number interpretation is observable
//! - Object keys are unique and keep insertion order

use std::fmt;

/// A numeric value, tagged with the kind the decoder produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    Int(i64),
    /// IEEE-754 double (float32 configurations widen into this).
    Float(f64),
}

impl Number {
    /// Numeric value as f64 (may lose precision for large integers).
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Integer value, if this number is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            Number::Float(_) => None,
        }
    }

    /// Returns true for the integer kind.
    pub fn is_int(&self) -> bool {
        matches!(self, Number::Int(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            // `{:?}` always keeps a fraction or exponent, so the kind survives
            // a text round trip.
            Number::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// A JSON-like document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    /// null literal
    #[default]
    Null,
    /// true / false
    Bool(bool),
    /// integer or float
    Number(Number),
    /// UTF-8 string
    String(String),
    /// ordered sequence
    Array(Vec<Document>),
    /// string-keyed mapping in insertion order, keys unique
    Object(Vec<(String, Document)>),
}

impl Document {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Returns true if this is a boolean value.
    pub fn is_bool(&self) -> bool {
        matches!(self, Document::Bool(_))
    }

    /// Returns true if this is a number value.
    pub fn is_number(&self) -> bool {
        matches!(self, Document::Number(_))
    }

    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, Document::String(_))
    }

    /// Returns true if this is an array value.
    pub fn is_array(&self) -> bool {
        matches!(self, Document::Array(_))
    }

    /// Returns true if this is an object value.
    pub fn is_object(&self) -> bool {
        matches!(self, Document::Object(_))
    }

    /// Returns true for arrays and objects.
    pub fn is_container(&self) -> bool {
        self.is_array() || self.is_object()
    }

    /// Returns the boolean value if this is a Bool, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a Number, None otherwise.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Document::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is an Array, None otherwise.
    pub fn as_array(&self) -> Option<&[Document]> {
        match self {
            Document::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the entries if this is an Object, None otherwise.
    pub fn as_object(&self) -> Option<&[(String, Document)]> {
        match self {
            Document::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get a value from an object by key.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Mutable lookup of an object member.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        match self {
            Document::Object(entries) => entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Get a value from an array by index.
    pub fn get_index(&self, index: usize) -> Option<&Document> {
        match self {
            Document::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    /// Insert or replace an object member, keeping the original position of
    /// an existing key. Returns false if this is not an object.
    pub fn insert(&mut self, key: impl Into<String>, value: Document) -> bool {
        let Document::Object(entries) = self else {
            return false;
        };
        let key = key.into();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key, value)),
        }
        true
    }

    /// Number of elements or members; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Document::Array(a) => a.len(),
            Document::Object(o) => o.len(),
            _ => 0,
        }
    }

    /// Returns true for scalars and empty containers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A container of the same kind and shape with every slot null, or None
    /// for scalars. Object members keep their keys and order.
    pub fn empty_like(&self) -> Option<Document> {
        match self {
            Document::Array(a) => Some(Document::Array(vec![Document::Null; a.len()])),
            Document::Object(o) => Some(Document::Object(
                o.iter().map(|(k, _)| (k.clone(), Document::Null)).collect(),
            )),
            _ => None,
        }
    }

    /// Returns the type name as a string for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    /// Root kind label used by the statistics sink.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(true) => "true",
            Document::Bool(false) => "false",
            Document::Number(_) => "num",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<i64> for Document {
    fn from(i: i64) -> Self {
        Document::Number(Number::Int(i))
    }
}

impl From<f64> for Document {
    fn from(f: f64) -> Self {
        Document::Number(Number::Float(f))
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<Vec<Document>> for Document {
    fn from(items: Vec<Document>) -> Self {
        Document::Array(items)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::serialize::to_text(self))
    }
}
