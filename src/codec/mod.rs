//! Codec capability.
//!
//! The harness never encodes anything itself: it drives a [`Codec`] that
//! converts documents among four representations and supplies the value
//! ordering oracle. A [`CodecFactory`] builds one codec per configuration,
//! so every conversion inside one validation shares the same options.
//!
//! # Architecture
//!
//! - [`Codec`] - conversions, comparator, normalization, pointer access
//! - [`Repr`] / [`ReprKind`] - tagged representations and generic conversion
//! - [`reference`] - the bundled implementation (text, CBOR, collation)
//! - [`cbor`] - compact binary form built on `ciborium`
//! - [`collate`] - order-preserving binary form and its comparator

pub mod cbor;
pub mod collate;
pub mod reference;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::document::{pointer, Document, JsonPointer, PointerError, TextError};

pub use reference::{ReferenceCodec, ReferenceCodecFactory};

/// Errors raised by codec operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Text could not be decoded.
    #[error("text: {0}")]
    Text(#[from] TextError),

    /// Compact binary could not be encoded or decoded.
    #[error("binary: {0}")]
    Binary(String),

    /// Collation bytes could not be encoded or decoded.
    #[error("collate: {0}")]
    Ordered(String),

    /// Pointer syntax or resolution failed.
    #[error("pointer: {0}")]
    Pointer(#[from] PointerError),

    /// The operation is not available under the current configuration.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// The four representation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReprKind {
    /// Textual form.
    Text,
    /// In-memory document tree.
    Value,
    /// Compact binary form.
    Binary,
    /// Order-preserving binary form.
    Ordered,
}

impl ReprKind {
    /// All kinds.
    pub const ALL: [ReprKind; 4] = [
        ReprKind::Text,
        ReprKind::Value,
        ReprKind::Binary,
        ReprKind::Ordered,
    ];

    /// Name used in chain names and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReprKind::Text => "json",
            ReprKind::Value => "value",
            ReprKind::Binary => "cbor",
            ReprKind::Ordered => "collate",
        }
    }

    /// Look up a kind by its command-line name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ReprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document in one of its representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Repr {
    /// Text bytes.
    Text(Vec<u8>),
    /// Document tree.
    Value(Document),
    /// Compact binary bytes.
    Binary(Vec<u8>),
    /// Collation bytes.
    Ordered(Vec<u8>),
}

impl Repr {
    /// Kind of this representation.
    pub fn kind(&self) -> ReprKind {
        match self {
            Repr::Text(_) => ReprKind::Text,
            Repr::Value(_) => ReprKind::Value,
            Repr::Binary(_) => ReprKind::Binary,
            Repr::Ordered(_) => ReprKind::Ordered,
        }
    }

    /// Raw bytes, or None for the value form.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Repr::Text(b) | Repr::Binary(b) | Repr::Ordered(b) => Some(b),
            Repr::Value(_) => None,
        }
    }

    /// Convert to another representation with one direct codec call.
    pub fn convert<C: Codec + ?Sized>(&self, codec: &C, target: ReprKind) -> CodecResult<Repr> {
        use ReprKind as K;
        let converted = match (self, target) {
            (Repr::Text(t), K::Value) => Repr::Value(codec.text_to_value(t)?),
            (Repr::Text(t), K::Binary) => Repr::Binary(codec.text_to_binary(t)?),
            (Repr::Text(t), K::Ordered) => Repr::Ordered(codec.text_to_ordered(t)?),
            (Repr::Value(v), K::Text) => Repr::Text(codec.value_to_text(v)?),
            (Repr::Value(v), K::Binary) => Repr::Binary(codec.value_to_binary(v)?),
            (Repr::Value(v), K::Ordered) => Repr::Ordered(codec.value_to_ordered(v)?),
            (Repr::Binary(b), K::Text) => Repr::Text(codec.binary_to_text(b)?),
            (Repr::Binary(b), K::Value) => Repr::Value(codec.binary_to_value(b)?),
            (Repr::Binary(b), K::Ordered) => Repr::Ordered(codec.binary_to_ordered(b)?),
            (Repr::Ordered(o), K::Text) => Repr::Text(codec.ordered_to_text(o)?),
            (Repr::Ordered(o), K::Value) => Repr::Value(codec.ordered_to_value(o)?),
            (Repr::Ordered(o), K::Binary) => Repr::Binary(codec.ordered_to_binary(o)?),
            (same, _) => same.clone(),
        };
        Ok(converted)
    }

    /// Decode to the value form.
    pub fn into_value<C: Codec + ?Sized>(self, codec: &C) -> CodecResult<Document> {
        match self {
            Repr::Value(v) => Ok(v),
            other => match other.convert(codec, ReprKind::Value)? {
                Repr::Value(v) => Ok(v),
                unexpected => Err(CodecError::Unsupported(format!(
                    "conversion to value produced {}",
                    unexpected.kind()
                ))),
            },
        }
    }
}

/// Conversions, ordering and pointer access for one configuration.
///
/// The six composite directions default to going through the value form;
/// implementations with a direct path override them.
pub trait Codec: Send + Sync {
    /// Configuration this codec was built with.
    fn config(&self) -> &Config;

    /// Decode text.
    fn text_to_value(&self, text: &[u8]) -> CodecResult<Document>;

    /// Encode text.
    fn value_to_text(&self, value: &Document) -> CodecResult<Vec<u8>>;

    /// Encode compact binary.
    fn value_to_binary(&self, value: &Document) -> CodecResult<Vec<u8>>;

    /// Decode compact binary.
    fn binary_to_value(&self, binary: &[u8]) -> CodecResult<Document>;

    /// Encode collation bytes.
    fn value_to_ordered(&self, value: &Document) -> CodecResult<Vec<u8>>;

    /// Decode collation bytes.
    fn ordered_to_value(&self, ordered: &[u8]) -> CodecResult<Document>;

    /// Total order over values; the collation form must reproduce it.
    fn compare(&self, a: &Document, b: &Document) -> Ordering;

    /// Collapse number-kind and key-order variance so structural equality
    /// is meaningful.
    fn normalize(&self, value: &Document) -> Document;

    /// Compact binary to collation bytes.
    fn binary_to_ordered(&self, binary: &[u8]) -> CodecResult<Vec<u8>> {
        self.value_to_ordered(&self.binary_to_value(binary)?)
    }

    /// Collation bytes to compact binary.
    fn ordered_to_binary(&self, ordered: &[u8]) -> CodecResult<Vec<u8>> {
        self.value_to_binary(&self.ordered_to_value(ordered)?)
    }

    /// Compact binary to text.
    fn binary_to_text(&self, binary: &[u8]) -> CodecResult<Vec<u8>> {
        self.value_to_text(&self.binary_to_value(binary)?)
    }

    /// Text to compact binary.
    fn text_to_binary(&self, text: &[u8]) -> CodecResult<Vec<u8>> {
        self.value_to_binary(&self.text_to_value(text)?)
    }

    /// Collation bytes to text.
    fn ordered_to_text(&self, ordered: &[u8]) -> CodecResult<Vec<u8>> {
        self.value_to_text(&self.ordered_to_value(ordered)?)
    }

    /// Text to collation bytes.
    fn text_to_ordered(&self, text: &[u8]) -> CodecResult<Vec<u8>> {
        self.value_to_ordered(&self.text_to_value(text)?)
    }

    /// Read the sub-value a pointer addresses.
    fn value_get(&self, doc: &Document, at: &JsonPointer) -> CodecResult<Document> {
        Ok(pointer::get(doc, at)?.clone())
    }

    /// Write a sub-value at a pointer.
    fn value_set(&self, doc: &mut Document, at: &JsonPointer, value: Document) -> CodecResult<()> {
        Ok(pointer::set(doc, at, value)?)
    }

    /// Read the compact binary encoding of the item a pointer addresses.
    fn binary_get(&self, binary: &[u8], at: &JsonPointer) -> CodecResult<Vec<u8>>;

    /// Write a compact binary item at a pointer, returning the new encoding.
    fn binary_set(&self, binary: &[u8], at: &JsonPointer, item: &[u8]) -> CodecResult<Vec<u8>>;
}

/// Builds a codec for a configuration.
pub trait CodecFactory: Send + Sync {
    /// Codec type produced.
    type Codec: Codec;

    /// Build a codec bound to `config`.
    fn build(&self, config: &Config) -> Self::Codec;
}
