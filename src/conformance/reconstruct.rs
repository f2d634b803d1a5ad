//! Pointer reconstruction engine.
//!
//! Rebuilds a document, or its compact binary encoding, purely through
//! pointer-addressed writes and checks the result against the source.
//!
//! # Algorithm
//!
//! 1. Enumerate every pointer of the source.
//! 2. Stable-sort ascending by depth.
//! 3. Drop terminal pointers (the root and `.../-` append slots); the root
//!    is seeded with an empty container of the source's root kind.
//! 4. Container pass: every pointer addressing a container gets an empty
//!    container of the same kind (arrays pre-sized with null slots).
//! 5. Value pass: every pointer addressing a scalar gets the scalar.
//!
//! A container must exist before anything below it is written, so the
//! order of [`plan`] is load-bearing: [`replay`] with any other order can
//! fail to resolve.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::codec::{Codec, CodecError, CodecFactory};
use crate::config::{Config, ContainerEncoding};
use crate::document::{list_pointers, Document, JsonPointer};

/// Errors raised during reconstruction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructError {
    /// A pointer could not be read or written.
    #[error("pointer {pointer}: {source}")]
    Resolve {
        /// The pointer being processed.
        pointer: String,
        /// Underlying codec error.
        #[source]
        source: CodecError,
    },

    /// The source could not be encoded or decoded.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// Reconstruction finished but differs from the source.
    #[error("reconstruction diverged: expected {expected}, got {actual}")]
    Diverged {
        /// Source document.
        expected: Document,
        /// Reconstructed document.
        actual: Document,
    },
}

impl ReconstructError {
    fn resolve(pointer: &JsonPointer, source: CodecError) -> Self {
        Self::Resolve {
            pointer: pointer.to_string(),
            source,
        }
    }

    /// The pointer involved, if any.
    pub fn pointer(&self) -> Option<&str> {
        match self {
            Self::Resolve { pointer, .. } => Some(pointer),
            _ => None,
        }
    }
}

/// Which representation a reconstruction ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructMode {
    /// In-memory document tree.
    Value,
    /// Compact binary encoding.
    Binary,
}

impl ReconstructMode {
    /// Operation name used in reports and statistics.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Value => "pointer-value",
            Self::Binary => "pointer-binary",
        }
    }
}

impl fmt::Display for ReconstructMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// Order pointers for writing: ascending depth, terminal pointers removed.
pub fn plan(mut pointers: Vec<JsonPointer>) -> Vec<JsonPointer> {
    pointers.sort_by_key(JsonPointer::depth);
    pointers.retain(|p| !p.is_terminal());
    pointers
}

/// Write order for a document.
pub fn write_order(doc: &Document) -> Vec<JsonPointer> {
    plan(list_pointers(doc))
}

/// Rebuild a document by replaying writes in the given order.
pub fn replay<C: Codec + ?Sized>(
    codec: &C,
    source: &Document,
    pointers: &[JsonPointer],
) -> Result<Document, ReconstructError> {
    let Some(mut dest) = source.empty_like() else {
        return Ok(source.clone());
    };

    for p in pointers {
        let item = codec.value_get(source, p).map_err(|e| ReconstructError::resolve(p, e))?;
        if let Some(empty) = item.empty_like() {
            codec
                .value_set(&mut dest, p, empty)
                .map_err(|e| ReconstructError::resolve(p, e))?;
        }
    }

    for p in pointers {
        let item = codec.value_get(source, p).map_err(|e| ReconstructError::resolve(p, e))?;
        if !item.is_container() {
            codec
                .value_set(&mut dest, p, item)
                .map_err(|e| ReconstructError::resolve(p, e))?;
        }
    }

    Ok(dest)
}

/// Rebuild a document through pointer writes.
pub fn reconstruct<C: Codec + ?Sized>(codec: &C, source: &Document) -> Result<Document, ReconstructError> {
    replay(codec, source, &write_order(source))
}

/// Rebuild a compact binary encoding by replaying writes in the given order.
///
/// The codec must support binary pointer writes, which for the reference
/// codec means streaming container encoding.
pub fn replay_binary<C: Codec + ?Sized>(
    codec: &C,
    source: &[u8],
    pointers: &[JsonPointer],
) -> Result<Vec<u8>, ReconstructError> {
    let root = codec.binary_to_value(source)?;
    let Some(empty_root) = root.empty_like() else {
        return Ok(source.to_vec());
    };
    let mut dest = codec.value_to_binary(&empty_root)?;

    for p in pointers {
        let item = codec.binary_get(source, p).map_err(|e| ReconstructError::resolve(p, e))?;
        let value = codec.binary_to_value(&item).map_err(|e| ReconstructError::resolve(p, e))?;
        if let Some(empty) = value.empty_like() {
            let encoded = codec.value_to_binary(&empty)?;
            dest = codec
                .binary_set(&dest, p, &encoded)
                .map_err(|e| ReconstructError::resolve(p, e))?;
            trace!(pointer = %p, bytes = %hex::encode(&dest), "container written");
        }
    }

    for p in pointers {
        let item = codec.binary_get(source, p).map_err(|e| ReconstructError::resolve(p, e))?;
        let value = codec.binary_to_value(&item).map_err(|e| ReconstructError::resolve(p, e))?;
        if !value.is_container() {
            dest = codec
                .binary_set(&dest, p, &item)
                .map_err(|e| ReconstructError::resolve(p, e))?;
            trace!(pointer = %p, bytes = %hex::encode(&dest), "value written");
        }
    }

    Ok(dest)
}

/// Rebuild a compact binary encoding through pointer writes.
pub fn reconstruct_binary<C: Codec + ?Sized>(codec: &C, source: &[u8]) -> Result<Vec<u8>, ReconstructError> {
    let root = codec.binary_to_value(source)?;
    replay_binary(codec, source, &write_order(&root))
}

// Deep equality, member order included: a rebuild that reorders members
// is a divergence even though it normalizes to the source.
fn check(source: &Document, rebuilt: Document) -> Result<(), ReconstructError> {
    if rebuilt == *source {
        Ok(())
    } else {
        Err(ReconstructError::Diverged {
            expected: source.clone(),
            actual: rebuilt,
        })
    }
}

/// Reconstruct a document and check it equals the source, member order
/// included.
pub fn verify_value<C: Codec + ?Sized>(codec: &C, source: &Document) -> Result<(), ReconstructError> {
    let rebuilt = reconstruct(codec, source)?;
    check(source, rebuilt)
}

/// Encode a document, reconstruct the encoding and check it decodes to the
/// source.
///
/// Binary pointer writes need self-delimiting containers, so the codec is
/// rebuilt from `config` with streaming container encoding forced.
pub fn verify_binary<F: CodecFactory + ?Sized>(
    factory: &F,
    config: &Config,
    source: &Document,
) -> Result<(), ReconstructError> {
    let streaming = config.with_container_encoding(ContainerEncoding::Streaming);
    let codec = factory.build(&streaming);

    let encoded = codec.value_to_binary(source)?;
    let rebuilt = reconstruct_binary(&codec, &encoded)?;
    let decoded = codec.binary_to_value(&rebuilt)?;
    check(source, decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ReferenceCodecFactory;
    use crate::config::NumberKind;

    fn codec() -> crate::codec::ReferenceCodec {
        ReferenceCodecFactory.build(&Config::default().with_number_kind(NumberKind::IntPreferring))
    }

    fn doc(text: &str) -> Document {
        codec().text_to_value(text.as_bytes()).unwrap()
    }

    fn texts(pointers: &[JsonPointer]) -> Vec<String> {
        pointers.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_plan_orders_by_depth_and_filters_terminals() {
        let order = write_order(&doc(r#"{"a":[1,[2]],"b":{"c":null}}"#));
        assert_eq!(
            texts(&order),
            vec!["/a", "/b", "/a/0", "/a/1", "/b/c", "/a/1/0"]
        );
    }

    #[test]
    fn test_reconstruct_keeps_member_order() {
        let source = doc(r#"{"z":1,"a":{"m":[true,"s"],"b":null}}"#);
        let rebuilt = reconstruct(&codec(), &source).unwrap();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_scalar_root_is_returned() {
        let source = doc("42");
        assert_eq!(reconstruct(&codec(), &source).unwrap(), source);
        let bytes = codec().value_to_binary(&source).unwrap();
        assert_eq!(reconstruct_binary(&codec(), &bytes).unwrap(), bytes);
    }

    #[test]
    fn test_binary_requires_streaming() {
        let prefixed = ReferenceCodecFactory
            .build(&Config::default().with_container_encoding(ContainerEncoding::LengthPrefixed));
        let bytes = prefixed.value_to_binary(&doc(r#"{"a":1}"#)).unwrap();
        let err = reconstruct_binary(&prefixed, &bytes).unwrap_err();
        assert_eq!(err.pointer(), Some("/a"));
    }

    #[test]
    fn test_verify_binary_forces_streaming() {
        let config = Config::default().with_container_encoding(ContainerEncoding::LengthPrefixed);
        let source = doc(r#"{"a":[1,{"b":[]}],"c":"d"}"#);
        verify_binary(&ReferenceCodecFactory, &config, &source).unwrap();
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ReconstructMode::Value.to_string(), "pointer-value");
        assert_eq!(ReconstructMode::Binary.operation(), "pointer-binary");
    }
}
