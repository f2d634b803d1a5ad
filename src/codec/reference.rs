//! Reference codec.
//!
//! Text via the crate's own parser and serializer, compact binary via
//! [`cbor`](super::cbor), collation via [`Collator`]. Pointer-addressed
//! binary access decodes, applies the pointer operation to the tree and
//! re-encodes; writes are only offered under streaming container encoding.

use std::cmp::Ordering;

use super::cbor;
use super::collate::Collator;
use super::{Codec, CodecError, CodecFactory, CodecResult};
use crate::config::{Config, ContainerEncoding};
use crate::document::{
    parse_with, pointer, to_bytes, Document, JsonPointer, Limits, Number, ParseOptions,
    MAX_SAFE_INT, MIN_SAFE_INT,
};

/// Codec bound to one configuration.
#[derive(Debug, Clone)]
pub struct ReferenceCodec {
    config: Config,
    options: ParseOptions,
    collator: Collator,
}

impl ReferenceCodec {
    /// Build a codec with default text limits.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            options: ParseOptions::from_config(&config),
            collator: Collator::new(&config),
        }
    }

    /// Replace the text decoding limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.options = self.options.with_limits(limits);
        self
    }
}

impl Codec for ReferenceCodec {
    fn config(&self) -> &Config {
        &self.config
    }

    fn text_to_value(&self, text: &[u8]) -> CodecResult<Document> {
        Ok(parse_with(text, self.options)?)
    }

    fn value_to_text(&self, value: &Document) -> CodecResult<Vec<u8>> {
        Ok(to_bytes(value))
    }

    fn value_to_binary(&self, value: &Document) -> CodecResult<Vec<u8>> {
        cbor::encode(value, self.config.container_encoding)
    }

    fn binary_to_value(&self, binary: &[u8]) -> CodecResult<Document> {
        cbor::decode(binary)
    }

    fn value_to_ordered(&self, value: &Document) -> CodecResult<Vec<u8>> {
        Ok(self.collator.encode(value))
    }

    fn ordered_to_value(&self, ordered: &[u8]) -> CodecResult<Document> {
        self.collator.decode(ordered)
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        self.collator.compare(a, b)
    }

    fn normalize(&self, value: &Document) -> Document {
        normalize(value)
    }

    fn binary_get(&self, binary: &[u8], at: &JsonPointer) -> CodecResult<Vec<u8>> {
        let doc = cbor::decode(binary)?;
        let item = pointer::get(&doc, at)?;
        cbor::encode(item, self.config.container_encoding)
    }

    fn binary_set(&self, binary: &[u8], at: &JsonPointer, item: &[u8]) -> CodecResult<Vec<u8>> {
        if self.config.container_encoding != ContainerEncoding::Streaming {
            return Err(CodecError::Unsupported(
                "pointer writes need streaming container encoding".to_string(),
            ));
        }
        let mut doc = cbor::decode(binary)?;
        pointer::set(&mut doc, at, cbor::decode(item)?)?;
        cbor::encode(&doc, ContainerEncoding::Streaming)
    }
}

/// Canonical comparison form.
///
/// Integral floats inside the exactly-representable range become integers,
/// object members are sorted by key. Structural equality of two normalized
/// documents then ignores number kind and member order.
pub fn normalize(value: &Document) -> Document {
    match value {
        Document::Number(Number::Float(f))
            if f.fract() == 0.0 && *f >= MIN_SAFE_INT as f64 && *f <= MAX_SAFE_INT as f64 =>
        {
            Document::Number(Number::Int(*f as i64))
        }
        Document::Array(items) => Document::Array(items.iter().map(normalize).collect()),
        Document::Object(entries) => {
            let mut out: Vec<(String, Document)> = entries
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect();
            out.sort_by(|a, b| a.0.cmp(&b.0));
            Document::Object(out)
        }
        other => other.clone(),
    }
}

/// Factory for [`ReferenceCodec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCodecFactory;

impl CodecFactory for ReferenceCodecFactory {
    type Codec = ReferenceCodec;

    fn build(&self, config: &Config) -> ReferenceCodec {
        ReferenceCodec::new(*config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NumberKind;

    fn codec(config: Config) -> ReferenceCodec {
        ReferenceCodecFactory.build(&config)
    }

    #[test]
    fn test_normalize_collapses_number_kind() {
        let float = Document::Array(vec![Document::from(3.0f64), Document::from(0.5f64)]);
        let int = Document::Array(vec![Document::from(3i64), Document::from(0.5f64)]);
        assert_eq!(normalize(&float), normalize(&int));
        assert_eq!(normalize(&Document::from(1e20f64)), Document::from(1e20f64));
    }

    #[test]
    fn test_normalize_sorts_members() {
        let a = Document::Object(vec![
            ("b".to_string(), Document::Null),
            ("a".to_string(), Document::from(1i64)),
        ]);
        let b = Document::Object(vec![
            ("a".to_string(), Document::from(1.0f64)),
            ("b".to_string(), Document::Null),
        ]);
        assert_eq!(normalize(&a), normalize(&b));
    }

    #[test]
    fn test_number_kind_flows_through_text() {
        let smart = codec(Config::default().with_number_kind(NumberKind::IntPreferring));
        let float = codec(Config::default().with_number_kind(NumberKind::Float64));
        assert_eq!(smart.text_to_value(b"7").unwrap(), Document::from(7i64));
        assert_eq!(float.text_to_value(b"7").unwrap(), Document::from(7.0f64));
    }

    #[test]
    fn test_binary_get() {
        let c = codec(Config::default());
        let doc = c.text_to_value(br#"{"a":{"b":[true]}}"#).unwrap();
        let bin = c.value_to_binary(&doc).unwrap();

        let item = c.binary_get(&bin, &JsonPointer::parse("/a/b/0").unwrap()).unwrap();
        assert_eq!(c.binary_to_value(&item).unwrap(), Document::Bool(true));
        assert!(c.binary_get(&bin, &JsonPointer::parse("/zz").unwrap()).is_err());
    }

    #[test]
    fn test_binary_set_requires_streaming() {
        let at = JsonPointer::parse("/k").unwrap();
        let item = cbor::encode(&Document::Null, ContainerEncoding::Streaming).unwrap();

        let prefixed = codec(Config::default().with_container_encoding(ContainerEncoding::LengthPrefixed));
        let empty = prefixed.value_to_binary(&Document::Object(vec![])).unwrap();
        assert!(matches!(
            prefixed.binary_set(&empty, &at, &item),
            Err(CodecError::Unsupported(_))
        ));

        let streaming = codec(Config::default().with_container_encoding(ContainerEncoding::Streaming));
        let empty = streaming.value_to_binary(&Document::Object(vec![])).unwrap();
        let out = streaming.binary_set(&empty, &at, &item).unwrap();
        assert!(cbor::is_streaming(&out));
        assert_eq!(
            streaming.binary_to_value(&out).unwrap(),
            Document::Object(vec![("k".to_string(), Document::Null)])
        );
    }

    #[test]
    fn test_compare_matches_ordered_bytes() {
        let c = codec(Config::default().with_number_kind(NumberKind::IntPreferring));
        let texts: [&[u8]; 5] = [b"10", b"2", b"-5", br#""abc""#, b"[null]"];
        for a in texts {
            for b in texts {
                let (va, vb) = (c.text_to_value(a).unwrap(), c.text_to_value(b).unwrap());
                let by_bytes = c.text_to_ordered(a).unwrap().cmp(&c.text_to_ordered(b).unwrap());
                assert_eq!(c.compare(&va, &vb), by_bytes);
            }
        }
    }
}
