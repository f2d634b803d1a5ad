//! Pipeline validator conformance tests.
//!
//! Every chain in the catalogue must bring a document back to its normalized
//! reference under every configuration, and a misbehaving codec must be
//! reported per chain without taking the harness down.

use std::cmp::Ordering;

use reprcheck::codec::{Codec, CodecResult, ReferenceCodec};
use reprcheck::conformance::pipeline::run_chain;
use reprcheck::conformance::{
    validate, validate_with_policy, ChainVerdict, FailurePolicy, CHAIN_CATALOGUE,
};
use reprcheck::document::{Document, JsonPointer};
use reprcheck::{CodecFactory, Config, ContainerEncoding, NumberKind, ReferenceCodecFactory, WhitespaceClass};

/// A handful of configurations covering every option value.
fn configs() -> Vec<Config> {
    let mut out = Vec::new();
    for nk in NumberKind::ALL {
        for ct in ContainerEncoding::ALL {
            out.push(
                Config::default()
                    .with_number_kind(nk)
                    .with_container_encoding(ct)
                    .with_array_length_prefix(ct == ContainerEncoding::Streaming)
                    .with_property_count_prefix(nk == NumberKind::Float64)
                    .with_missing(nk != NumberKind::Float32)
                    .with_whitespace(if nk == NumberKind::Float32 {
                        WhitespaceClass::Ascii
                    } else {
                        WhitespaceClass::Unicode
                    }),
            );
        }
    }
    out
}

/// How [`Faulty`] misbehaves.
#[derive(Clone, Copy)]
enum Fault {
    /// Panic in every collation encode.
    PanicOnCollate,
    /// Drop the last element of arrays decoded from binary.
    DropLastItem,
}

/// The reference codec with one injected fault.
struct Faulty {
    inner: ReferenceCodec,
    fault: Fault,
}

impl Faulty {
    fn new(config: Config, fault: Fault) -> Self {
        Self {
            inner: ReferenceCodec::new(config),
            fault,
        }
    }
}

impl Codec for Faulty {
    fn config(&self) -> &Config {
        self.inner.config()
    }

    fn text_to_value(&self, text: &[u8]) -> CodecResult<Document> {
        self.inner.text_to_value(text)
    }

    fn value_to_text(&self, value: &Document) -> CodecResult<Vec<u8>> {
        self.inner.value_to_text(value)
    }

    fn value_to_binary(&self, value: &Document) -> CodecResult<Vec<u8>> {
        self.inner.value_to_binary(value)
    }

    fn binary_to_value(&self, binary: &[u8]) -> CodecResult<Document> {
        let mut doc = self.inner.binary_to_value(binary)?;
        if let (Fault::DropLastItem, Document::Array(items)) = (self.fault, &mut doc) {
            items.pop();
        }
        Ok(doc)
    }

    fn value_to_ordered(&self, value: &Document) -> CodecResult<Vec<u8>> {
        match self.fault {
            Fault::PanicOnCollate => panic!("collation exploded"),
            Fault::DropLastItem => self.inner.value_to_ordered(value),
        }
    }

    fn ordered_to_value(&self, ordered: &[u8]) -> CodecResult<Document> {
        self.inner.ordered_to_value(ordered)
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        self.inner.compare(a, b)
    }

    fn normalize(&self, value: &Document) -> Document {
        self.inner.normalize(value)
    }

    fn binary_get(&self, binary: &[u8], at: &JsonPointer) -> CodecResult<Vec<u8>> {
        self.inner.binary_get(binary, at)
    }

    fn binary_set(&self, binary: &[u8], at: &JsonPointer, item: &[u8]) -> CodecResult<Vec<u8>> {
        self.inner.binary_set(binary, at, item)
    }
}

// ============================================================================
// Round-trip closure
// ============================================================================

#[test]
fn scenario_object_with_array_and_null_passes_every_chain() {
    let raw = br#"{"a":[1,2,3],"b":null}"#;
    for config in configs() {
        let codec = ReferenceCodecFactory.build(&config);
        let outcome = validate(&codec, raw).unwrap();
        assert_eq!(outcome.results.len(), CHAIN_CATALOGUE.len());
        assert!(outcome.all_passed(), "{config}: {:?}", outcome.failures().collect::<Vec<_>>());
    }
}

#[test]
fn scenario_object_keeps_key_order_and_integers() {
    let raw = br#"{"a":[1,2,3],"b":null}"#;
    let codec = ReferenceCodecFactory.build(&Config::default().with_number_kind(NumberKind::IntPreferring));
    let expected = codec.text_to_value(raw).unwrap();
    for chain in &CHAIN_CATALOGUE {
        let terminal = run_chain(&codec, chain, raw, &expected).unwrap();
        assert_eq!(terminal, expected, "{}", chain.name);
        let keys: Vec<&str> = terminal.as_object().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"], "{}", chain.name);
    }
}

#[test]
fn scenario_empty_array_stays_empty_array() {
    for config in configs() {
        let codec = ReferenceCodecFactory.build(&config);
        let decoded = codec.text_to_value(b"[]").unwrap();
        for chain in &CHAIN_CATALOGUE {
            let terminal = run_chain(&codec, chain, b"[]", &decoded).unwrap();
            assert_eq!(terminal, Document::Array(vec![]), "{config} {}", chain.name);
        }
    }
}

#[test]
fn edge_documents_pass_every_chain() {
    let inputs: [&[u8]; 8] = [
        b"{}",
        b"[[[[[[[[[[[]]]]]]]]]]]",
        br#"{"":{"":[{}]}}"#,
        b"[9007199254740991,-9007199254740991,0.5,-1e-300]",
        br#""\u0000 \" \\ \ud83d\ude00 \u2028""#,
        br#"{"z":{"y":[null,true,false]},"a":-0.0}"#,
        b"3.4028234e38",
        br#""~[]{}falsenilNA~""#,
    ];
    for config in configs() {
        let codec = ReferenceCodecFactory.build(&config);
        for raw in inputs {
            let outcome = validate(&codec, raw).unwrap();
            assert!(
                outcome.all_passed(),
                "{config} {}: {:?}",
                String::from_utf8_lossy(raw),
                outcome.failures().collect::<Vec<_>>()
            );
        }
    }
}

// ============================================================================
// Fault containment
// ============================================================================

#[test]
fn codec_panic_becomes_chain_fault() {
    let codec = Faulty::new(Config::default(), Fault::PanicOnCollate);
    let outcome = validate(&codec, br#"{"k":[1]}"#).unwrap();

    assert_eq!(outcome.results.len(), CHAIN_CATALOGUE.len());
    let passed: Vec<&str> = outcome.results.iter().filter(|r| r.is_pass()).map(|r| r.chain).collect();
    assert_eq!(passed, vec!["json2value", "cbor2value2json", "cbor2json"]);
    for failure in outcome.failures() {
        match &failure.verdict {
            ChainVerdict::Fault { message } => assert!(message.contains("collation exploded"), "{message}"),
            other => panic!("{}: unexpected verdict {other:?}", failure.chain),
        }
    }
}

#[test]
fn lossy_codec_reports_mismatch() {
    let codec = Faulty::new(
        Config::default().with_number_kind(NumberKind::IntPreferring),
        Fault::DropLastItem,
    );
    let outcome = validate(&codec, b"[1,2]").unwrap();
    let failed: Vec<&str> = outcome.failures().map(|r| r.chain).collect();
    assert!(failed.contains(&"value2cbor2collate"));
    assert!(!failed.contains(&"value2collate"));
    assert!(!failed.contains(&"json2value"));

    let mismatch = outcome
        .results
        .iter()
        .find(|r| r.chain == "value2cbor2collate")
        .map(|r| r.verdict.clone());
    assert_eq!(
        mismatch,
        Some(ChainVerdict::Mismatch {
            expected: Document::Array(vec![Document::from(1i64), Document::from(2i64)]),
            actual: Document::Array(vec![Document::from(1i64)]),
        })
    );
}

#[test]
fn stop_on_first_truncates_results() {
    let codec = Faulty::new(Config::default(), Fault::DropLastItem);
    let outcome = validate_with_policy(&codec, b"[1,2]", FailurePolicy::StopOnFirst).unwrap();
    assert_eq!(outcome.failures().count(), 1);
    assert!(!outcome.results.last().unwrap().is_pass());
    assert!(outcome.results.len() < CHAIN_CATALOGUE.len());
}

#[test]
fn malformed_input_is_not_a_chain_failure() {
    let codec = ReferenceCodecFactory.build(&Config::default());
    let fault = validate(&codec, b"[1,2").unwrap_err();
    assert_eq!(fault.input, "[1,2");
}
