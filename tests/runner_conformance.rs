//! Worker pool conformance tests.

use std::cmp::Ordering;

use reprcheck::codec::{Codec, CodecResult, ReferenceCodec};
use reprcheck::conformance::{DocumentHarness, DocumentOutcome, FailurePolicy};
use reprcheck::document::{Document, JsonPointer};
use reprcheck::generate::{repeat_input, RandomDocuments};
use reprcheck::{run_validation, CodecFactory, Config, ConfigOverrides, ReferenceCodecFactory, RunOptions};

/// Builds codecs whose compact binary decoder loses the last array element.
#[derive(Clone, Copy)]
struct LossyFactory;

struct LossyCodec(ReferenceCodec);

impl CodecFactory for LossyFactory {
    type Codec = LossyCodec;

    fn build(&self, config: &Config) -> LossyCodec {
        LossyCodec(ReferenceCodec::new(*config))
    }
}

impl Codec for LossyCodec {
    fn config(&self) -> &Config {
        self.0.config()
    }

    fn text_to_value(&self, text: &[u8]) -> CodecResult<Document> {
        self.0.text_to_value(text)
    }

    fn value_to_text(&self, value: &Document) -> CodecResult<Vec<u8>> {
        self.0.value_to_text(value)
    }

    fn value_to_binary(&self, value: &Document) -> CodecResult<Vec<u8>> {
        self.0.value_to_binary(value)
    }

    fn binary_to_value(&self, binary: &[u8]) -> CodecResult<Document> {
        let mut doc = self.0.binary_to_value(binary)?;
        if let Document::Array(items) = &mut doc {
            items.pop();
        }
        Ok(doc)
    }

    fn value_to_ordered(&self, value: &Document) -> CodecResult<Vec<u8>> {
        self.0.value_to_ordered(value)
    }

    fn ordered_to_value(&self, ordered: &[u8]) -> CodecResult<Document> {
        self.0.ordered_to_value(ordered)
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        self.0.compare(a, b)
    }

    fn normalize(&self, value: &Document) -> Document {
        self.0.normalize(value)
    }

    fn binary_get(&self, binary: &[u8], at: &JsonPointer) -> CodecResult<Vec<u8>> {
        self.0.binary_get(binary, at)
    }

    fn binary_set(&self, binary: &[u8], at: &JsonPointer, item: &[u8]) -> CodecResult<Vec<u8>> {
        self.0.binary_set(binary, at, item)
    }
}

// ============================================================================
// Generation faults
// ============================================================================

#[test]
fn scenario_malformed_document_is_skipped() {
    let inputs = vec![
        "[1,2]".to_string(),
        "{bad".to_string(),
        r#"{"x":{"y":1}}"#.to_string(),
        "3".to_string(),
    ];
    let options = RunOptions {
        seed: 21,
        workers: 2,
        queue: 1,
        ..RunOptions::default()
    };
    let summary = run_validation(&ReferenceCodecFactory, &options, inputs).unwrap();

    let stats = &summary.statistics;
    assert_eq!(stats.docs, 4);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.pass, 3);
    assert_eq!(stats.fail, 0);
    assert_eq!(stats.root_kinds.values().sum::<u64>(), 3);
    assert!(summary.failures.is_empty());
    assert!(summary.exit_ok());
}

#[test]
fn malformed_document_does_not_disturb_neighbours() {
    let harness = DocumentHarness::new(ReferenceCodecFactory, 1);
    let mut rng = reprcheck::config::seeded_rng(1);
    let result = harness.run_batch(&mut rng, &ConfigOverrides::default(), ["[1]", "[", "[1]"]);
    assert_eq!(result.passed, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.faults[0].input, "[");
}

// ============================================================================
// Pool behaviour
// ============================================================================

#[test]
fn random_documents_pass_on_many_workers() {
    let options = RunOptions {
        seed: 77,
        workers: 8,
        queue: 4,
        sort_batch: 100,
        ..RunOptions::default()
    };
    let summary = run_validation(&ReferenceCodecFactory, &options, RandomDocuments::new(77, 400)).unwrap();
    assert_eq!(summary.statistics.docs, 400);
    assert!(summary.exit_ok(), "{:?}", summary.failures.first().map(|b| b.to_report()));
    let dims: u64 = summary.statistics.number_kinds.values().sum();
    assert_eq!(dims, 400);
}

#[test]
fn failures_are_collected_without_stopping() {
    let options = RunOptions {
        workers: 3,
        ..RunOptions::default()
    };
    let summary = run_validation(&LossyFactory, &options, repeat_input("[1,2]", 12)).unwrap();
    assert_eq!(summary.statistics.docs, 12);
    assert_eq!(summary.statistics.fail, 12);
    assert!(!summary.aborted);
    assert!(!summary.exit_ok());
    assert!(summary.statistics.failures.contains_key("pointer-binary"));
    assert!(summary.failures.iter().all(|b| b.input == "[1,2]"));
}

#[test]
fn stop_on_first_aborts_the_run() {
    let options = RunOptions {
        workers: 1,
        queue: 1,
        policy: FailurePolicy::StopOnFirst,
        ..RunOptions::default()
    };
    let summary = run_validation(&LossyFactory, &options, repeat_input("[1,2]", 50)).unwrap();
    assert!(summary.aborted);
    assert_eq!(summary.statistics.docs, 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(!summary.exit_ok());
}

#[test]
fn single_document_harness_reports_every_failing_operation() {
    let harness = DocumentHarness::new(LossyFactory, 5);
    let report = harness.check(&Config::default(), "[1,2]");
    let DocumentOutcome::Fail(bundles) = &report.outcome else {
        panic!("expected failure, got {:?}", report.outcome);
    };
    let ops: Vec<&str> = bundles.iter().map(|b| b.operation.as_str()).collect();
    assert!(ops.contains(&"pointer-binary"));
    assert!(!ops.contains(&"pointer-value"));
    assert!(ops.contains(&"value2cbor2collate"));
    assert!(bundles.iter().all(|b| b.seed == 5));
}
