//! Per-document harness.
//!
//! Runs one document text under one configuration through every check the
//! crate has: value pointer reconstruction and binary pointer reconstruction
//! for container roots, then the full chain pipeline. Every failure becomes
//! a [`ReproBundle`].

use rand::Rng;
use tracing::{error, warn};

use super::pipeline::{self, ChainVerdict, FailurePolicy};
use super::reconstruct::{self, ReconstructError, ReconstructMode};
use super::repro::ReproBundle;
use crate::codec::{Codec, CodecFactory};
use crate::config::{self, Config, ConfigOverrides};
use crate::document::Document;
use crate::generate::GenerationFault;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// Every check passed.
    Pass,
    /// At least one check failed.
    Fail(Vec<ReproBundle>),
    /// The text did not decode; nothing was checked.
    Skipped(GenerationFault),
}

impl DocumentOutcome {
    /// Check if the document passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if the document failed.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Outcome of one document plus what the statistics sink needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    /// Configuration the document ran under.
    pub config: Config,
    /// Input size in bytes.
    pub bytes: usize,
    /// Root kind label of the normalized reference, if it decoded.
    pub root_kind: Option<&'static str>,
    /// Verdict.
    pub outcome: DocumentOutcome,
}

impl DocumentReport {
    /// Operation names of every failure.
    pub fn failed_operations(&self) -> Vec<&str> {
        match &self.outcome {
            DocumentOutcome::Fail(bundles) => bundles.iter().map(|b| b.operation.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Validates individual documents.
#[derive(Debug, Clone)]
pub struct DocumentHarness<F> {
    factory: F,
    seed: u64,
    policy: FailurePolicy,
}

impl<F: CodecFactory> DocumentHarness<F> {
    /// Create a harness. `seed` is only carried into repro bundles.
    pub fn new(factory: F, seed: u64) -> Self {
        Self {
            factory,
            seed,
            policy: FailurePolicy::Continue,
        }
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Validate one document under `config`.
    pub fn check(&self, config: &Config, text: &str) -> DocumentReport {
        let codec = self.factory.build(config);
        let mut report = DocumentReport {
            config: *config,
            bytes: text.len(),
            root_kind: None,
            outcome: DocumentOutcome::Pass,
        };

        let decoded = match codec.text_to_value(text.as_bytes()) {
            Ok(doc) => doc,
            Err(e) => {
                let fault = GenerationFault::new(text.as_bytes(), e.to_string());
                warn!(reason = fault.reason.as_str(), input = text, "skipping undecodable document");
                report.outcome = DocumentOutcome::Skipped(fault);
                return report;
            }
        };
        let reference = codec.normalize(&decoded);
        report.root_kind = Some(reference.kind_label());

        let mut failures = Vec::new();
        if decoded.is_container() {
            if let Err(e) = reconstruct::verify_value(&codec, &decoded) {
                failures.push(self.reconstruct_bundle(config, text, &reference, ReconstructMode::Value, &e));
            }
            if !self.should_stop(&failures) {
                if let Err(e) = reconstruct::verify_binary(&self.factory, config, &decoded) {
                    failures.push(self.reconstruct_bundle(config, text, &reference, ReconstructMode::Binary, &e));
                }
            }
        }

        if !self.should_stop(&failures) {
            match pipeline::validate_with_policy(&codec, text.as_bytes(), self.policy) {
                Ok(outcome) => {
                    for result in outcome.failures() {
                        let actual = match &result.verdict {
                            ChainVerdict::Mismatch { actual, .. } => actual.to_string(),
                            ChainVerdict::Fault { message } => message.clone(),
                            ChainVerdict::Pass => continue,
                        };
                        failures.push(ReproBundle::new(
                            self.seed,
                            *config,
                            result.chain,
                            text,
                            outcome.reference.to_string(),
                            actual,
                        ));
                    }
                }
                Err(fault) => {
                    report.outcome = DocumentOutcome::Skipped(fault);
                    return report;
                }
            }
        }

        if !failures.is_empty() {
            report.outcome = DocumentOutcome::Fail(failures);
        }
        report
    }

    /// Validate a batch, drawing a fresh configuration per document.
    pub fn run_batch<R, I, S>(&self, rng: &mut R, overrides: &ConfigOverrides, texts: I) -> BatchResult
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = BatchResult::new();
        for text in texts {
            let config = overrides.apply(config::sample(rng));
            let report = self.check(&config, text.as_ref());
            let stop = report.outcome.is_fail() && self.policy == FailurePolicy::StopOnFirst;
            results.record(report.outcome);
            if stop {
                break;
            }
        }
        results
    }

    fn should_stop(&self, failures: &[ReproBundle]) -> bool {
        self.policy == FailurePolicy::StopOnFirst && !failures.is_empty()
    }

    fn reconstruct_bundle(
        &self,
        config: &Config,
        text: &str,
        reference: &Document,
        mode: ReconstructMode,
        err: &ReconstructError,
    ) -> ReproBundle {
        error!(mode = %mode, config = %config, input = text, error = %err, "pointer reconstruction failed");
        let bundle = match err {
            ReconstructError::Diverged { expected, actual } => ReproBundle::new(
                self.seed,
                *config,
                mode.operation(),
                text,
                expected.to_string(),
                actual.to_string(),
            ),
            other => ReproBundle::new(
                self.seed,
                *config,
                mode.operation(),
                text,
                reference.to_string(),
                other.to_string(),
            ),
        };
        match err.pointer() {
            Some(pointer) => bundle.with_detail(format!("pointer {pointer}")),
            None => bundle,
        }
    }
}

/// Results from validating a batch of documents.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Number of documents that passed.
    pub passed: usize,
    /// Number of documents that failed.
    pub failed: usize,
    /// Number of documents skipped as generation faults.
    pub skipped: usize,
    /// Every failure, in input order.
    pub failures: Vec<ReproBundle>,
    /// Every generation fault, in input order.
    pub faults: Vec<GenerationFault>,
}

impl BatchResult {
    /// Create a new empty batch result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document outcome.
    pub fn record(&mut self, outcome: DocumentOutcome) {
        match outcome {
            DocumentOutcome::Pass => self.record_pass(),
            DocumentOutcome::Fail(bundles) => self.record_fail(bundles),
            DocumentOutcome::Skipped(fault) => self.record_skip(fault),
        }
    }

    /// Record a passing document.
    pub fn record_pass(&mut self) {
        self.passed += 1;
    }

    /// Record a failing document.
    pub fn record_fail(&mut self, bundles: Vec<ReproBundle>) {
        self.failed += 1;
        self.failures.extend(bundles);
    }

    /// Record a skipped document.
    pub fn record_skip(&mut self, fault: GenerationFault) {
        self.skipped += 1;
        self.faults.push(fault);
    }

    /// Check if no document failed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get total number of documents seen.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Format a summary string.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped (total: {})",
            self.passed,
            self.failed,
            self.skipped,
            self.total()
        )
    }
}
