//! Statistics sink.
//!
//! Workers count into a local [`Statistics`] and merge it into the shared
//! [`Aggregator`] once, when they exit, so the lock is taken once per worker
//! rather than once per document.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;

use super::harness::{DocumentOutcome, DocumentReport};
use crate::config::{Config, ContainerEncoding, NumberKind, WhitespaceClass};

/// Root kind labels, in report order.
pub const ROOT_KINDS: [&str; 7] = ["null", "true", "false", "num", "string", "array", "object"];

/// Counters for one run or one worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Documents received.
    pub docs: u64,
    /// Documents that passed every check.
    pub pass: u64,
    /// Documents with at least one failure.
    pub fail: u64,
    /// Documents skipped as generation faults.
    pub skipped: u64,
    /// Input bytes.
    pub bytes: u64,
    /// Decoded documents by root kind.
    pub root_kinds: BTreeMap<String, u64>,
    /// Documents by number kind.
    pub number_kinds: BTreeMap<String, u64>,
    /// Documents by whitespace class.
    pub whitespace: BTreeMap<String, u64>,
    /// Documents by container encoding.
    pub container_encodings: BTreeMap<String, u64>,
    /// Documents run with array-length prefix ordering.
    pub array_length_prefix: u64,
    /// Documents run with property-count prefix ordering.
    pub property_count_prefix: u64,
    /// Documents run with missing-value support.
    pub support_missing: u64,
    /// Failures by operation (chain name or reconstruction mode).
    pub failures: BTreeMap<String, u64>,
}

fn bump(map: &mut BTreeMap<String, u64>, key: &str, by: u64) {
    *map.entry(key.to_string()).or_insert(0) += by;
}

impl Statistics {
    /// Create empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the configuration dimensions of one document.
    pub fn record_config(&mut self, config: &Config) {
        bump(&mut self.number_kinds, config.number_kind.as_str(), 1);
        bump(&mut self.whitespace, config.whitespace.as_str(), 1);
        bump(&mut self.container_encodings, config.container_encoding.as_str(), 1);
        self.array_length_prefix += u64::from(config.array_length_prefix);
        self.property_count_prefix += u64::from(config.property_count_prefix);
        self.support_missing += u64::from(config.support_missing);
    }

    /// Count one document report.
    pub fn record(&mut self, report: &DocumentReport) {
        self.docs += 1;
        self.bytes += report.bytes as u64;
        self.record_config(&report.config);
        if let Some(kind) = report.root_kind {
            bump(&mut self.root_kinds, kind, 1);
        }
        match &report.outcome {
            DocumentOutcome::Pass => self.pass += 1,
            DocumentOutcome::Fail(_) => {
                self.fail += 1;
                for op in report.failed_operations() {
                    bump(&mut self.failures, op, 1);
                }
            }
            DocumentOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Add another set of counters into this one.
    pub fn merge(&mut self, other: &Statistics) {
        self.docs += other.docs;
        self.pass += other.pass;
        self.fail += other.fail;
        self.skipped += other.skipped;
        self.bytes += other.bytes;
        self.array_length_prefix += other.array_length_prefix;
        self.property_count_prefix += other.property_count_prefix;
        self.support_missing += other.support_missing;
        let maps = [
            (&mut self.root_kinds, &other.root_kinds),
            (&mut self.number_kinds, &other.number_kinds),
            (&mut self.whitespace, &other.whitespace),
            (&mut self.container_encodings, &other.container_encodings),
            (&mut self.failures, &other.failures),
        ];
        for (into, from) in maps {
            for (key, count) in from {
                bump(into, key, *count);
            }
        }
    }

    /// Check if nothing failed.
    pub fn all_passed(&self) -> bool {
        self.fail == 0
    }

    /// Human-readable report, one line per group.
    pub fn summary_lines(&self, seed: u64) -> Vec<String> {
        fn line<'a>(pairs: impl IntoIterator<Item = (&'a str, u64)>) -> String {
            pairs
                .into_iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(", ")
        }
        fn get(map: &BTreeMap<String, u64>, key: &str) -> u64 {
            map.get(key).copied().unwrap_or(0)
        }

        let mut lines = vec![
            format!("seed: {seed}"),
            line([
                ("docs", self.docs),
                ("pass", self.pass),
                ("fail", self.fail),
                ("skipped", self.skipped),
                ("bytes", self.bytes),
            ]),
            line(ROOT_KINDS.iter().map(|k| (*k, get(&self.root_kinds, k)))),
            line(NumberKind::ALL.iter().map(|k| (k.as_str(), get(&self.number_kinds, k.as_str())))),
            line(WhitespaceClass::ALL.iter().map(|c| (c.as_str(), get(&self.whitespace, c.as_str())))),
            line(
                ContainerEncoding::ALL
                    .iter()
                    .map(|e| (e.as_str(), get(&self.container_encodings, e.as_str()))),
            ),
            line([
                ("arrlenprefix", self.array_length_prefix),
                ("proplenprefix", self.property_count_prefix),
                ("missing", self.support_missing),
            ]),
        ];
        if !self.failures.is_empty() {
            lines.push(format!(
                "failures: {}",
                line(self.failures.iter().map(|(k, v)| (k.as_str(), *v)))
            ));
        }
        lines
    }
}

/// Shared, lock-guarded statistics for a run.
#[derive(Debug, Default)]
pub struct Aggregator {
    inner: Mutex<Statistics>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a worker's local counters.
    pub fn merge(&self, local: &Statistics) {
        self.inner.lock().merge(local);
    }

    /// Count a single report directly.
    pub fn record(&self, report: &DocumentReport) {
        self.inner.lock().record(report);
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> Statistics {
        self.inner.lock().clone()
    }

    /// Consume the aggregator.
    pub fn into_inner(self) -> Statistics {
        self.inner.into_inner()
    }
}
