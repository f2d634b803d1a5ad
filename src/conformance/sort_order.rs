//! Sort-order validator.
//!
//! Sorts one batch of document texts two ways: with the codec's value
//! comparator over decoded documents, and with plain byte comparison over
//! their collation keys. Both orderings are decoded back to documents and
//! compared position by position; any difference means the collation form
//! does not preserve the comparator's total order.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::codec::{Codec, CodecError, CodecFactory, CodecResult};
use crate::config::{self, Config, ConfigOverrides};
use crate::document::Document;

/// How a text becomes a collation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyStrategy {
    /// text -> value -> binary -> collate
    JsonToValueToCborToCollate,
    /// text -> value -> collate
    JsonToValueToCollate,
    /// text -> collate
    JsonToCollate,
    /// text -> binary -> value -> collate
    JsonToCborToValueToCollate,
    /// text -> binary -> collate
    JsonToCborToCollate,
}

impl KeyStrategy {
    /// All strategies.
    pub const ALL: [KeyStrategy; 5] = [
        KeyStrategy::JsonToValueToCborToCollate,
        KeyStrategy::JsonToValueToCollate,
        KeyStrategy::JsonToCollate,
        KeyStrategy::JsonToCborToValueToCollate,
        KeyStrategy::JsonToCborToCollate,
    ];

    /// Name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            KeyStrategy::JsonToValueToCborToCollate => "JsonToValueToCborToCollate",
            KeyStrategy::JsonToValueToCollate => "JsonToValueToCollate",
            KeyStrategy::JsonToCollate => "JsonToCollate",
            KeyStrategy::JsonToCborToValueToCollate => "JsonToCborToValueToCollate",
            KeyStrategy::JsonToCborToCollate => "JsonToCborToCollate",
        }
    }

    /// Produce the collation key for a text.
    pub fn key<C: Codec + ?Sized>(&self, codec: &C, text: &[u8]) -> CodecResult<Vec<u8>> {
        match self {
            KeyStrategy::JsonToValueToCborToCollate => {
                let value = codec.text_to_value(text)?;
                codec.binary_to_ordered(&codec.value_to_binary(&value)?)
            }
            KeyStrategy::JsonToValueToCollate => codec.value_to_ordered(&codec.text_to_value(text)?),
            KeyStrategy::JsonToCollate => codec.text_to_ordered(text),
            KeyStrategy::JsonToCborToValueToCollate => {
                let value = codec.binary_to_value(&codec.text_to_binary(text)?)?;
                codec.value_to_ordered(&value)
            }
            KeyStrategy::JsonToCborToCollate => codec.binary_to_ordered(&codec.text_to_binary(text)?),
        }
    }
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by the sort-order validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SortOrderError {
    /// An input text could not be decoded.
    #[error("input {index} ({input:?}) does not decode: {source}")]
    Decode {
        /// Position in the batch.
        index: usize,
        /// The text.
        input: String,
        /// Underlying error.
        #[source]
        source: CodecError,
    },

    /// A collation key could not be produced or decoded.
    #[error("collation key {index} failed: {source}")]
    Key {
        /// Position in the batch or in the sorted keys.
        index: usize,
        /// Underlying error.
        #[source]
        source: CodecError,
    },

    /// The thread running a strategy panicked.
    #[error("{strategy}: sort-order thread panicked")]
    Panicked {
        /// Strategy whose thread panicked.
        strategy: KeyStrategy,
    },

    /// The sort-order task as a whole panicked before reporting.
    #[error("sort-order task panicked")]
    TaskPanicked,

    /// The two orderings differ.
    #[error("{strategy}: sort orders diverge ({} mismatches)", .mismatches)]
    Diverged {
        /// Strategy that diverged.
        strategy: KeyStrategy,
        /// Positional mismatches, including a length mismatch.
        mismatches: usize,
    },
}

/// One position where the orderings disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortMismatch {
    /// Position in the sorted batch.
    pub index: usize,
    /// Document at this position in the reference ordering.
    pub expected: String,
    /// Document at this position in the key ordering.
    pub actual: String,
}

/// Timings, comparator count and verdict for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortReport {
    /// Key strategy.
    pub strategy: KeyStrategy,
    /// Configuration used.
    pub config: Config,
    /// Batch size.
    pub items: usize,
    /// Time spent sorting with the value comparator.
    pub reference_time: Duration,
    /// Time spent sorting collation keys.
    pub key_time: Duration,
    /// Comparator invocations during the reference sort.
    pub compares: u64,
    /// Reference and key ordering lengths, when they differ.
    pub length_mismatch: Option<(usize, usize)>,
    /// Positional mismatches.
    pub mismatches: Vec<SortMismatch>,
}

impl SortReport {
    /// Returns true if both orderings agree.
    pub fn is_consistent(&self) -> bool {
        self.length_mismatch.is_none() && self.mismatches.is_empty()
    }

    /// `name: reference-time Vs key-time N compares`
    pub fn summary_line(&self) -> String {
        format!(
            "{:<30}: {:?} Vs {:?} {} compares",
            self.strategy.name(),
            self.reference_time,
            self.key_time,
            self.compares
        )
    }

    /// Turn an inconsistent report into an error.
    pub fn ensure_consistent(&self) -> Result<(), SortOrderError> {
        if self.is_consistent() {
            return Ok(());
        }
        Err(SortOrderError::Diverged {
            strategy: self.strategy,
            mismatches: self.mismatches.len() + usize::from(self.length_mismatch.is_some()),
        })
    }
}

fn time_it<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Sort a batch both ways and check the orderings agree.
pub fn compare_sort_orders<C: Codec + ?Sized, S: AsRef<str>>(
    codec: &C,
    strategy: KeyStrategy,
    texts: &[S],
) -> Result<SortReport, SortOrderError> {
    let mut decoded: Vec<(&str, Document)> = Vec::with_capacity(texts.len());
    let mut keys: Vec<Vec<u8>> = Vec::with_capacity(texts.len());
    for (index, text) in texts.iter().enumerate() {
        let text = text.as_ref();
        let value = codec
            .text_to_value(text.as_bytes())
            .map_err(|source| SortOrderError::Decode {
                index,
                input: text.to_string(),
                source,
            })?;
        decoded.push((text, value));
        keys.push(
            strategy
                .key(codec, text.as_bytes())
                .map_err(|source| SortOrderError::Key { index, source })?,
        );
    }

    let compares = Cell::new(0u64);
    let ((), reference_time) = time_it(|| {
        decoded.sort_by(|a, b| {
            compares.set(compares.get() + 1);
            codec.compare(&a.1, &b.1)
        })
    });
    let ((), key_time) = time_it(|| keys.sort());

    let mut from_keys = Vec::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        let value = codec
            .ordered_to_text(key)
            .and_then(|text| codec.text_to_value(&text))
            .map_err(|source| SortOrderError::Key { index, source })?;
        from_keys.push(value);
    }

    let length_mismatch = (decoded.len() != from_keys.len()).then(|| (decoded.len(), from_keys.len()));
    let mismatches: Vec<SortMismatch> = decoded
        .iter()
        .zip(&from_keys)
        .enumerate()
        .filter(|(_, ((_, expected), actual))| codec.compare(expected, actual) != Ordering::Equal)
        .map(|(index, ((_, expected), actual))| SortMismatch {
            index,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
        .collect();

    let report = SortReport {
        strategy,
        config: *codec.config(),
        items: texts.len(),
        reference_time,
        key_time,
        compares: compares.get(),
        length_mismatch,
        mismatches,
    };

    if report.is_consistent() {
        info!(config = %report.config, "{}", report.summary_line());
    } else {
        for m in &report.mismatches {
            error!(
                strategy = strategy.name(),
                index = m.index,
                expected = m.expected.as_str(),
                actual = m.actual.as_str(),
                "sort order mismatch"
            );
        }
        if let Some((expected, got)) = report.length_mismatch {
            error!(strategy = strategy.name(), expected, got, "sorted length mismatch");
        }
    }

    Ok(report)
}

/// Run every key strategy on its own thread against the same batch.
///
/// Each thread draws its configuration from its own generator seeded with
/// `seed`, then applies `overrides`. Results come back in
/// [`KeyStrategy::ALL`] order.
pub fn validate_strategies<F: CodecFactory, S: AsRef<str> + Sync>(
    factory: &F,
    seed: u64,
    overrides: &ConfigOverrides,
    texts: &[S],
) -> Vec<Result<SortReport, SortOrderError>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = KeyStrategy::ALL
            .iter()
            .map(|&strategy| {
                scope.spawn(move || {
                    let config = overrides.apply(config::sample(&mut config::seeded_rng(seed)));
                    let codec = factory.build(&config);
                    compare_sort_orders(&codec, strategy, texts)
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(KeyStrategy::ALL)
            .map(|(handle, strategy)| {
                handle.join().unwrap_or_else(|_| {
                    error!(strategy = strategy.name(), "sort-order thread panicked");
                    Err(SortOrderError::Panicked { strategy })
                })
            })
            .collect()
    })
}
