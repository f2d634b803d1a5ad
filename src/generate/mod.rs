//! Document sources.
//!
//! The harness only needs a bounded stream of candidate texts. This module
//! provides the ones the CLI uses:
//!
//! - [`RandomDocuments`]: seeded random JSON documents
//! - [`numeric`]: integer and decimal texts for sort-order batches
//! - [`repeat_input`] and [`read_lines`]: literal inputs
//!
//! A text that fails to decode is a [`GenerationFault`]: it is logged and
//! skipped, never counted as a failure.

pub mod numeric;
mod random;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::error::HarnessResult;

pub use random::{RandomDocuments, RootKind};

/// A candidate text that produced no document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation fault: {reason}")]
pub struct GenerationFault {
    /// The offending text (lossy if it was not UTF-8).
    pub input: String,
    /// Why it did not decode.
    pub reason: String,
}

impl GenerationFault {
    /// Create a fault for `raw`.
    pub fn new(raw: &[u8], reason: impl Into<String>) -> Self {
        Self {
            input: String::from_utf8_lossy(raw).into_owned(),
            reason: reason.into(),
        }
    }
}

/// The same text `count` times.
pub fn repeat_input(text: &str, count: usize) -> impl Iterator<Item = String> + Send {
    std::iter::repeat(text.to_string()).take(count)
}

/// One document per non-empty line of a file.
pub fn read_lines<P: AsRef<Path>>(path: P) -> HarnessResult<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}

/// Sort-order batch: a fifth each of integers, small decimals, large
/// decimals and exponent floats, the remainder random documents.
pub fn collate_batch(seed: u64, count: usize) -> Vec<String> {
    let fifth = count / 5;
    let mut batch = Vec::with_capacity(count);
    batch.extend(numeric::integers(seed, fifth));
    batch.extend(numeric::small_decimals(seed, fifth));
    batch.extend(numeric::large_decimals(seed, fifth));
    batch.extend(numeric::floats(seed, fifth));
    batch.extend(RandomDocuments::new(seed, count - 4 * fifth));
    batch
}
