//! Pipeline validator.
//!
//! Routes one document through every chain in [`CHAIN_CATALOGUE`] and
//! checks that each chain's terminal document, once normalized, equals the
//! normalized reference decoded straight from the input text.
//!
//! # Requirements
//!
//! - The reference is decoded once; if that fails the document is a
//!   generation fault, not a chain failure
//! - Every chain ends in the value form and is compared after `normalize`,
//!   never on raw bytes
//! - A codec error or panic inside a chain becomes a `Fault` verdict for
//!   that chain only
//! - Under [`FailurePolicy::StopOnFirst`] the remaining chains are skipped
//!   after the first failure

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::codec::ReprKind::{Binary as B, Ordered as O, Text as T, Value as V};
use crate::codec::{Codec, CodecResult, Repr, ReprKind};
use crate::document::Document;
use crate::generate::GenerationFault;

/// What to do after an equivalence failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record it and keep going.
    #[default]
    Continue,
    /// Stop at the first one.
    StopOnFirst,
}

/// A named sequence of representation conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionChain {
    /// Chain identifier used in reports.
    pub name: &'static str,
    /// Representations visited, first to last.
    pub steps: &'static [ReprKind],
}

/// The fixed chain catalogue.
pub const CHAIN_CATALOGUE: [ConversionChain; 12] = [
    ConversionChain {
        name: "value2json2cbor2collate",
        steps: &[V, T, B, O, V],
    },
    ConversionChain {
        name: "value2cbor2collate",
        steps: &[V, B, O, V],
    },
    ConversionChain {
        name: "value2collate",
        steps: &[V, O, V],
    },
    ConversionChain {
        name: "json2cbor2collate2value",
        steps: &[T, B, O, V, T, V],
    },
    ConversionChain {
        name: "json2collate2value",
        steps: &[T, O, V, T, V],
    },
    ConversionChain {
        name: "json2value",
        steps: &[T, V, T, V],
    },
    ConversionChain {
        name: "cbor2collate2value2json",
        steps: &[B, O, V, T, B],
    },
    ConversionChain {
        name: "cbor2value2json",
        steps: &[B, V, T, B, V],
    },
    ConversionChain {
        name: "cbor2json",
        steps: &[B, T, B, V],
    },
    ConversionChain {
        name: "collate2value2json2cbor",
        steps: &[O, V, T, B, O, V],
    },
    ConversionChain {
        name: "collate2json2cbor",
        steps: &[O, T, B, O],
    },
    ConversionChain {
        name: "collate2cbor",
        steps: &[O, B, O, V],
    },
];

/// Look up a chain by name.
pub fn chain_by_name(name: &str) -> Option<&'static ConversionChain> {
    CHAIN_CATALOGUE.iter().find(|c| c.name == name)
}

/// Outcome of one chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainVerdict {
    /// Normalized result equals the normalized reference.
    Pass,
    /// The chain completed but produced a different document.
    Mismatch {
        /// Normalized reference.
        expected: Document,
        /// Normalized chain result.
        actual: Document,
    },
    /// A conversion failed or panicked.
    Fault {
        /// Error or panic message.
        message: String,
    },
}

/// A chain together with its verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResult {
    /// Chain name.
    pub chain: &'static str,
    /// What happened.
    pub verdict: ChainVerdict,
}

impl ChainResult {
    /// Returns true if the chain passed.
    pub fn is_pass(&self) -> bool {
        self.verdict == ChainVerdict::Pass
    }
}

/// All chain results for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Normalized reference document.
    pub reference: Document,
    /// Results in catalogue order (truncated under stop-on-first).
    pub results: Vec<ChainResult>,
}

impl PipelineOutcome {
    /// Returns true if every chain that ran passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ChainResult::is_pass)
    }

    /// Chains that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &ChainResult> {
        self.results.iter().filter(|r| !r.is_pass())
    }
}

/// Validate one document against every chain, continuing past failures.
pub fn validate<C: Codec + ?Sized>(codec: &C, raw: &[u8]) -> Result<PipelineOutcome, GenerationFault> {
    validate_with_policy(codec, raw, FailurePolicy::Continue)
}

/// Validate one document against every chain.
pub fn validate_with_policy<C: Codec + ?Sized>(
    codec: &C,
    raw: &[u8],
    policy: FailurePolicy,
) -> Result<PipelineOutcome, GenerationFault> {
    let decoded = codec
        .text_to_value(raw)
        .map_err(|e| GenerationFault::new(raw, e.to_string()))?;
    let reference = codec.normalize(&decoded);

    let mut results = Vec::with_capacity(CHAIN_CATALOGUE.len());
    for chain in &CHAIN_CATALOGUE {
        let verdict = run_guarded(codec, chain, raw, &decoded, &reference);
        match &verdict {
            ChainVerdict::Pass => debug!(chain = chain.name, "chain passed"),
            ChainVerdict::Mismatch { expected, actual } => error!(
                chain = chain.name,
                config = %codec.config(),
                %expected,
                %actual,
                "chain result differs from reference"
            ),
            ChainVerdict::Fault { message } => error!(
                chain = chain.name,
                config = %codec.config(),
                message = message.as_str(),
                "chain faulted"
            ),
        }

        let failed = verdict != ChainVerdict::Pass;
        results.push(ChainResult {
            chain: chain.name,
            verdict,
        });
        if failed && policy == FailurePolicy::StopOnFirst {
            break;
        }
    }

    Ok(PipelineOutcome { reference, results })
}

/// Run one chain and compare, turning errors and panics into faults.
pub fn run_guarded<C: Codec + ?Sized>(
    codec: &C,
    chain: &ConversionChain,
    raw: &[u8],
    decoded: &Document,
    reference: &Document,
) -> ChainVerdict {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| run_chain(codec, chain, raw, decoded)));
    match attempt {
        Ok(Ok(terminal)) => {
            let actual = codec.normalize(&terminal);
            if &actual == reference {
                ChainVerdict::Pass
            } else {
                ChainVerdict::Mismatch {
                    expected: reference.clone(),
                    actual,
                }
            }
        }
        Ok(Err(e)) => ChainVerdict::Fault {
            message: e.to_string(),
        },
        Err(payload) => ChainVerdict::Fault {
            message: panic_message(payload.as_ref()),
        },
    }
}

/// Execute a chain and decode its terminal representation.
pub fn run_chain<C: Codec + ?Sized>(
    codec: &C,
    chain: &ConversionChain,
    raw: &[u8],
    decoded: &Document,
) -> CodecResult<Document> {
    let text = Repr::Text(raw.to_vec());
    let mut current = match chain.steps.first() {
        Some(ReprKind::Value) | None => Repr::Value(decoded.clone()),
        Some(ReprKind::Text) => text,
        Some(&first) => text.convert(codec, first)?,
    };
    for &step in chain.steps.iter().skip(1) {
        current = current.convert(codec, step)?;
    }
    current.into_value(codec)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic with non-string payload".to_string()
    }
}
