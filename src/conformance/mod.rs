//! Differential conformance checks.
//!
//! Every check takes a [`Codec`](crate::codec::Codec) bound to one
//! configuration and compares what different routes through the codec
//! produce for the same document.
//!
//! # Requirements
//!
//! - Results are compared as normalized documents, never as raw bytes
//! - A codec error or panic fails the check it happened in, never the run
//! - Every failure carries enough context to replay it from the seed
//!
//! # Architecture
//!
//! - [`pipeline`]: the twelve conversion chains
//! - [`reconstruct`]: pointer-by-pointer rebuild of values and encodings
//! - [`sort_order`]: comparator order against collation byte order
//! - [`corpus`]: collated line files checked against reference files
//! - [`harness`]: all of the above for one document
//! - [`stats`]: counters and the shared aggregator

pub mod corpus;
pub mod harness;
pub mod pipeline;
pub mod reconstruct;
mod repro;
pub mod sort_order;
pub mod stats;

pub use corpus::{check_dir, check_file, collate_file, collate_texts, CorpusCheck};
pub use harness::{BatchResult, DocumentHarness, DocumentOutcome, DocumentReport};
pub use pipeline::{
    chain_by_name, validate, validate_with_policy, ChainResult, ChainVerdict, ConversionChain,
    FailurePolicy, PipelineOutcome, CHAIN_CATALOGUE,
};
pub use reconstruct::{
    reconstruct, reconstruct_binary, verify_binary, verify_value, write_order, ReconstructError,
    ReconstructMode,
};
pub use repro::ReproBundle;
pub use sort_order::{
    compare_sort_orders, validate_strategies, KeyStrategy, SortMismatch, SortOrderError, SortReport,
};
pub use stats::{Aggregator, Statistics};
