//! reprcheck - differential correctness harness for a multi-representation
//! document stack.
//!
//! The same logical document is routed through text, in-memory value,
//! compact binary and order-preserving collation forms by many different
//! paths, and every path must agree after normalization.
//!
//! # Architecture
//!
//! - [`config`] - Configuration record and the Config Space Sampler
//! - [`document`] - Document model, text parsing, JSON Pointer
//! - [`codec`] - Codec capability trait and the reference codec
//! - [`conformance`] - Pipeline, pointer reconstruction and sort-order checks
//! - [`generate`] - Document sources
//! - [`runner`] - Bounded-queue worker pool
//! - [`error`] - Run-level errors
//!
//! # Example
//!
//! ```
//! use reprcheck::codec::{CodecFactory, ReferenceCodecFactory};
//! use reprcheck::conformance::validate;
//! use reprcheck::Config;
//!
//! let codec = ReferenceCodecFactory.build(&Config::default());
//! let outcome = validate(&codec, br#"{"a":[1,2,3],"b":null}"#).unwrap();
//! assert!(outcome.all_passed());
//! ```

// Library code reports failures through results; a panic here would take
// down a worker instead of failing one check.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod conformance;
pub mod document;
pub mod error;
pub mod generate;
pub mod runner;

// Re-export commonly used types
pub use codec::{Codec, CodecError, CodecFactory, ReferenceCodec, ReferenceCodecFactory, Repr, ReprKind};
pub use config::{Config, ConfigOverrides, ContainerEncoding, NumberKind, WhitespaceClass};
pub use document::{Document, JsonPointer, Number};
pub use error::{HarnessError, HarnessResult};
pub use runner::{run_validation, RunOptions, RunSummary};
