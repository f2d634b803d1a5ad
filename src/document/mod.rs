//! Documents and their text form.
//!
//! # Architecture
//!
//! - [`types`] - the six-variant [`Document`] union and [`Number`]
//! - [`limits`] - resource limits for decoding
//! - [`lexer`] - tokenizer with escape and whitespace-class handling
//! - [`parser`] - recursive descent parser honoring the number kind
//! - [`serialize`] - compact text output in insertion order
//! - [`pointer`] - JSON Pointer parsing, enumeration, get and set
//!
//! # Example
//!
//! ```
//! use reprcheck::config::Config;
//! use reprcheck::document::{parse, to_text};
//!
//! let doc = parse(br#"{"b":2,"a":[true,null]}"#, &Config::default()).unwrap();
//! assert_eq!(to_text(&doc), r#"{"b":2.0,"a":[true,null]}"#);
//! ```

pub mod error;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod pointer;
pub mod serialize;
pub mod types;

pub use error::{TextError, TextResult};
pub use limits::{Limits, MAX_SAFE_INT, MIN_SAFE_INT};
pub use parser::{parse, parse_with, ParseOptions};
pub use pointer::{list_pointers, JsonPointer, PointerError};
pub use serialize::{to_bytes, to_text};
pub use types::{Document, Number};
