//! Text decoding errors.
//!
//! Each variant carries a stable numeric code so repro bundles and CLI
//! output stay comparable across runs.

use thiserror::Error;

/// Errors raised while decoding document text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// Malformed text at the given byte offset (code 100).
    #[error("invalid JSON at byte {offset}")]
    InvalidJson {
        /// Byte offset of the offending token.
        offset: usize,
    },

    /// Duplicate object key after unescaping (code 101).
    #[error("duplicate key {0:?}")]
    DuplicateKey(String),

    /// Input is not valid UTF-8 or contains an unpaired surrogate (code 105).
    #[error("invalid UTF-8")]
    InvalidUtf8,

    /// Number is not finite in the configured kind (code 109).
    #[error("number out of range: {0}")]
    NumberOutOfRange(String),

    /// Input exceeds the size limit (code 110).
    #[error("input too large: {got} > {limit} bytes")]
    InputTooLarge {
        /// Input size.
        got: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Nesting exceeds the depth limit (code 111).
    #[error("nesting too deep: {got} > {limit}")]
    NestingTooDeep {
        /// Depth reached.
        got: u64,
        /// Configured limit.
        limit: u64,
    },

    /// A string exceeds the length limit (code 112).
    #[error("string too long: {got} > {limit} bytes")]
    StringTooLong {
        /// String length.
        got: u64,
        /// Configured limit.
        limit: u64,
    },

    /// An object has too many members (code 113).
    #[error("too many fields: {got} > {limit}")]
    TooManyFields {
        /// Member count reached.
        got: u64,
        /// Configured limit.
        limit: u64,
    },

    /// An array has too many elements (code 114).
    #[error("array too long: {got} > {limit}")]
    ArrayTooLong {
        /// Element count reached.
        got: u64,
        /// Configured limit.
        limit: u64,
    },
}

impl TextError {
    /// Get the numeric error code.
    pub fn code(&self) -> u32 {
        match self {
            TextError::InvalidJson { .. } => 100,
            TextError::DuplicateKey(_) => 101,
            TextError::InvalidUtf8 => 105,
            TextError::NumberOutOfRange(_) => 109,
            TextError::InputTooLarge { .. } => 110,
            TextError::NestingTooDeep { .. } => 111,
            TextError::StringTooLong { .. } => 112,
            TextError::TooManyFields { .. } => 113,
            TextError::ArrayTooLong { .. } => 114,
        }
    }

    /// Get the error name.
    pub fn name(&self) -> &'static str {
        match self {
            TextError::InvalidJson { .. } => "InvalidJson",
            TextError::DuplicateKey(_) => "DuplicateKey",
            TextError::InvalidUtf8 => "InvalidUtf8",
            TextError::NumberOutOfRange(_) => "NumberOutOfRange",
            TextError::InputTooLarge { .. } => "InputTooLarge",
            TextError::NestingTooDeep { .. } => "NestingTooDeep",
            TextError::StringTooLong { .. } => "StringTooLong",
            TextError::TooManyFields { .. } => "TooManyFields",
            TextError::ArrayTooLong { .. } => "ArrayTooLong",
        }
    }
}

/// Result type for text decoding.
pub type TextResult<T> = Result<T, TextError>;
