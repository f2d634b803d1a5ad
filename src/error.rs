//! Error handling for the harness.
//!
//! Component-level failures (text decoding, pointer resolution, codec
//! conversions, reconstruction, sort order) have their own error types next
//! to the code that raises them. `HarnessError` covers the run itself: bad
//! run parameters, unknown configuration option names, I/O on inputs or
//! report files, and corpus files that do not collate. These are fatal
//! and surface before any document is processed.

use thiserror::Error;

/// Fatal errors raised while setting up or reporting a validation run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A configuration option name was not recognized.
    #[error("unknown {option} option: {value:?}")]
    UnknownOption {
        /// Which configuration dimension was being parsed.
        option: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A run parameter (worker count, queue size, ...) is out of range.
    #[error("invalid run parameter: {0}")]
    InvalidParameter(String),

    /// Reading inputs or writing reports failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A corpus could not be collated.
    #[error("collation failed: {0}")]
    SortOrder(#[from] crate::conformance::SortOrderError),

    /// Serializing a report to JSON failed.
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Get a short stable name for the error kind.
    pub fn name(&self) -> &'static str {
        match self {
            HarnessError::UnknownOption { .. } => "UnknownOption",
            HarnessError::InvalidParameter(_) => "InvalidParameter",
            HarnessError::Io(_) => "Io",
            HarnessError::SortOrder(_) => "SortOrder",
            HarnessError::Json(_) => "Json",
        }
    }
}

/// Result type for run-level operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_option_display() {
        let err = HarnessError::UnknownOption {
            option: "number-kind",
            value: "decimal".to_string(),
        };
        assert_eq!(err.to_string(), "unknown number-kind option: \"decimal\"");
        assert_eq!(err.name(), "UnknownOption");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: HarnessError = io.into();
        assert_eq!(err.name(), "Io");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_sort_order_conversion() {
        let err: HarnessError = crate::conformance::SortOrderError::TaskPanicked.into();
        assert_eq!(err.name(), "SortOrder");
        assert_eq!(err.to_string(), "collation failed: sort-order task panicked");
    }
}
