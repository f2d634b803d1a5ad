//! Resource limits for text decoding.
//!
//! Generated documents are small, but inputs also come from files and the
//! command line, so the reference decoder refuses pathological sizes
//! instead of recursing without bound.

/// Largest integer exactly representable as an f64 (2^53 - 1).
pub const MAX_SAFE_INT: i64 = (1i64 << 53) - 1;

/// Smallest integer exactly representable as an f64 (-(2^53 - 1)).
pub const MIN_SAFE_INT: i64 = -MAX_SAFE_INT;

/// Size limits applied while decoding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum total input size in bytes
    pub max_input_size: u64,
    /// Maximum nesting depth for arrays/objects
    pub max_nesting_depth: u64,
    /// Maximum string length in bytes
    pub max_string_length: u64,
    /// Maximum number of fields in an object
    pub max_object_fields: u64,
    /// Maximum number of elements in an array
    pub max_array_length: u64,
}

impl Limits {
    /// Tight limits for fuzzed input.
    pub const fn strict() -> Self {
        Self {
            max_input_size: 1024 * 1024,  // 1 MiB
            max_nesting_depth: 64,
            max_string_length: 64 * 1024, // 64 KiB
            max_object_fields: 4096,
            max_array_length: 65_536,
        }
    }

    /// Generous limits for files supplied by the user.
    pub const fn lenient() -> Self {
        Self {
            max_input_size: 16 * 1024 * 1024, // 16 MiB
            max_nesting_depth: 128,
            max_string_length: 1024 * 1024,   // 1 MiB
            max_object_fields: 100_000,
            max_array_length: 1_000_000,
        }
    }

    /// Check if an integer survives a round trip through f64.
    pub fn is_safe_integer(value: i64) -> bool {
        (MIN_SAFE_INT..=MAX_SAFE_INT).contains(&value)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::lenient()
    }
}
