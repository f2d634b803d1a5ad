//! Reproduction bundle for equivalence failures.

use std::path::Path;

use serde::Serialize;

use crate::config::Config;

/// Everything needed to replay one failure deterministically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReproBundle {
    /// Run seed.
    pub seed: u64,
    /// Configuration the failing validation used.
    pub config: Config,
    /// What failed: a chain name, `pointer-value`, `pointer-binary`, or
    /// `sort-order`.
    pub operation: String,
    /// Input text.
    pub input: String,
    /// Expected result (normalized reference).
    pub expected: String,
    /// Actual result, or the fault message.
    pub actual: String,
    /// Extra context, such as the offending pointer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReproBundle {
    /// Create a new repro bundle.
    pub fn new(
        seed: u64,
        config: Config,
        operation: impl Into<String>,
        input: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            seed,
            config,
            operation: operation.into(),
            input: input.into(),
            expected: expected.into(),
            actual: actual.into(),
            detail: None,
        }
    }

    /// Attach extra context.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Format as a human-readable report.
    pub fn to_report(&self) -> String {
        let mut report = format!(
            r#"=== Equivalence Failure Report ===
Operation: {}
Seed: {}
Config: {}
Input: {}

Expected: {}
Actual:   {}
"#,
            self.operation, self.seed, self.config, self.input, self.expected, self.actual,
        );
        if let Some(detail) = &self.detail {
            report.push_str(&format!("Detail:   {detail}\n"));
        }
        report.push_str(&format!(
            "\nTo reproduce:\n  reprcheck validate --seed {} --count 1 --input '{}'\n",
            self.seed, self.input
        ));
        report
    }

    /// Save the report to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_report())
    }

    /// Format as JSON for machine parsing.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
