//! Check results and the engine error taxonomy.

use thiserror::Error;

use crate::session::SessionError;

/// Errors that can abort a compliance check.
///
/// Transient DOM read failures do not appear here: the style accessor
/// degrades them to "no value" and the affected sub-check fails with a
/// diagnostic message instead of propagating.
#[derive(Error, Debug)]
pub enum CheckError {
    /// A registry lookup missed under [`MissPolicy::Strict`](crate::registry::MissPolicy).
    #[error("unknown {category} rule: {label}")]
    UnknownRule {
        /// Registry category (e.g. "cue", "adaptation").
        category: String,
        /// The label that was looked up.
        label: String,
    },

    /// The browser session failed in a way the engine cannot absorb
    /// (malformed selector, closed page).
    #[error("browser session error: {0}")]
    Session(#[from] SessionError),

    /// Contradictory or unusable configuration. Programmer error; allowed
    /// to abort the current scenario.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for compliance checks.
pub type CheckOutcome = Result<CheckResult, CheckError>;

/// The outcome of one leaf validation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Whether the expectation held.
    pub passed: bool,
    /// Human-readable description naming the element and the expectation.
    pub message: String,
    /// The measured value behind the verdict, when there is one
    /// (contrast ratio, coverage score, ...).
    pub measured: Option<f64>,
}

impl CheckResult {
    /// A passing result.
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            measured: None,
        }
    }

    /// A failing result.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            measured: None,
        }
    }

    /// Attach the measured value behind the verdict.
    pub fn with_measured(mut self, value: f64) -> Self {
        self.measured = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_and_fail_carry_message() {
        let ok = CheckResult::pass("contrast 21.00 meets 4.5");
        assert!(ok.passed);
        assert!(ok.measured.is_none());

        let bad = CheckResult::fail("contrast 2.10 below 4.5").with_measured(2.1);
        assert!(!bad.passed);
        assert_eq!(bad.measured, Some(2.1));
    }

    #[test]
    fn unknown_rule_error_display() {
        let err = CheckError::UnknownRule {
            category: "cue".to_string(),
            label: "sparkle".to_string(),
        };
        assert_eq!(err.to_string(), "unknown cue rule: sparkle");
    }
}
