//! Error types for Assay operations.
//!
//! Insufficient data is always surfaced with diagnostic counts so callers can
//! show which variables are too sparse. Degenerate inputs (zero variance,
//! zero ratio denominators) are not errors; they are handled where they occur.

use thiserror::Error;

/// Main error type for Assay operations.
///
/// # Examples
///
/// ```
/// use assay::error::AssayError;
///
/// let err = AssayError::DimensionMismatch {
///     expected: "50 values".to_string(),
///     actual: "49 values".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssayError {
    /// Not enough valid observations to compute a result.
    #[error("insufficient data for {context}: found {found}, need at least {required}{}", format_breakdown(.breakdown))]
    InsufficientData {
        /// What was being computed
        context: String,
        /// Number of usable observations found
        found: usize,
        /// Minimum number required
        required: usize,
        /// Per-variable valid counts, for diagnostics
        breakdown: Vec<(String, usize)>,
    },

    /// Series or matrix dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Correlation method that is named but not implemented (e.g. Kendall).
    #[error("unsupported correlation method: {0}")]
    UnsupportedMethod(String),

    /// Malformed input such as an unknown variable or an asymmetric matrix.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Empty input where at least one element is required.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

fn format_breakdown(breakdown: &[(String, usize)]) -> String {
    if breakdown.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = breakdown
        .iter()
        .map(|(name, count)| format!("{name}={count}"))
        .collect();
    format!(" (valid counts: {})", parts.join(", "))
}

impl From<serde_json::Error> for AssayError {
    fn from(err: serde_json::Error) -> Self {
        AssayError::Config(err.to_string())
    }
}

impl AssayError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an insufficient-data error without a per-variable breakdown
    #[must_use]
    pub fn insufficient(context: &str, found: usize, required: usize) -> Self {
        Self::InsufficientData {
            context: context.to_string(),
            found,
            required,
            breakdown: Vec::new(),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput(context.to_string())
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AssayError>;
