//! Errors for regression sessions (data validation, term bookkeeping, and
//! failures propagated from the optimizer and the statistics estimators).
//!
//! ## Conventions
//! - **Indices are 0-based.**
//! - Conditions reported here are fatal for the fit that raised them; the
//!   session is left as it was before the call.
//! - Non-convergence and singular Hessians are *not* errors; they are flags
//!   on the fit result.
use crate::{inference::errors::InferenceError, optimization::errors::OptError};

/// Crate-wide result alias for regression operations.
pub type RegressionResult<T> = Result<T, RegressionError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RegressionError {
    // ---- Input/data validation ----
    /// Dataset has no samples.
    EmptyData,

    /// No independent-variable rows.
    NoIndependentVariables,

    /// Two arrays that must have equal length differ.
    LengthMismatch { what: &'static str, expected: usize, found: usize },

    /// An x, y, or weight entry is NaN/±inf.
    NonFiniteData { what: &'static str, index: usize, value: f64 },

    /// `nData` is not a multiple of the number of stacked series.
    InvalidSeriesCount { n_series: usize, n_data: usize },

    // ---- Term bookkeeping ----
    /// `nData − nTerms ≤ 0` without the override.
    InsufficientDegreesOfFreedom { n_data: usize, n_terms: usize },

    /// Linear solve with more unknowns than samples.
    MoreParametersThanData { n_terms: usize, n_data: usize },

    /// Design matrix has no rows.
    EmptyDesign,

    // ---- Linear algebra ----
    /// Normal-equation matrix could not be factorized.
    SingularNormalMatrix,

    // ---- Accessors ----
    /// A result accessor was called before any fit completed.
    NotFitted,

    // ---- Lower layers ----
    Optimization(OptError),
    Inference(InferenceError),
}

impl From<OptError> for RegressionError {
    fn from(err: OptError) -> Self {
        RegressionError::Optimization(err)
    }
}

impl From<InferenceError> for RegressionError {
    fn from(err: InferenceError) -> Self {
        RegressionError::Inference(err)
    }
}

impl std::error::Error for RegressionError {}

impl std::fmt::Display for RegressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            RegressionError::EmptyData => write!(f, "Dataset has no samples."),
            RegressionError::NoIndependentVariables => {
                write!(f, "Dataset has no independent-variable rows.")
            }
            RegressionError::LengthMismatch { what, expected, found } => {
                write!(f, "Length mismatch for {what}: expected {expected}, found {found}.")
            }
            RegressionError::NonFiniteData { what, index, value } => {
                write!(f, "Non-finite {what} at index {index}: {value}.")
            }
            RegressionError::InvalidSeriesCount { n_series, n_data } => write!(
                f,
                "Cannot split {n_data} samples into {n_series} equal dependent-variable series."
            ),

            // ---- Term bookkeeping ----
            RegressionError::InsufficientDegreesOfFreedom { n_data, n_terms } => write!(
                f,
                "Insufficient degrees of freedom: {n_data} data points for {n_terms} parameters."
            ),
            RegressionError::MoreParametersThanData { n_terms, n_data } => write!(
                f,
                "More parameters than data points: {n_terms} parameters, {n_data} data points."
            ),
            RegressionError::EmptyDesign => write!(f, "Design matrix has no rows."),

            // ---- Linear algebra ----
            RegressionError::SingularNormalMatrix => {
                write!(f, "Normal-equation matrix is singular.")
            }

            // ---- Accessors ----
            RegressionError::NotFitted => write!(f, "No fit has been performed yet."),

            // ---- Lower layers ----
            RegressionError::Optimization(err) => write!(f, "Optimization failed: {err}"),
            RegressionError::Inference(err) => write!(f, "Statistics failed: {err}"),
        }
    }
}
