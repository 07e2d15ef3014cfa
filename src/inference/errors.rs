//! Unified error handling for inference routines.
//!
//! This module defines `InferenceError`, the error type used by the analytic
//! and pseudo-linear statistics estimators. Recoverable numerical failures
//! (a singular Hessian, negative variances) are *not* errors: they clear a
//! validity flag on the result. What remains here are shape mismatches,
//! distribution construction failures, and propagated optimizer errors. An
//! alias `InferenceResult<T>` standardizes the return type.
use crate::optimization::errors::OptError;

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Inputs ----
    /// Vectors or matrices that must agree in length disagree.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// No parameters to report on.
    EmptyParameters,

    /// Objective value is non-finite at the estimate.
    NonFiniteObjective {
        value: f64,
    },

    // ---- Linear algebra ----
    /// Normal matrix of the linear fit could not be inverted.
    SingularMatrix {
        context: &'static str,
    },

    // ---- Distributions ----
    /// `statrs` rejected the distribution parameters.
    Distribution(String),

    // ---- Optimizer passthrough ----
    Optimization(OptError),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::Optimization(err)
    }
}

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Inputs ----
            InferenceError::DimensionMismatch { what, expected, found } => write!(
                f,
                "Inference Error: {} has length {}, expected {}",
                what, found, expected
            ),
            InferenceError::EmptyParameters => {
                write!(f, "Inference Error: No parameters to report on")
            }
            InferenceError::NonFiniteObjective { value } => {
                write!(f, "Inference Error: Objective is non-finite at the estimate ({})", value)
            }

            // ---- Linear algebra ----
            InferenceError::SingularMatrix { context } => {
                write!(f, "Inference Error: Singular matrix in {}", context)
            }

            // ---- Distributions ----
            InferenceError::Distribution(msg) => {
                write!(f, "Inference Error: Invalid distribution parameters: {}", msg)
            }

            // ---- Optimizer passthrough ----
            InferenceError::Optimization(err) => write!(f, "Inference Error: {}", err),
        }
    }
}
