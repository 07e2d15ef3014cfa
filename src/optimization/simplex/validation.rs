//! Validation helpers for the simplex optimizer.
//!
//! This module centralizes the consistency checks used across the
//! optimizer interface:
//!
//! - **Option checks**: [`verify_tolerance`], [`verify_max_iter`],
//!   [`verify_coefficient`], [`verify_positive`] for configuration values.
//! - **Start point and steps**: [`validate_start`] and [`validate_steps`]
//!   reject empty, non-finite, mismatched, or zero-valued inputs.
//! - **Hessians**: [`validate_hessian`] enforces shape and finiteness.
//!
//! All helpers return domain-specific [`OptError`] variants.
use crate::optimization::{
    errors::{OptError, OptResult},
    simplex::types::{Hessian, Theta},
};

/// Validate the convergence tolerance: finite and strictly positive.
///
/// # Errors
/// Returns [`OptError::InvalidTolerance`] if the value is non-finite or ≤ 0.0.
pub fn verify_tolerance(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(OptError::InvalidTolerance { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// Validate the iteration cap.
///
/// # Errors
/// Returns [`OptError::InvalidMaxIter`] if `max_iter == 0`.
pub fn verify_max_iter(max_iter: usize) -> OptResult<()> {
    if max_iter == 0 {
        return Err(OptError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate a simplex coefficient against an open interval `(lower, upper)`.
///
/// # Errors
/// Returns [`OptError::InvalidCoefficient`] if the value is non-finite or
/// outside the interval.
pub fn verify_coefficient(
    name: &'static str, value: f64, lower: f64, upper: f64, reason: &'static str,
) -> OptResult<()> {
    if !value.is_finite() || value <= lower || value >= upper {
        return Err(OptError::InvalidCoefficient { name, value, reason });
    }
    Ok(())
}

/// Validate a strictly positive, finite setting such as the penalty weight.
///
/// # Errors
/// Returns [`OptError::InvalidPenalty`] if the value is non-finite or ≤ 0.0.
pub fn verify_positive(name: &'static str, value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidPenalty { name, value, reason: "Value must be finite." });
    }
    if value <= 0.0 {
        return Err(OptError::InvalidPenalty { name, value, reason: "Value must be positive." });
    }
    Ok(())
}

/// Validate a start vector: non-empty with finite entries.
///
/// # Errors
/// - [`OptError::EmptyParameters`] for an empty vector.
/// - [`OptError::InvalidStartValue`] for the first non-finite entry.
pub fn validate_start(start: &Theta) -> OptResult<()> {
    if start.is_empty() {
        return Err(OptError::EmptyParameters);
    }
    for (index, &value) in start.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidStartValue { index, value });
        }
    }
    Ok(())
}

/// Validate initial step sizes: matching length, finite, and non-zero.
///
/// # Errors
/// - [`OptError::StepLengthMismatch`] if `steps.len() != dim`.
/// - [`OptError::InvalidStep`] for the first non-finite or zero step.
pub fn validate_steps(steps: &Theta, dim: usize) -> OptResult<()> {
    if steps.len() != dim {
        return Err(OptError::StepLengthMismatch { expected: dim, found: steps.len() });
    }
    for (index, &value) in steps.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidStep {
                index,
                value,
                reason: "Step sizes must be finite.",
            });
        }
        if value == 0.0 {
            return Err(OptError::InvalidStep {
                index,
                value,
                reason: "Step sizes must be non-zero.",
            });
        }
    }
    Ok(())
}

/// Validate the shape and entries of a Hessian matrix.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] if dimensions do not match `dim`.
/// - [`OptError::InvalidHessian`] if any entry is non-finite, with offending
///   row/col indices and value.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((i, j), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row: i, col: j, value });
        }
    }
    Ok(())
}
