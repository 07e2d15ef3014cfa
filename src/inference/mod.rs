//! inference — covariance, standard errors, and goodness of fit for fits.
//!
//! Purpose
//! -------
//! Turn a fitted parameter vector into the statistics a caller reports:
//! covariance and correlation matrices, standard errors, t- and p-values,
//! and residual-based goodness-of-fit measures. Two estimators share one
//! result shape, [`FitStatistics`].
//!
//! Key behaviors
//! -------------
//! - [`analytic_statistics`] inverts the error-weighted normal matrix of a
//!   linear fit.
//! - [`pseudo_linear_statistics`] inverts a four-point numerical Hessian of
//!   the sum of squares after a simplex fit and reports pseudo standard
//!   deviations from one-sided gradients.
//! - [`ParameterInference`] and [`GoodnessOfFit`] hold the derivations both
//!   estimators share.
//!
//! Invariants & assumptions
//! ------------------------
//! - Numerical failures in the covariance (singular Hessian, negative
//!   variances) are flags on the result with `NaN` entries, never errors.
//! - Shape mismatches and `statrs` parameter rejections are
//!   [`InferenceError`]s.
//!
//! Conventions
//! -----------
//! - `σ²` is 1 for weighted data and `SSR/dof` otherwise.
//! - p-values are two-sided Student-t with `dof = nData − nTerms`.
//!
//! Downstream usage
//! ----------------
//! - The regression session calls exactly one estimator per fit and stores
//!   the returned [`FitStatistics`].
//!
//! Testing notes
//! -------------
//! - Unit tests compare both estimators against closed-form straight-line
//!   results and against each other on a linear model.

pub mod analytic;
pub mod errors;
pub mod hessian;
pub mod statistics;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::analytic::analytic_statistics;
pub use self::errors::{InferenceError, InferenceResult};
pub use self::hessian::{PseudoLinearInputs, pseudo_linear_statistics};
pub use self::statistics::{FitStatistics, GoodnessOfFit, ParameterInference, ResidualInputs};
