//! simplex::types — shared numeric aliases and default settings.
//!
//! Purpose
//! -------
//! Centralize the numeric types and documented defaults used by the
//! Nelder–Mead engine and by the estimators that post-process its output,
//! so the rest of the crate refers to `Theta`/`Hessian` instead of raw
//! `ndarray` generics.
//!
//! Conventions
//! -----------
//! - `Theta` is a parameter vector of length `nTerms`, in model space unless
//!   a function says it works in scaled space.
//! - `Cost` is the (possibly penalized) weighted sum of squared residuals.
//! - `Hessian` is dense `nTerms × nTerms`.
use ndarray::{Array1, Array2};

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector of the objective, same shape as `Theta`.
pub type Grad = Array1<f64>;

/// Dense second-derivative matrix of the objective.
pub type Hessian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Default convergence tolerance `fTol`.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Default iteration cap, counted across restarts.
pub const DEFAULT_MAX_ITER: usize = 3000;

/// Default number of restarts after the first convergence.
pub const DEFAULT_MAX_RESTARTS: usize = 3;

/// Default reflection coefficient `α`.
pub const DEFAULT_REFLECTION: f64 = 1.0;

/// Default expansion coefficient `γ`.
pub const DEFAULT_EXPANSION: f64 = 2.0;

/// Default contraction coefficient `β`.
pub const DEFAULT_CONTRACTION: f64 = 0.5;

/// Default penalty weight applied to squared constraint violations.
pub const DEFAULT_PENALTY_WEIGHT: f64 = 1e30;

/// Default relative half-width of a tolerance-band constraint.
pub const DEFAULT_CONSTRAINT_TOLERANCE: f64 = 1e-4;

/// Default fractional step used by the finite-difference estimators.
pub const DEFAULT_FRACTIONAL_DELTA: f64 = 1e-4;
