//! simplex — derivative-free Nelder–Mead minimizer with restarts.
//!
//! Purpose
//! -------
//! Minimize a scalar objective over `nTerms` real parameters without
//! derivatives. Callers implement `argmin`'s [`CostFunction`] for their
//! objective and invoke [`minimize`] with a start point, initial steps, and
//! [`SimplexOptions`].
//!
//! Key behaviors
//! -------------
//! - Build an axis-aligned simplex of `nTerms + 1` vertices around the start
//!   point and iterate reflection / expansion / contraction / shrink moves
//!   ([`run`], [`state`]).
//! - Declare convergence by the spread of vertex values or by the residual
//!   scale relative to the data ([`ConvergenceTest`]), then restart around the
//!   best vertex `max_restarts` times.
//! - Run in a rescaled parameter space ([`adapter::ScaledObjective`]) and
//!   report results in model space ([`OptimOutcome`]).
//! - Provide the finite-difference estimates the statistics layer needs after
//!   a fit ([`finite_diff`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Steps are finite and non-zero, start values finite, and the objective
//!   finite at the start point; each is checked before the search begins.
//! - The iteration cap counts iterations across all restarts.
//! - The recorded best value is non-increasing over the run.
//! - The search is deterministic for identical inputs.
//!
//! Conventions
//! -----------
//! - Objectives that return non-finite values mid-search are treated as
//!   returning `+∞` at that point.
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult).
//!
//! Downstream usage
//! ----------------
//! - The regression session wraps its penalized sum of squares as the
//!   objective and feeds [`OptimOutcome`] to the pseudo-linear estimator.
//!
//! Testing notes
//! -------------
//! - Unit tests cover vertex primitives, option validation, scaling, the
//!   restart/iteration-cap policy, and finite-difference exactness on
//!   quadratics. Integration tests fit nonlinear models end to end.
//!
//! [`CostFunction`]: argmin::core::CostFunction

pub mod adapter;
pub mod api;
pub mod finite_diff;
pub mod run;
pub mod state;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{
    Coefficients, ConvergenceTest, OptimOutcome, ResidualReference, SimplexOptions,
};
pub use self::types::{Cost, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{Coefficients, ConvergenceTest, OptimOutcome, SimplexOptions};
    pub use super::types::{Cost, Theta};
}
