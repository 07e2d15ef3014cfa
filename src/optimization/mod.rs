//! optimization — simplex minimizer, constraints, and numerical helpers.
//!
//! Purpose
//! -------
//! Provide the model-agnostic numerical layer of the crate: a derivative-free
//! simplex minimizer, the penalty constraints a nonlinear fit can carry,
//! parameter scaling, and a single error/result surface. Nothing here knows
//! about datasets or models; the regression layer supplies the objective.
//!
//! Key behaviors
//! -------------
//! - Minimize any `argmin` `CostFunction` over `Array1<f64>` with the
//!   Nelder–Mead simplex (`simplex`), including restarts, two convergence
//!   tests, and finite-difference estimates for post-fit statistics.
//! - Describe inequality and tolerance-band constraints and measure how far a
//!   parameter vector lies outside them (`constraints`).
//! - Rescale parameters for the search and hold the numeric thresholds shared
//!   across layers (`numerical_stability`).
//! - Normalize configuration errors, objective failures, and backend errors
//!   into `errors::OptError` with the `OptResult<T>` alias.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated before any objective evaluation; invalid settings
//!   are reported as `OptError`, never panics.
//! - Parameters handed to objectives and constraints are always in model
//!   space.
//!
//! Downstream usage
//! ----------------
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; integration tests exercise the
//!   simplex through full regression fits.

pub mod constraints;
pub mod errors;
pub mod numerical_stability;
pub mod simplex;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_curvefit::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::constraints::{
        ConstraintDirection, ConstraintSet, MultiConstraint, SingleConstraint,
    };
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
    pub use super::simplex::prelude::*;
}
