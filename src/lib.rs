//! rust_curvefit — weighted least squares and simplex curve fitting with
//! post-fit inference.
//!
//! Purpose
//! -------
//! Serve as the crate root for callers that fit models to data: a
//! closed-form solver for models linear in their parameters, a penalized
//! Nelder–Mead simplex for everything else, and the statistics that turn a
//! parameter vector into standard errors, correlations, and goodness of fit.
//!
//! Key behaviors
//! -------------
//! - `optimization`: model-agnostic simplex minimizer over `argmin` cost
//!   functions, penalty constraints, parameter scaling.
//! - `inference`: analytic and pseudo-linear (numerical Hessian) statistics
//!   sharing one result shape.
//! - `regression`: datasets, the [`ModelFunction`](regression::ModelFunction)
//!   capability, and the [`Regression`](regression::Regression) session.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fatal input problems are returned as per-layer error enums; numerical
//!   degradation (non-convergence, singular Hessians) is reported through
//!   flags on the results.
//! - All computation is synchronous and single-threaded; independent
//!   sessions share no state.
//!
//! Conventions
//! -----------
//! - Vectors and matrices are `ndarray` types; indices are 0-based.
//! - Diagnostics go through the `log` facade; the crate never installs a
//!   logger.
//!
//! Downstream usage
//! ----------------
//! - Most callers need only `use rust_curvefit::prelude::*;`.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/` holds end-to-end fits
//!   through the public session API.

pub mod inference;
pub mod optimization;
pub mod regression;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_curvefit::prelude::*;
//
// to import the session, options, and result types in a single line.

pub mod prelude {
    pub use crate::inference::{FitStatistics, GoodnessOfFit, InferenceError};
    pub use crate::optimization::prelude::*;
    pub use crate::regression::prelude::*;
}
