//! regression — datasets, model functions, and the fitting session.
//!
//! Purpose
//! -------
//! Provide the domain layer on top of `optimization` and `inference`: a
//! validated [`Dataset`], the [`ModelFunction`] capability, the weighted sum
//! of squares as an `argmin` objective, the closed-form linear solver, and
//! the [`Regression`] session that ties a fit to its statistics.
//!
//! Key behaviors
//! -------------
//! - Linear path: design matrix → [`solve_weighted_least_squares`] →
//!   analytic statistics.
//! - Nonlinear path: constraints + [`SumOfSquares`] → simplex →
//!   pseudo-linear statistics.
//! - Sessions keep constraints across fits and expose the latest result
//!   through read accessors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets are immutable once built; weights are cleaned exactly once.
//! - `nData > nTerms` for every fit unless
//!   [`RegressionOptions::ignore_dof_check`] is set.
//!
//! Conventions
//! -----------
//! - Independent variables are stored as `nXarrays × nData`; design matrices
//!   as `nTerms × nData`.
//! - Residuals are `y − ŷ`; weighted residuals divide by the sample weight.
//!
//! Downstream usage
//! ----------------
//! - Import the session surface with `regression::prelude::*`.

pub mod data;
pub mod errors;
pub mod linear;
pub mod model;
pub mod objective;
pub mod options;
pub mod session;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::Dataset;
pub use self::errors::{RegressionError, RegressionResult};
pub use self::linear::{design_with_intercept, polynomial_design, solve_weighted_least_squares};
pub use self::model::ModelFunction;
pub use self::objective::SumOfSquares;
pub use self::options::RegressionOptions;
pub use self::session::{FitResult, Regression};

pub mod prelude {
    pub use super::data::Dataset;
    pub use super::errors::{RegressionError, RegressionResult};
    pub use super::linear::{design_with_intercept, polynomial_design};
    pub use super::model::ModelFunction;
    pub use super::options::RegressionOptions;
    pub use super::session::{FitResult, Regression};
}
