//! optimization::numerical_stability — scaling and shared numeric tolerances.
//!
//! Purpose
//! -------
//! Collect the small numeric primitives the simplex and the statistics
//! estimators share: parameter rescaling between model space and search
//! space, default step construction, and the tolerances used to decide when
//! a quantity is numerically zero.
//!
//! Key behaviors
//! -------------
//! - [`Scaling`] resolves per-parameter factors for a start vector;
//!   [`to_scaled`] and [`from_scaled_into`] move vectors between spaces.
//! - [`default_steps`] builds non-zero initial steps from a start vector.
//! - [`PERFECT_FIT_RTOL`] decides when a residual sum of squares counts as
//!   an exact fit relative to the total sum of squares.
//!
//! Conventions
//! -----------
//! - Search space is `z = θ ⊙ s`; every objective evaluation receives
//!   model-space `θ`.
//! - Nothing here logs or allocates beyond the returned vectors.

pub mod scaling;

/// Relative threshold below which `SSR / TSS` is treated as an exact fit.
pub const PERFECT_FIT_RTOL: f64 = 1e-24;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::scaling::{
    DEFAULT_STEP_FRACTION, Scaling, default_steps, from_scaled_into, to_scaled,
};

pub mod prelude {
    pub use super::PERFECT_FIT_RTOL;
    pub use super::scaling::{Scaling, default_steps};
}
