//! Session-level switches for [`Regression`](crate::regression::session::Regression).
//!
//! Optimizer settings live in
//! [`SimplexOptions`](crate::optimization::simplex::SimplexOptions) and are passed
//! per nonlinear fit; the switches here apply to every fit of a session.

/// Options shared by linear and nonlinear fits.
///
/// - `ignore_dof_check`: allow fits with `nData ≤ nTerms`. Such fits complete
///   but report undefined (`NaN`) standard errors.
/// - `true_frequencies`: treat `y` as counts and report the Pearson
///   chi-square `Σ(y − ŷ)²/ŷ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegressionOptions {
    pub ignore_dof_check: bool,
    pub true_frequencies: bool,
}

impl RegressionOptions {
    pub fn with_ignore_dof_check(mut self, ignore: bool) -> Self {
        self.ignore_dof_check = ignore;
        self
    }

    pub fn with_true_frequencies(mut self, true_frequencies: bool) -> Self {
        self.true_frequencies = true_frequencies;
        self
    }
}
