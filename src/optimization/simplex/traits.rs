//! Public configuration and result types for the simplex optimizer.
//!
//! - [`SimplexOptions`]: immutable, validated settings for one nonlinear fit.
//! - [`Coefficients`]: reflection / expansion / contraction factors.
//! - [`ConvergenceTest`]: which stopping rule is applied.
//! - [`ResidualReference`]: data-derived quantities the residual-scale test needs.
//! - [`OptimOutcome`]: normalized result returned by [`minimize`](super::minimize).
use std::str::FromStr;

use crate::optimization::{
    errors::{OptError, OptResult},
    numerical_stability::Scaling,
    simplex::{
        types::{
            Cost, DEFAULT_CONSTRAINT_TOLERANCE, DEFAULT_CONTRACTION, DEFAULT_EXPANSION,
            DEFAULT_FRACTIONAL_DELTA, DEFAULT_MAX_ITER, DEFAULT_MAX_RESTARTS,
            DEFAULT_PENALTY_WEIGHT, DEFAULT_REFLECTION, DEFAULT_TOLERANCE, Theta,
        },
        validation::{verify_coefficient, verify_max_iter, verify_positive, verify_tolerance},
    },
};

/// Stopping rule for the simplex search.
///
/// Variants:
/// - `SimplexSd`: the standard deviation of the vertex objective values falls
///   below `tolerance`.
/// - `ResidualScale`: `sqrt(lowest value / degrees of freedom)` falls below
///   `tolerance × mean(|y|)`.
///
/// Parsing:
/// Accepts case-insensitive `"simplex_sd"` / `"residual_scale"`; unknown names
/// return `OptError::InvalidConvergenceTest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergenceTest {
    #[default]
    SimplexSd,
    ResidualScale,
}

impl FromStr for ConvergenceTest {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simplex_sd" | "simplexsd" => Ok(ConvergenceTest::SimplexSd),
            "residual_scale" | "residualscale" => Ok(ConvergenceTest::ResidualScale),
            _ => Err(OptError::InvalidConvergenceTest {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'simplex_sd' or 'residual_scale'.",
            }),
        }
    }
}

/// Nelder–Mead move coefficients.
///
/// - `reflection` `α > 0`
/// - `expansion` `γ > 1`
/// - `contraction` `β ∈ (0, 1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
}

impl Coefficients {
    /// # Errors
    /// Returns [`OptError::InvalidCoefficient`] for any coefficient outside its range.
    pub fn new(reflection: f64, expansion: f64, contraction: f64) -> OptResult<Self> {
        verify_coefficient("reflection", reflection, 0.0, f64::INFINITY, "Must be positive.")?;
        verify_coefficient("expansion", expansion, 1.0, f64::INFINITY, "Must exceed one.")?;
        verify_coefficient("contraction", contraction, 0.0, 1.0, "Must lie in (0, 1).")?;
        Ok(Self { reflection, expansion, contraction })
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            reflection: DEFAULT_REFLECTION,
            expansion: DEFAULT_EXPANSION,
            contraction: DEFAULT_CONTRACTION,
        }
    }
}

/// Optimizer-level configuration for one nonlinear fit.
///
/// Fields:
/// - `tolerance`: `fTol` used by the selected [`ConvergenceTest`].
/// - `max_iter`: iteration cap, counted across restarts.
/// - `max_restarts`: number of restarts performed after the first convergence.
/// - `coefficients`: reflection / expansion / contraction factors.
/// - `convergence`: stopping rule.
/// - `scaling`: how start values are rescaled for the search.
/// - `penalty_weight`: multiplier on the squared constraint violation.
/// - `constraint_tolerance`: relative half-width of `Within` constraints.
/// - `fractional_delta`: finite-difference step as a fraction of each estimate.
///
/// Default:
/// - `tolerance = 1e-9`, `max_iter = 3000`, `max_restarts = 3`
/// - `coefficients = (1.0, 2.0, 0.5)`, `convergence = SimplexSd`,
///   `scaling = Identity`
/// - `penalty_weight = 1e30`, `constraint_tolerance = 1e-4`,
///   `fractional_delta = 1e-4`
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    pub tolerance: f64,
    pub max_iter: usize,
    pub max_restarts: usize,
    pub coefficients: Coefficients,
    pub convergence: ConvergenceTest,
    pub scaling: Scaling,
    pub penalty_weight: f64,
    pub constraint_tolerance: f64,
    pub fractional_delta: f64,
}

impl SimplexOptions {
    /// Options with the given tolerance and iteration cap and defaults elsewhere.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolerance`] for a non-positive or non-finite tolerance.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(tolerance: f64, max_iter: usize) -> OptResult<Self> {
        verify_tolerance(tolerance)?;
        verify_max_iter(max_iter)?;
        Ok(Self { tolerance, max_iter, ..Self::default() })
    }

    pub fn with_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    pub fn with_coefficients(mut self, coefficients: Coefficients) -> Self {
        self.coefficients = coefficients;
        self
    }

    pub fn with_convergence(mut self, convergence: ConvergenceTest) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// # Errors
    /// Returns [`OptError::InvalidPenalty`] unless the weight is finite and positive.
    pub fn with_penalty_weight(mut self, penalty_weight: f64) -> OptResult<Self> {
        verify_positive("penalty weight", penalty_weight)?;
        self.penalty_weight = penalty_weight;
        Ok(self)
    }

    /// # Errors
    /// Returns [`OptError::InvalidPenalty`] unless the tolerance is finite and positive.
    pub fn with_constraint_tolerance(mut self, constraint_tolerance: f64) -> OptResult<Self> {
        verify_positive("constraint tolerance", constraint_tolerance)?;
        self.constraint_tolerance = constraint_tolerance;
        Ok(self)
    }

    /// # Errors
    /// Returns [`OptError::InvalidPenalty`] unless the delta is finite and positive.
    pub fn with_fractional_delta(mut self, fractional_delta: f64) -> OptResult<Self> {
        verify_positive("fractional delta", fractional_delta)?;
        self.fractional_delta = fractional_delta;
        Ok(self)
    }
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
            max_restarts: DEFAULT_MAX_RESTARTS,
            coefficients: Coefficients::default(),
            convergence: ConvergenceTest::default(),
            scaling: Scaling::default(),
            penalty_weight: DEFAULT_PENALTY_WEIGHT,
            constraint_tolerance: DEFAULT_CONSTRAINT_TOLERANCE,
            fractional_delta: DEFAULT_FRACTIONAL_DELTA,
        }
    }
}

/// Data-derived reference values for [`ConvergenceTest::ResidualScale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualReference {
    pub degrees_of_freedom: usize,
    pub y_abs_mean: f64,
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found (model space).
/// - `value`: objective value at `theta_hat`.
/// - `converged`: `false` when the iteration cap was hit first.
/// - `status`: human-readable termination status.
/// - `iterations`: iterations performed across all restarts.
/// - `restarts`: restarts actually performed.
/// - `fn_evals`: objective evaluations.
/// - `simplex_sd`: standard deviation of the vertex values at termination.
/// - `history`: lowest vertex value after each iteration.
/// - `simplex` / `simplex_values`: final vertices (model space) and their values.
/// - `grad_norm`: norm of a central-difference gradient at `theta_hat`, when
///   the caller computes one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: Cost,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub restarts: usize,
    pub fn_evals: usize,
    pub simplex_sd: f64,
    pub history: Vec<Cost>,
    pub simplex: Vec<Theta>,
    pub simplex_values: Vec<Cost>,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Status string for a run that met its convergence test.
    pub const CONVERGED: &'static str = "Converged";
    /// Status string for a run stopped by the iteration cap.
    pub const MAX_ITER_REACHED: &'static str = "Maximum iterations reached";

    pub fn status_for(converged: bool) -> String {
        if converged { Self::CONVERGED.to_string() } else { Self::MAX_ITER_REACHED.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Convergence test names parse case-insensitively and unknown names fail.
    fn convergence_test_parses_names() {
        assert_eq!("Simplex_SD".parse::<ConvergenceTest>(), Ok(ConvergenceTest::SimplexSd));
        assert_eq!("residual_scale".parse::<ConvergenceTest>(), Ok(ConvergenceTest::ResidualScale));
        assert!(matches!(
            "sd_times_residual".parse::<ConvergenceTest>(),
            Err(OptError::InvalidConvergenceTest { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Defaults carry the documented constants.
    fn default_options_match_documented_values() {
        let opts = SimplexOptions::default();
        assert_eq!(opts.tolerance, 1e-9);
        assert_eq!(opts.max_iter, 3000);
        assert_eq!(opts.max_restarts, 3);
        assert_eq!(opts.coefficients, Coefficients::new(1.0, 2.0, 0.5).unwrap());
        assert_eq!(opts.penalty_weight, 1e30);
        assert_eq!(opts.constraint_tolerance, 1e-4);
        assert_eq!(opts.fractional_delta, 1e-4);
        assert_eq!(opts.scaling, Scaling::Identity);
    }

    #[test]
    fn options_reject_invalid_settings() {
        assert!(matches!(SimplexOptions::new(-1.0, 10), Err(OptError::InvalidTolerance { .. })));
        assert!(matches!(SimplexOptions::new(1e-6, 0), Err(OptError::InvalidMaxIter { .. })));
        assert!(Coefficients::new(1.0, 0.5, 0.5).is_err());
        assert!(SimplexOptions::default().with_penalty_weight(0.0).is_err());
    }
}
