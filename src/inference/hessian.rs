//! inference::hessian — pseudo-linear statistics from a numerical Hessian.
//!
//! Purpose
//! -------
//! Estimate parameter uncertainty after a derivative-free nonlinear fit by
//! treating the objective as locally quadratic around the optimum. Near a
//! minimum of `S(θ) = Σ((y − f(θ, x))/w)²`, `S ≈ S(θ̂) + ½ Δᵀ H Δ`, and for a
//! linear model `H = 2·XᵀW⁻²X`, so `cov = 2σ²·H⁻¹` reproduces the analytic
//! covariance exactly.
//!
//! Key behaviors
//! -------------
//! - Choose steps `hᵢ = delta·|θ̂ᵢ|`, substituting the original simplex step
//!   when `θ̂ᵢ == 0` and flagging the substitution.
//! - Compute one-sided gradients on both sides of the optimum and report the
//!   pseudo standard deviation `sqrt(2σ²/cᵢ)` from their curvature `cᵢ`.
//! - Build the four-point central Hessian, invert it (directly for one
//!   parameter), and scale by `2σ²`.
//! - A singular or non-finite Hessian clears `hessian_invertible` and leaves
//!   every standard error undefined; negative variances clear
//!   `variances_non_negative`. Neither aborts the fit.
//!
//! Invariants & assumptions
//! ------------------------
//! - `objective` is the unpenalized sum of squares; penalties would swamp
//!   the curvature near an active constraint.
//! - `fallback_steps` are the validated, non-zero simplex steps.
//!
//! Conventions
//! -----------
//! - The Hessian is taken in absolute parameter coordinates, which equals
//!   the relative-coordinate Hessian rescaled by `θ̂ᵢθ̂ⱼ`.
//! - Errors are reported via [`InferenceResult<T>`].
//!
//! Downstream usage
//! ----------------
//! - The regression session calls [`pseudo_linear_statistics`] after every
//!   simplex fit.
//!
//! Testing notes
//! -------------
//! - Unit tests check agreement with the analytic estimator on a linear
//!   model, the singular-Hessian path, and step substitution at zero.
use argmin::core::CostFunction;
use ndarray::Array1;

use crate::{
    inference::{
        errors::{InferenceError, InferenceResult},
        statistics::{FitStatistics, GoodnessOfFit, ParameterInference, ResidualInputs, invert},
    },
    optimization::{
        errors::OptError,
        simplex::{
            finite_diff::{fd_steps, four_point_hessian, one_sided_gradients},
            types::{Cost, Theta},
        },
    },
};

/// Everything the pseudo-linear estimator needs besides the objective.
#[derive(Debug, Clone, Copy)]
pub struct PseudoLinearInputs<'a> {
    pub estimates: &'a Theta,
    pub fallback_steps: &'a Theta,
    pub fractional_delta: f64,
    pub residuals: ResidualInputs<'a>,
    pub iterations: usize,
    pub restarts: usize,
}

/// pseudo_linear_statistics — covariance from the objective's curvature.
///
/// Parameters
/// ----------
/// - `objective`: unpenalized sum of squares as an `argmin` cost function.
/// - `inputs`: estimates, fallback steps, delta, and residual inputs.
///
/// Returns
/// -------
/// `InferenceResult<FitStatistics>` with `pseudo_sd` and
/// `step_substituted` filled in.
///
/// Errors
/// ------
/// - `InferenceError::NonFiniteObjective` if `S(θ̂)` is not finite.
/// - `InferenceError::DimensionMismatch` for inconsistent lengths.
/// - `InferenceError::Optimization` for objective errors during
///   differencing.
pub fn pseudo_linear_statistics<O>(
    objective: &O, inputs: &PseudoLinearInputs<'_>,
) -> InferenceResult<FitStatistics>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    let theta = inputs.estimates;
    let n = theta.len();
    if n == 0 {
        return Err(InferenceError::EmptyParameters);
    }
    if inputs.fallback_steps.len() != n {
        return Err(InferenceError::DimensionMismatch {
            what: "steps",
            expected: n,
            found: inputs.fallback_steps.len(),
        });
    }

    let f0 = objective.cost(theta).map_err(OptError::from)?;
    if !f0.is_finite() {
        return Err(InferenceError::NonFiniteObjective { value: f0 });
    }

    let sigma2 = inputs.residuals.residual_scale();
    let steps = fd_steps(theta, inputs.fallback_steps, inputs.fractional_delta);
    let one_sided = one_sided_gradients(objective, theta, f0, &steps.h)?;
    let pseudo_sd: Array1<f64> = one_sided
        .curvature
        .mapv(|c| if c > 0.0 { (2.0 * sigma2 / c).sqrt() } else { f64::NAN });

    let inverse = match four_point_hessian(objective, theta, &steps.h) {
        Ok(hess) => invert(&hess),
        Err(OptError::InvalidHessian { row, col, value }) => {
            log::warn!("Hessian entry ({row}, {col}) is {value}; standard errors are undefined");
            None
        }
        Err(e) => return Err(e.into()),
    };
    let hessian_invertible = inverse.is_some();
    if !hessian_invertible {
        log::warn!("Hessian is singular at the optimum; standard errors are undefined");
    }
    let covariance = inverse.map(|inv| inv * (2.0 * sigma2));

    let dof = inputs.residuals.degrees_of_freedom();
    let parameters = ParameterInference::derive(theta, covariance, dof)?;
    let goodness = GoodnessOfFit::compute(&inputs.residuals)?;

    Ok(FitStatistics {
        estimates: theta.clone(),
        parameters,
        goodness,
        residual_scale: sigma2,
        degrees_of_freedom: dof,
        hessian_invertible,
        pseudo_sd: Some(pseudo_sd),
        step_substituted: steps.substituted,
        iterations: inputs.iterations,
        restarts: inputs.restarts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::analytic::analytic_statistics;
    use crate::optimization::simplex::traits::SimplexOptions;
    use approx::assert_relative_eq;
    use argmin::core::Error;
    use ndarray::{Array2, array};

    /// Σ(y − a − b·x)² over fixed data.
    struct LineSsr {
        x: Array1<f64>,
        y: Array1<f64>,
    }

    impl CostFunction for LineSsr {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, p: &Theta) -> Result<Cost, Error> {
            Ok(self.x.iter().zip(self.y.iter()).map(|(x, y)| (y - p[0] - p[1] * x).powi(2)).sum())
        }
    }

    /// Objective that ignores its second parameter.
    struct Flat;

    impl CostFunction for Flat {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, p: &Theta) -> Result<Cost, Error> {
            Ok((p[0] - 1.0).powi(2))
        }
    }

    /// `(p − 1)² + (p − 1)⁴`; one-sided curvature at 1 is `2 + 2h²`.
    struct Quartic;

    impl CostFunction for Quartic {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, p: &Theta) -> Result<Cost, Error> {
            let d = p[0] - 1.0;
            Ok(d * d + d.powi(4))
        }
    }

    fn line_fixture() -> (Array1<f64>, Array1<f64>, Array1<f64>, Array1<f64>) {
        let x = array![0.0, 1.0, 2.0, 3.0];
        let y = array![0.1, 0.9, 2.2, 2.8];
        let est = array![0.09, 0.94];
        let fitted = x.mapv(|v| 0.09 + 0.94 * v);
        (x, y, est, fitted)
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the pseudo-linear covariance with the analytic one for
    //   a model that is exactly linear.
    // - Singular Hessians degrading to undefined standard errors.
    // - Step substitution for zero estimates.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // For a linear model the numerical covariance equals the analytic one.
    //
    // Given
    // -----
    // - Straight-line data with OLS estimates (0.09, 0.94).
    //
    // Expect
    // ------
    // - Covariances agree to 1e-5 relative; pseudo-sd equals the SE of each
    //   parameter when the other is held fixed.
    fn linear_model_matches_analytic_covariance() {
        // Arrange
        let (x, y, est, fitted) = line_fixture();
        let objective = LineSsr { x: x.clone(), y: y.clone() };
        let residuals = ResidualInputs {
            y: y.view(),
            fitted: fitted.view(),
            weights: None,
            n_terms: 2,
            n_x_arrays: 1,
            true_frequencies: false,
        };
        let steps = array![0.1, 0.1];
        let inputs = PseudoLinearInputs {
            estimates: &est,
            fallback_steps: &steps,
            fractional_delta: 1e-4,
            residuals,
            iterations: 12,
            restarts: 3,
        };
        let mut design = Array2::ones((2, 4));
        design.row_mut(1).assign(&x);

        // Act
        let numeric = pseudo_linear_statistics(&objective, &inputs).unwrap();
        let exact = analytic_statistics(&design, &est, &residuals).unwrap();

        // Assert
        assert!(numeric.hessian_invertible);
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(
                    numeric.covariance()[[i, j]],
                    exact.covariance()[[i, j]],
                    max_relative = 1e-5
                );
            }
        }
        // Conditional variance of b given a: σ²/Σx².
        let pseudo = numeric.pseudo_sd.as_ref().unwrap();
        assert_relative_eq!(pseudo[1], (numeric.residual_scale / 14.0).sqrt(), max_relative = 1e-5);
        assert_eq!(numeric.iterations, 12);
        assert_eq!(numeric.restarts, 3);
    }

    #[test]
    // Purpose
    // -------
    // A flat direction makes the Hessian singular; the fit still reports.
    fn singular_hessian_clears_flag_without_error() {
        let est = array![1.0, 5.0];
        let steps = array![0.1, 0.1];
        let y = array![1.0, 2.0, 3.0, 4.0];
        let fitted = array![1.1, 2.0, 2.9, 4.0];
        let inputs = PseudoLinearInputs {
            estimates: &est,
            fallback_steps: &steps,
            fractional_delta: 1e-4,
            residuals: ResidualInputs {
                y: y.view(),
                fitted: fitted.view(),
                weights: None,
                n_terms: 2,
                n_x_arrays: 1,
                true_frequencies: false,
            },
            iterations: 0,
            restarts: 0,
        };

        let stats = pseudo_linear_statistics(&Flat, &inputs).unwrap();

        assert!(!stats.hessian_invertible);
        assert!(stats.standard_errors().iter().all(|v| v.is_nan()));
        assert!(stats.correlation().iter().all(|v| v.is_nan()));
        assert!(stats.pseudo_sd.as_ref().unwrap()[1].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // A zero estimate uses the original step and is flagged.
    fn zero_estimate_flags_step_substitution() {
        let (x, y, _, _) = line_fixture();
        let objective = LineSsr { x: x.clone(), y: y.clone() };
        let est = array![0.0, 0.94];
        let fitted = x.mapv(|v| 0.94 * v);
        let steps = array![0.05, 0.1];
        let inputs = PseudoLinearInputs {
            estimates: &est,
            fallback_steps: &steps,
            fractional_delta: 1e-4,
            residuals: ResidualInputs {
                y: y.view(),
                fitted: fitted.view(),
                weights: None,
                n_terms: 2,
                n_x_arrays: 1,
                true_frequencies: false,
            },
            iterations: 0,
            restarts: 0,
        };

        let stats = pseudo_linear_statistics(&objective, &inputs).unwrap();

        assert_eq!(stats.step_substituted, vec![true, false]);
        assert!(stats.parameters.coefficient_of_variation[0].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // The fractional delta sets the differencing step, which the pseudo-sd
    // of a non-quadratic objective reflects.
    //
    // Given
    // -----
    // - Quartic objective at its minimum θ = 1, unit weights (σ² = 1).
    // - Deltas 0.1 (from `with_fractional_delta`) and the default 1e-4.
    //
    // Expect
    // ------
    // - pseudo-sd = sqrt(2 / (2 + 2h²)) with h = delta.
    fn fractional_delta_sets_difference_step() {
        // Arrange
        let est = array![1.0];
        let steps = array![0.5];
        let y = array![1.0, 2.0, 3.0];
        let fitted = array![1.1, 1.9, 3.0];
        let w = array![1.0, 1.0, 1.0];
        let coarse = SimplexOptions::default().with_fractional_delta(0.1).unwrap();
        let fine = SimplexOptions::default();
        let inputs_for = |delta: f64| PseudoLinearInputs {
            estimates: &est,
            fallback_steps: &steps,
            fractional_delta: delta,
            residuals: ResidualInputs {
                y: y.view(),
                fitted: fitted.view(),
                weights: Some(w.view()),
                n_terms: 1,
                n_x_arrays: 1,
                true_frequencies: false,
            },
            iterations: 0,
            restarts: 0,
        };

        // Act
        let wide = pseudo_linear_statistics(&Quartic, &inputs_for(coarse.fractional_delta)).unwrap();
        let narrow = pseudo_linear_statistics(&Quartic, &inputs_for(fine.fractional_delta)).unwrap();

        // Assert
        let expected = |h: f64| (2.0 / (2.0 + 2.0 * h * h)).sqrt();
        assert_relative_eq!(wide.pseudo_sd.unwrap()[0], expected(0.1), epsilon = 1e-10);
        assert_relative_eq!(narrow.pseudo_sd.unwrap()[0], expected(1e-4), epsilon = 1e-6);
        assert_eq!(wide.step_substituted, vec![false]);
    }
}
