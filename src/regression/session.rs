//! regression::session — one dataset, its constraints, and the latest fit.
//!
//! Purpose
//! -------
//! Orchestrate a fit over one [`Dataset`]: check the degrees of freedom,
//! dispatch to the weighted least-squares solver or the simplex, run the
//! matching statistics estimator, and keep the result for the read
//! accessors.
//!
//! Key behaviors
//! -------------
//! - [`Regression::fit_linear`] solves the normal equations for a design
//!   matrix and derives analytic statistics.
//! - [`Regression::fit_nonlinear`] minimizes the penalized sum of squares
//!   with the simplex, picks the best feasible vertex, re-evaluates it
//!   without penalty, and derives pseudo-linear statistics from the plain
//!   objective.
//! - Constraints accumulate across fits until [`Regression::clear_constraints`].
//!
//! Invariants & assumptions
//! ------------------------
//! - A failed fit leaves the previous result untouched.
//! - Non-convergence and singular Hessians are flags on [`FitResult`], never
//!   errors.
//! - Fits are synchronous; a session is not shared across threads while a fit
//!   runs.
//!
//! Downstream usage
//! ----------------
//! - Distribution-specific front-ends supply a [`ModelFunction`], a start
//!   vector, and steps, then read estimates and statistics through the
//!   accessors below.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the degrees-of-freedom gate, error atomicity, and
//!   agreement of the two fit paths on a straight line. End-to-end scenarios
//!   live in `tests/integration_regression_pipeline.rs`.
use ndarray::{Array1, Array2};

use crate::{
    inference::{
        analytic::analytic_statistics,
        hessian::{PseudoLinearInputs, pseudo_linear_statistics},
        statistics::{FitStatistics, ResidualInputs},
    },
    optimization::{
        constraints::{ConstraintDirection, ConstraintSet, MultiConstraint, SingleConstraint},
        simplex::{
            api::minimize,
            finite_diff::gradient_norm,
            traits::{OptimOutcome, ResidualReference, SimplexOptions},
            types::Theta,
        },
    },
    regression::{
        data::Dataset,
        errors::{RegressionError, RegressionResult},
        linear::solve_weighted_least_squares,
        model::ModelFunction,
        objective::SumOfSquares,
        options::RegressionOptions,
    },
};

/// Result of the latest successful fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Best parameter vector: linear coefficients or the best feasible vertex.
    pub estimates: Array1<f64>,
    /// Covariance, per-parameter inference, and goodness of fit.
    pub statistics: FitStatistics,
    /// Model predictions at every sample.
    pub fitted: Array1<f64>,
    /// Always `true` for linear fits.
    pub converged: bool,
    /// Simplex diagnostics; `None` for linear fits.
    pub outcome: Option<OptimOutcome>,
}

/// Fitting session over one dataset.
///
/// Owns the data, the session options, the accumulated constraints, and the
/// latest successful [`FitResult`].
#[derive(Debug, Clone)]
pub struct Regression {
    data: Dataset,
    options: RegressionOptions,
    constraints: ConstraintSet,
    fit: Option<FitResult>,
}

impl Regression {
    /// Session with default [`RegressionOptions`] and no constraints.
    pub fn new(data: Dataset) -> Self {
        Self::with_options(data, RegressionOptions::default())
    }

    /// Session with explicit options.
    ///
    /// Parameters
    /// ----------
    /// - `data`: [`Dataset`]
    ///   Validated snapshot fitted by every call on this session.
    /// - `options`: [`RegressionOptions`]
    ///   Degrees-of-freedom override and true-frequency mode.
    pub fn with_options(data: Dataset, options: RegressionOptions) -> Self {
        Self { data, options, constraints: ConstraintSet::new(), fit: None }
    }

    /// Dataset every fit on this session uses.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Copy of the session options.
    pub fn options(&self) -> RegressionOptions {
        self.options
    }

    /// Fit a model that is linear in its parameters.
    ///
    /// `design` is `nTerms × nData`, one row per basis function.
    ///
    /// # Errors
    /// - [`RegressionError::InsufficientDegreesOfFreedom`] unless the check is
    ///   disabled.
    /// - Solver errors from
    ///   [`solve_weighted_least_squares`](crate::regression::linear::solve_weighted_least_squares).
    /// - [`RegressionError::Inference`] if the statistics cannot be derived.
    pub fn fit_linear(&mut self, design: &Array2<f64>) -> RegressionResult<&FitResult> {
        let n_terms = design.nrows();
        self.check_degrees_of_freedom(n_terms)?;

        let weights = self.data.weights_view();
        let coefficients = solve_weighted_least_squares(design, self.data.y().view(), weights)?;
        let fitted = design.t().dot(&coefficients);
        let inputs = self.residual_inputs(&fitted, n_terms);
        let statistics = analytic_statistics(design, &coefficients, &inputs)?;

        log::info!(
            "linear fit: {} terms, {} samples, sum of squares {:.6e}",
            n_terms,
            self.data.n_data(),
            statistics.goodness.sum_of_squares
        );
        let result =
            FitResult { estimates: coefficients, statistics, fitted, converged: true, outcome: None };
        Ok(&*self.fit.insert(result))
    }

    /// Fit an arbitrary model with the penalized simplex.
    ///
    /// `start` and `steps` have one entry per parameter; every step must be
    /// non-zero. Steps also serve as finite-difference fallbacks for zero
    /// estimates.
    ///
    /// # Errors
    /// - [`RegressionError::InsufficientDegreesOfFreedom`] unless the check is
    ///   disabled.
    /// - [`RegressionError::Optimization`] for invalid start/steps/options and
    ///   constraint indices `>= start.len()`.
    /// - [`RegressionError::Inference`] if the statistics cannot be derived.
    pub fn fit_nonlinear<M>(
        &mut self, model: &M, start: &Theta, steps: &Theta, opts: &SimplexOptions,
    ) -> RegressionResult<&FitResult>
    where
        M: ModelFunction + ?Sized,
    {
        let n_terms = start.len();
        self.check_degrees_of_freedom(n_terms)?;
        self.constraints.validate(n_terms)?;

        let penalized = SumOfSquares::new(model, &self.data).with_constraints(
            &self.constraints,
            opts.penalty_weight,
            opts.constraint_tolerance,
        );
        let reference = ResidualReference {
            degrees_of_freedom: self.data.n_data().saturating_sub(n_terms),
            y_abs_mean: self.data.y_abs_mean(),
        };
        let mut outcome = minimize(&penalized, start, steps, opts, Some(reference))?;

        let estimates = best_feasible_vertex(&penalized, &outcome);
        let plain = SumOfSquares::new(model, &self.data);
        outcome.value = plain.unconstrained_value(&estimates);
        outcome.theta_hat = estimates.clone();
        outcome.grad_norm = gradient_norm(&plain, &estimates)?;

        let fitted = plain.fitted_values(&estimates);
        let inputs = PseudoLinearInputs {
            estimates: &estimates,
            fallback_steps: steps,
            fractional_delta: opts.fractional_delta,
            residuals: self.residual_inputs(&fitted, n_terms),
            iterations: outcome.iterations,
            restarts: outcome.restarts,
        };
        let statistics = pseudo_linear_statistics(&plain, &inputs)?;

        log::info!(
            "nonlinear fit: {} after {} iterations and {} restarts, sum of squares {:.6e}",
            outcome.status,
            outcome.iterations,
            outcome.restarts,
            outcome.value
        );
        let result = FitResult {
            estimates,
            statistics,
            fitted,
            converged: outcome.converged,
            outcome: Some(outcome),
        };
        Ok(&*self.fit.insert(result))
    }

    // ---- Constraints ----

    /// Append a bound on one parameter.
    ///
    /// # Errors
    /// [`RegressionError::Optimization`] for a non-finite bound.
    pub fn add_single_constraint(
        &mut self, index: usize, direction: ConstraintDirection, bound: f64,
    ) -> RegressionResult<()> {
        self.constraints.add_single(SingleConstraint::new(index, direction, bound)?);
        Ok(())
    }

    /// Append a bound on the signed sum `Σ signsᵢ·θ[indicesᵢ]`.
    ///
    /// # Errors
    /// [`RegressionError::Optimization`] for mismatched lengths, an empty
    /// index list, or non-finite signs/bound.
    pub fn add_multi_constraint(
        &mut self, indices: Vec<usize>, signs: Vec<f64>, direction: ConstraintDirection, bound: f64,
    ) -> RegressionResult<()> {
        self.constraints.add_multi(MultiConstraint::new(indices, signs, direction, bound)?);
        Ok(())
    }

    /// Drop every constraint; the latest fit result is kept.
    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
    }

    /// Constraints applied to the next nonlinear fit.
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    // ---- Accessors ----

    /// Latest successful fit.
    ///
    /// # Errors
    /// [`RegressionError::NotFitted`] before the first successful fit.
    pub fn fit_result(&self) -> RegressionResult<&FitResult> {
        self.fit.as_ref().ok_or(RegressionError::NotFitted)
    }

    /// Statistics of the latest fit.
    ///
    /// # Errors
    /// [`RegressionError::NotFitted`] before the first successful fit; the
    /// accessors below share this rule.
    pub fn statistics(&self) -> RegressionResult<&FitStatistics> {
        Ok(&self.fit_result()?.statistics)
    }

    /// Best parameter vector of the latest fit.
    pub fn best_estimates(&self) -> RegressionResult<&Array1<f64>> {
        Ok(&self.fit_result()?.estimates)
    }

    /// Per-parameter standard errors; `NaN` where undefined.
    pub fn standard_errors(&self) -> RegressionResult<&Array1<f64>> {
        Ok(self.statistics()?.standard_errors())
    }

    pub fn covariance(&self) -> RegressionResult<&Array2<f64>> {
        Ok(self.statistics()?.covariance())
    }

    pub fn correlation(&self) -> RegressionResult<&Array2<f64>> {
        Ok(self.statistics()?.correlation())
    }

    pub fn t_values(&self) -> RegressionResult<&Array1<f64>> {
        Ok(&self.statistics()?.parameters.t_values)
    }

    pub fn p_values(&self) -> RegressionResult<&Array1<f64>> {
        Ok(&self.statistics()?.parameters.p_values)
    }

    /// Unweighted `Σ(y − ŷ)²`.
    pub fn sum_of_squares(&self) -> RegressionResult<f64> {
        Ok(self.statistics()?.goodness.sum_of_squares)
    }

    /// `None` unless the data are weighted or in true-frequency mode.
    pub fn chi_square(&self) -> RegressionResult<Option<f64>> {
        Ok(self.statistics()?.goodness.chi_square)
    }

    /// `χ² / ν`; `None` whenever `chi_square` is.
    pub fn reduced_chi_square(&self) -> RegressionResult<Option<f64>> {
        Ok(self.statistics()?.goodness.reduced_chi_square)
    }

    pub fn iterations(&self) -> RegressionResult<usize> {
        Ok(self.statistics()?.iterations)
    }

    pub fn restarts(&self) -> RegressionResult<usize> {
        Ok(self.statistics()?.restarts)
    }

    /// Simplex convergence flag; always `true` after a linear fit.
    pub fn converged(&self) -> RegressionResult<bool> {
        Ok(self.fit_result()?.converged)
    }

    pub fn fitted_values(&self) -> RegressionResult<&Array1<f64>> {
        Ok(&self.fit_result()?.fitted)
    }

    /// `y − ŷ` for every sample.
    pub fn residuals(&self) -> RegressionResult<Array1<f64>> {
        Ok(self.data.y() - &self.fit_result()?.fitted)
    }

    /// `(y − ŷ)/w` for every sample.
    pub fn weighted_residuals(&self) -> RegressionResult<Array1<f64>> {
        Ok(self.residuals()? / self.data.weights())
    }

    // ---- Helper methods ----

    fn check_degrees_of_freedom(&self, n_terms: usize) -> RegressionResult<()> {
        let n_data = self.data.n_data();
        if !self.options.ignore_dof_check && n_data <= n_terms {
            return Err(RegressionError::InsufficientDegreesOfFreedom { n_data, n_terms });
        }
        Ok(())
    }

    fn residual_inputs<'a>(&'a self, fitted: &'a Array1<f64>, n_terms: usize) -> ResidualInputs<'a> {
        ResidualInputs {
            y: self.data.y().view(),
            fitted: fitted.view(),
            weights: self.data.weights_view(),
            n_terms,
            n_x_arrays: self.data.n_x_arrays(),
            true_frequencies: self.options.true_frequencies,
        }
    }
}

/// Lowest feasible vertex of the final simplex, or the lowest vertex when
/// none is feasible.
fn best_feasible_vertex<M>(objective: &SumOfSquares<'_, M>, outcome: &OptimOutcome) -> Theta
where
    M: ModelFunction + ?Sized,
{
    let best = outcome
        .simplex
        .iter()
        .zip(outcome.simplex_values.iter())
        .filter(|(vertex, _)| objective.is_feasible(vertex))
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(vertex, _)| vertex.clone());
    match best {
        Some(vertex) => vertex,
        None => {
            log::warn!("no feasible vertex in the final simplex; reporting the lowest vertex");
            outcome.theta_hat.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{inference::errors::InferenceError, optimization::errors::OptError};
    use approx::assert_relative_eq;
    use ndarray::{ArrayView1, array};

    struct Line;

    impl ModelFunction for Line {
        fn evaluate(&self, p: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>, _series: usize) -> f64 {
            p[0] + p[1] * x[0]
        }
    }

    fn noisy_line() -> Regression {
        let x = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = array![1.1, 2.9, 5.2, 6.8, 9.1];
        Regression::new(Dataset::from_single(x, y, None).unwrap())
    }

    fn line_design(session: &Regression) -> Array2<f64> {
        crate::regression::linear::design_with_intercept(session.data())
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - NotFitted accessors and the degrees-of-freedom gate with its override.
    // - Atomicity: a rejected fit keeps the previous result.
    // - Agreement of the linear and nonlinear paths on a straight line.
    // - Constraint index validation at fit start.
    // -------------------------------------------------------------------------

    #[test]
    fn accessors_before_fit_report_not_fitted() {
        let session = noisy_line();

        assert_eq!(session.best_estimates(), Err(RegressionError::NotFitted));
        assert_eq!(session.converged(), Err(RegressionError::NotFitted));
        assert_eq!(session.residuals(), Err(RegressionError::NotFitted));
    }

    #[test]
    // Purpose
    // -------
    // With as many terms as samples the fit is rejected, unless the override
    // is set, in which case standard errors are undefined.
    fn dof_gate_and_override() {
        // Arrange
        let x = array![0.0, 1.0];
        let y = array![1.0, 3.0];
        let strict = Dataset::from_single(x.clone(), y.clone(), None).unwrap();
        let relaxed = Dataset::from_single(x, y, None).unwrap();
        let mut strict = Regression::new(strict);
        let mut relaxed = Regression::with_options(
            relaxed,
            RegressionOptions::default().with_ignore_dof_check(true),
        );
        let design = line_design(&strict);

        // Act
        let rejected = strict.fit_linear(&design).map(|_| ());
        let accepted = relaxed.fit_linear(&design).map(|fit| fit.estimates.clone());

        // Assert
        assert_eq!(
            rejected,
            Err(RegressionError::InsufficientDegreesOfFreedom { n_data: 2, n_terms: 2 })
        );
        let estimates = accepted.unwrap();
        assert_relative_eq!(estimates[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(estimates[1], 2.0, epsilon = 1e-12);
        assert!(relaxed.standard_errors().unwrap().iter().all(|s| s.is_nan()));
    }

    #[test]
    // Purpose
    // -------
    // A nonlinear fit rejected at entry leaves the earlier linear fit intact.
    fn rejected_fit_keeps_previous_result() {
        let mut session = noisy_line();
        let design = line_design(&session);
        let linear = session.fit_linear(&design).unwrap().estimates.clone();

        let err = session
            .fit_nonlinear(&Line, &array![1.0, 1.0], &array![0.1, 0.0], &SimplexOptions::default())
            .map(|_| ());

        assert!(matches!(
            err,
            Err(RegressionError::Optimization(OptError::InvalidStep { index: 1, .. }))
        ));
        assert_eq!(session.best_estimates().unwrap(), &linear);
        assert!(session.fit_result().unwrap().outcome.is_none());
    }

    #[test]
    // Purpose
    // -------
    // The simplex and the normal equations agree on a straight line, and the
    // pseudo-linear standard errors match the analytic ones.
    //
    // Given
    // -----
    // - Noisy line data, start (0.5, 1.5), steps (0.1, 0.1), default options.
    //
    // Expect
    // ------
    // - Estimates within 1e-3 and standard errors within 1% of the linear fit.
    fn nonlinear_path_agrees_with_linear_path() {
        // Arrange
        let mut session = noisy_line();
        let design = line_design(&session);
        let linear = session.fit_linear(&design).unwrap().clone();

        // Act
        let fit = session
            .fit_nonlinear(
                &Line,
                &array![0.5, 1.5],
                &array![0.1, 0.1],
                &SimplexOptions::default(),
            )
            .unwrap()
            .clone();

        // Assert
        assert!(fit.converged);
        for i in 0..2 {
            assert_relative_eq!(fit.estimates[i], linear.estimates[i], epsilon = 1e-3);
            assert_relative_eq!(
                fit.statistics.standard_errors()[i],
                linear.statistics.standard_errors()[i],
                max_relative = 1e-2
            );
        }
        let outcome = fit.outcome.unwrap();
        assert_relative_eq!(outcome.value, session.sum_of_squares().unwrap(), max_relative = 1e-12);
        assert!(outcome.grad_norm.is_some());
        assert_eq!(session.iterations().unwrap(), outcome.iterations);
    }

    #[test]
    fn residual_accessors_match_fitted_values() {
        let x = array![0.0, 1.0, 2.0, 3.0];
        let y = array![1.0, 2.5, 5.5, 7.0];
        let w = array![1.0, 2.0, 0.5, 1.0];
        let mut session = Regression::new(Dataset::from_single(x, y.clone(), Some(w.clone())).unwrap());
        let design = line_design(&session);

        session.fit_linear(&design).unwrap();

        let fitted = session.fitted_values().unwrap().clone();
        let residuals = session.residuals().unwrap();
        let weighted = session.weighted_residuals().unwrap();
        for k in 0..4 {
            assert_relative_eq!(residuals[k], y[k] - fitted[k]);
            assert_relative_eq!(weighted[k], (y[k] - fitted[k]) / w[k]);
        }
        assert!(session.chi_square().unwrap().is_some());
    }

    #[test]
    // Purpose
    // -------
    // True-frequency mode reports the Pearson chi-square of a linear fit.
    //
    // Given
    // -----
    // - Counts y = (10, 13, 15, 19, 20) at x = 0..4; OLS line 10.2 + 2.6x.
    //
    // Expect
    // ------
    // - χ² = Σ(y − ŷ)²/ŷ ≈ 0.09047 and reduced χ² = χ²/3.
    // - Without the switch, unweighted data report no chi-square.
    fn true_frequency_mode_reports_pearson_chi_square() {
        // Arrange
        let x = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = array![10.0, 13.0, 15.0, 19.0, 20.0];
        let options = RegressionOptions::default().with_true_frequencies(true);
        let data = Dataset::from_single(x.clone(), y.clone(), None).unwrap();
        let mut counts = Regression::with_options(data, options);
        let mut plain = Regression::new(Dataset::from_single(x, y.clone(), None).unwrap());
        let design = line_design(&counts);

        // Act
        counts.fit_linear(&design).unwrap();
        plain.fit_linear(&design).unwrap();

        // Assert
        let fitted = array![10.2, 12.8, 15.4, 18.0, 20.6];
        let expected: f64 =
            y.iter().zip(fitted.iter()).map(|(yk, fk)| (yk - fk).powi(2) / fk).sum();
        let chi = counts.chi_square().unwrap().unwrap();
        assert_relative_eq!(chi, expected, max_relative = 1e-9);
        assert_relative_eq!(chi, 0.090_467, epsilon = 1e-5);
        let reduced = counts.reduced_chi_square().unwrap().unwrap();
        assert_relative_eq!(reduced, expected / 3.0, max_relative = 1e-9);
        assert_eq!(plain.chi_square(), Ok(None));
    }

    #[test]
    fn constraint_indices_are_checked_at_fit_start() {
        let mut session = noisy_line();
        session.add_single_constraint(5, ConstraintDirection::NotBelow, 0.0).unwrap();

        let err = session
            .fit_nonlinear(&Line, &array![1.0, 1.0], &array![0.1, 0.1], &SimplexOptions::default())
            .map(|_| ());

        assert_eq!(
            err,
            Err(RegressionError::Optimization(OptError::ConstraintIndexOutOfRange {
                index: 5,
                n_terms: 2
            }))
        );
        session.clear_constraints();
        assert!(session.constraints().is_empty());
    }

    #[test]
    fn invalid_constraints_are_rejected_on_insertion() {
        let mut session = noisy_line();

        let err = session.add_multi_constraint(
            vec![0, 1],
            vec![1.0],
            ConstraintDirection::NotAbove,
            1.0,
        );

        assert!(matches!(err, Err(RegressionError::Optimization(_))));
        assert!(session.constraints().is_empty());
        // Inference errors convert into the session error type.
        let wrapped: RegressionError = InferenceError::EmptyParameters.into();
        assert!(matches!(wrapped, RegressionError::Inference(_)));
    }
}
