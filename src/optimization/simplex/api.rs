//! Public entrypoint for simplex minimization.
use argmin::core::CostFunction;

use crate::optimization::{
    errors::OptResult,
    numerical_stability::to_scaled,
    simplex::{
        adapter::ScaledObjective,
        run::{ConvergenceCriterion, run_simplex},
        traits::{OptimOutcome, ResidualReference, SimplexOptions},
        types::{Cost, Theta},
        validation::{validate_start, validate_steps},
    },
};

/// Minimize an objective with the Nelder–Mead simplex.
///
/// The search starts at `start` with per-parameter initial `steps` (both in
/// model space). Parameters are rescaled according to `opts.scaling` for the
/// search and mapped back before every evaluation, so `objective` only ever
/// sees model-space vectors.
///
/// `reference` supplies the degrees of freedom and mean absolute response the
/// [`ConvergenceTest::ResidualScale`](super::ConvergenceTest::ResidualScale)
/// rule needs; it is ignored by the simplex-spread rule.
///
/// # Returns
/// An [`OptimOutcome`] holding the best vertex, its value, the iteration,
/// restart, and evaluation counts, the per-iteration best values, and the
/// final simplex. `grad_norm` is left as `None`.
///
/// # Errors
/// - [`OptError::EmptyParameters`](crate::optimization::errors::OptError::EmptyParameters)
///   / `InvalidStartValue` for a bad start vector.
/// - `StepLengthMismatch` / `InvalidStep` for bad steps (a zero step is fatal).
/// - `ScaleLengthMismatch` / `InvalidScaleFactor` for bad custom scaling.
/// - `InvalidConvergenceTest` when the residual-scale rule lacks a reference.
/// - `NonFiniteCost` if the objective is not finite at `start`.
/// - Any error the objective itself returns.
///
/// # Examples
/// ```ignore
/// let out = minimize(&objective, &array![1.0, 1.0], &array![0.2, 0.2], &SimplexOptions::default(), None)?;
/// println!("{} after {} iterations", out.status, out.iterations);
/// ```
pub fn minimize<O>(
    objective: &O, start: &Theta, steps: &Theta, opts: &SimplexOptions,
    reference: Option<ResidualReference>,
) -> OptResult<OptimOutcome>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    validate_start(start)?;
    validate_steps(steps, start.len())?;
    let factors = opts.scaling.factors(start)?;
    let criterion = ConvergenceCriterion::new(opts, reference)?;

    let scaled_start = to_scaled(start, &factors);
    let scaled_steps = to_scaled(steps, &factors);
    let scaled = ScaledObjective::new(objective, factors);

    let run = run_simplex(&scaled, &scaled_start, &scaled_steps, opts, criterion)?;
    let best = run.state.lowest();

    Ok(OptimOutcome {
        theta_hat: scaled.unscale(run.state.vertex(best)),
        value: run.state.value(best),
        converged: run.converged,
        status: OptimOutcome::status_for(run.converged),
        iterations: run.iterations,
        restarts: run.restarts,
        fn_evals: scaled.evals(),
        simplex_sd: run.state.sd(),
        history: run.history,
        simplex: run.state.vertices().iter().map(|z| scaled.unscale(z)).collect(),
        simplex_values: run.state.values().to_vec(),
        grad_norm: None,
    })
}
