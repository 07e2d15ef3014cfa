//! Execution loop for the Nelder–Mead simplex with restarts.
//!
//! [`run_simplex`] drives a [`SimplexState`] through reflection, expansion,
//! contraction, and shrink moves until the [`ConvergenceCriterion`] is met,
//! then restarts around the best vertex up to `max_restarts` times. The
//! iteration cap is shared by every restart.
use argmin::core::CostFunction;

use crate::optimization::{
    errors::{OptError, OptResult},
    simplex::{
        adapter::ScaledObjective,
        state::SimplexState,
        traits::{Coefficients, ConvergenceTest, ResidualReference, SimplexOptions},
        types::{Cost, Theta},
    },
};

/// Stopping rule resolved against the data it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergenceCriterion {
    SimplexSd { tolerance: f64 },
    ResidualScale { threshold: f64, degrees_of_freedom: f64 },
}

impl ConvergenceCriterion {
    /// # Errors
    /// Returns [`OptError::InvalidConvergenceTest`] when the residual-scale
    /// test is requested without a reference or with zero degrees of freedom.
    pub fn new(opts: &SimplexOptions, reference: Option<ResidualReference>) -> OptResult<Self> {
        match opts.convergence {
            ConvergenceTest::SimplexSd => Ok(Self::SimplexSd { tolerance: opts.tolerance }),
            ConvergenceTest::ResidualScale => {
                let reference = match reference {
                    Some(r) if r.degrees_of_freedom > 0 => r,
                    _ => {
                        return Err(OptError::InvalidConvergenceTest {
                            name: "residual_scale".to_string(),
                            reason: "Requires positive degrees of freedom and a data reference.",
                        });
                    }
                };
                Ok(Self::ResidualScale {
                    threshold: opts.tolerance * reference.y_abs_mean,
                    degrees_of_freedom: reference.degrees_of_freedom as f64,
                })
            }
        }
    }

    pub fn is_met(&self, state: &SimplexState) -> bool {
        match *self {
            Self::SimplexSd { tolerance } => state.sd() < tolerance,
            Self::ResidualScale { threshold, degrees_of_freedom } => {
                (state.value(state.lowest()) / degrees_of_freedom).sqrt() < threshold
            }
        }
    }
}

/// Raw result of a simplex run, still in scaled space.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexRun {
    pub state: SimplexState,
    pub converged: bool,
    pub iterations: usize,
    pub restarts: usize,
    pub history: Vec<Cost>,
}

/// Run the simplex from `start` (scaled space) with scaled `steps`.
///
/// # Errors
/// - [`OptError::NonFiniteCost`] if the start value is not finite.
/// - Any error raised by the objective, converted through `From<argmin::core::Error>`.
pub fn run_simplex<O>(
    objective: &ScaledObjective<'_, O>, start: &Theta, steps: &Theta, opts: &SimplexOptions,
    criterion: ConvergenceCriterion,
) -> OptResult<SimplexRun>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    let start_value = objective.raw_cost(start)?;
    if !start_value.is_finite() {
        return Err(OptError::NonFiniteCost { value: start_value });
    }
    let mut state = SimplexState::initialize(start, start_value, steps, objective)?;
    let mut iterations = 0;
    let mut restarts = 0;
    let mut history = Vec::new();

    let converged = loop {
        if criterion.is_met(&state) {
            if restarts == opts.max_restarts {
                break true;
            }
            restarts += 1;
            let best = state.lowest();
            log::debug!(
                "simplex restart {restarts} after {iterations} iterations at value {:e}",
                state.value(best)
            );
            let anchor = state.vertex(best).clone();
            state = SimplexState::initialize(&anchor, state.value(best), steps, objective)?;
            continue;
        }
        if iterations >= opts.max_iter {
            log::warn!(
                "simplex stopped at the iteration cap ({}) with spread {:e}",
                opts.max_iter,
                state.sd()
            );
            break false;
        }
        iterate(&mut state, &opts.coefficients, objective)?;
        iterations += 1;
        history.push(state.value(state.lowest()));
    };

    Ok(SimplexRun { state, converged, iterations, restarts, history })
}

/// One Nelder–Mead iteration: replace, contract, or shrink around the worst vertex.
fn iterate<O>(
    state: &mut SimplexState, coefficients: &Coefficients, objective: &ScaledObjective<'_, O>,
) -> OptResult<()>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    let Coefficients { reflection, expansion, contraction } = *coefficients;
    let ihi = state.highest();
    let ilo = state.lowest();
    let ylo = state.value(ilo);
    let centroid = state.centroid_excluding(ihi);

    let reflected = &centroid * (1.0 + reflection) - state.vertex(ihi) * reflection;
    let y_reflected = objective.cost(&reflected)?;

    if y_reflected < ylo {
        let expanded = &reflected * (1.0 + expansion) - &centroid * expansion;
        let y_expanded = objective.cost(&expanded)?;
        if y_expanded < y_reflected {
            state.replace(ihi, expanded, y_expanded);
        } else {
            state.replace(ihi, reflected, y_reflected);
        }
        return Ok(());
    }

    if !state.no_better_than_others(y_reflected, ihi) {
        state.replace(ihi, reflected, y_reflected);
        return Ok(());
    }

    if y_reflected <= state.value(ihi) {
        state.replace(ihi, reflected, y_reflected);
    }
    let contracted = state.vertex(ihi) * contraction + &centroid * (1.0 - contraction);
    let y_contracted = objective.cost(&contracted)?;
    if y_contracted > state.value(ihi) {
        state.shrink(ilo, objective)?;
    } else {
        state.replace(ihi, contracted, y_contracted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::Error;
    use ndarray::{Array1, array};

    struct Rosenbrock;

    impl CostFunction for Rosenbrock {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, p: &Theta) -> Result<Cost, Error> {
            Ok(100.0 * (p[1] - p[0] * p[0]).powi(2) + (1.0 - p[0]).powi(2))
        }
    }

    struct Bowl;

    impl CostFunction for Bowl {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, p: &Theta) -> Result<Cost, Error> {
            Ok((p[0] - 1.0).powi(2) + 4.0 * (p[1] + 2.0).powi(2))
        }
    }

    fn opts(tol: f64, max_iter: usize) -> SimplexOptions {
        SimplexOptions::new(tol, max_iter).unwrap()
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence of the full loop on smooth test functions.
    // - The iteration cap, restart accounting, and the value history.
    // - Criterion construction for the residual-scale test.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The simplex reaches the Rosenbrock minimum from the classic start.
    //
    // Given
    // -----
    // - Start (-1.2, 1), steps (0.1, 0.1), tolerance 1e-12.
    //
    // Expect
    // ------
    // - Converged within 1e-3 of (1, 1), with every restart used.
    fn run_simplex_minimizes_rosenbrock() {
        // Arrange
        let objective = ScaledObjective::new(&Rosenbrock, Array1::ones(2));
        let options = opts(1e-12, 5000);
        let criterion = ConvergenceCriterion::new(&options, None).unwrap();

        // Act
        let run =
            run_simplex(&objective, &array![-1.2, 1.0], &array![0.1, 0.1], &options, criterion)
                .unwrap();

        // Assert
        let best = run.state.vertex(run.state.lowest());
        assert!(run.converged);
        assert_eq!(run.restarts, 3);
        assert!((best[0] - 1.0).abs() < 1e-3);
        assert!((best[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // The recorded best value never increases, across restarts included.
    fn history_is_non_increasing() {
        let objective = ScaledObjective::new(&Bowl, Array1::ones(2));
        let options = opts(1e-10, 2000);
        let criterion = ConvergenceCriterion::new(&options, None).unwrap();

        let run = run_simplex(&objective, &array![5.0, 5.0], &array![1.0, 1.0], &options, criterion)
            .unwrap();

        assert_eq!(run.history.len(), run.iterations);
        assert!(run.history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    // Purpose
    // -------
    // Hitting the iteration cap returns the best point so far, unconverged.
    fn iteration_cap_reports_not_converged() {
        let objective = ScaledObjective::new(&Rosenbrock, Array1::ones(2));
        let options = opts(1e-14, 5);
        let criterion = ConvergenceCriterion::new(&options, None).unwrap();

        let run =
            run_simplex(&objective, &array![-1.2, 1.0], &array![0.1, 0.1], &options, criterion)
                .unwrap();

        assert!(!run.converged);
        assert_eq!(run.iterations, 5);
        assert!(run.state.value(run.state.lowest()) <= 24.2);
    }

    #[test]
    // Purpose
    // -------
    // With the restart cap at zero the run stops at the first convergence;
    // the default cap continues past it and uses every restart.
    fn restart_cap_zero_stops_at_first_convergence() {
        // Arrange
        let objective = ScaledObjective::new(&Bowl, Array1::ones(2));
        let single = opts(1e-10, 2000).with_restarts(0);
        let repeated = opts(1e-10, 2000);
        let start = array![5.0, 5.0];
        let steps = array![1.0, 1.0];

        // Act
        let once = run_simplex(
            &objective,
            &start,
            &steps,
            &single,
            ConvergenceCriterion::new(&single, None).unwrap(),
        )
        .unwrap();
        let thrice = run_simplex(
            &objective,
            &start,
            &steps,
            &repeated,
            ConvergenceCriterion::new(&repeated, None).unwrap(),
        )
        .unwrap();

        // Assert
        assert!(once.converged);
        assert_eq!(once.restarts, 0);
        assert_eq!(thrice.restarts, 3);
        assert!(once.iterations < thrice.iterations);
        assert_eq!(&thrice.history[..once.iterations], &once.history[..]);
    }

    #[test]
    // Purpose
    // -------
    // Non-default reflection, expansion, and contraction coefficients still
    // reach the minimum.
    fn custom_coefficients_converge() {
        let objective = ScaledObjective::new(&Bowl, Array1::ones(2));
        let coefficients = Coefficients::new(1.5, 2.5, 0.3).unwrap();
        let options = opts(1e-12, 3000).with_coefficients(coefficients);
        let criterion = ConvergenceCriterion::new(&options, None).unwrap();

        let run = run_simplex(&objective, &array![5.0, 5.0], &array![1.0, 1.0], &options, criterion)
            .unwrap();

        let best = run.state.vertex(run.state.lowest());
        assert!(run.converged);
        assert!((best[0] - 1.0).abs() < 1e-4);
        assert!((best[1] + 2.0).abs() < 1e-4);
    }

    #[test]
    fn residual_scale_requires_reference() {
        let options = opts(1e-6, 100).with_convergence(ConvergenceTest::ResidualScale);
        let zero_dof = ResidualReference { degrees_of_freedom: 0, y_abs_mean: 1.0 };
        let valid = ResidualReference { degrees_of_freedom: 4, y_abs_mean: 2.0 };

        assert!(ConvergenceCriterion::new(&options, None).is_err());
        assert!(ConvergenceCriterion::new(&options, Some(zero_dof)).is_err());
        assert_eq!(
            ConvergenceCriterion::new(&options, Some(valid)).unwrap(),
            ConvergenceCriterion::ResidualScale { threshold: 2e-6, degrees_of_freedom: 4.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // A start point whose objective is not finite is a fatal error.
    fn non_finite_start_is_rejected() {
        struct Pole;
        impl CostFunction for Pole {
            type Param = Theta;
            type Output = Cost;
            fn cost(&self, p: &Theta) -> Result<Cost, Error> {
                Ok(1.0 / p[0])
            }
        }
        let objective = ScaledObjective::new(&Pole, Array1::ones(1));
        let options = opts(1e-6, 100);
        let criterion = ConvergenceCriterion::new(&options, None).unwrap();

        let err = run_simplex(&objective, &array![0.0], &array![0.1], &options, criterion)
            .unwrap_err();

        assert_eq!(err, OptError::NonFiniteCost { value: f64::INFINITY });
    }
}
