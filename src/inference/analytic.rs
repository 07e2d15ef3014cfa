//! inference::analytic — exact statistics for weighted linear fits.
//!
//! For a linear model the covariance of the coefficients is available in
//! closed form: `cov = (Σₖ xₖxₖᵀ / eₖ²)⁻¹`, where `eₖ` is the per-sample error
//! scale. Weighted data use their weights as `eₖ`; unweighted data use the
//! common residual scale `sqrt(SSR/dof)`. A perfect fit has a zero covariance.
use ndarray::{Array1, Array2, Axis};

use crate::inference::{
    errors::{InferenceError, InferenceResult},
    statistics::{FitStatistics, GoodnessOfFit, ParameterInference, ResidualInputs, invert},
};

/// Statistics for a linear fit with `design` (`nTerms × nData`) and
/// `estimates`.
///
/// # Errors
/// - [`InferenceError::DimensionMismatch`] for inconsistent shapes.
/// - [`InferenceError::SingularMatrix`] if the error-weighted normal matrix
///   cannot be inverted.
/// - Distribution errors from the shared derivations.
pub fn analytic_statistics(
    design: &Array2<f64>, estimates: &Array1<f64>, inputs: &ResidualInputs<'_>,
) -> InferenceResult<FitStatistics> {
    let n_terms = design.nrows();
    if n_terms == 0 {
        return Err(InferenceError::EmptyParameters);
    }
    if estimates.len() != n_terms {
        return Err(InferenceError::DimensionMismatch {
            what: "estimates",
            expected: n_terms,
            found: estimates.len(),
        });
    }
    if design.ncols() != inputs.n_data() {
        return Err(InferenceError::DimensionMismatch {
            what: "design columns",
            expected: inputs.n_data(),
            found: design.ncols(),
        });
    }

    let dof = inputs.degrees_of_freedom();
    let residual_scale = inputs.residual_scale();
    let covariance = if dof > 0 && inputs.is_perfect_fit() {
        Array2::zeros((n_terms, n_terms))
    } else {
        // σ² factors out of every eₖ², so scale the weight-only inverse.
        let normal = error_weighted_normal_matrix(design, inputs);
        let inverse =
            invert(&normal).ok_or(InferenceError::SingularMatrix { context: "linear covariance" })?;
        inverse * residual_scale
    };

    let parameters = ParameterInference::derive(estimates, Some(covariance), dof)?;
    let goodness = GoodnessOfFit::compute(inputs)?;

    Ok(FitStatistics {
        estimates: estimates.clone(),
        parameters,
        goodness,
        residual_scale,
        degrees_of_freedom: dof,
        hessian_invertible: true,
        pseudo_sd: None,
        step_substituted: vec![false; n_terms],
        iterations: 0,
        restarts: 0,
    })
}

/// `Σₖ xₖxₖᵀ / wₖ²` with `wₖ = 1` for unweighted data.
fn error_weighted_normal_matrix(design: &Array2<f64>, inputs: &ResidualInputs<'_>) -> Array2<f64> {
    let mut scaled = design.clone();
    if let Some(w) = inputs.weights {
        for (mut column, &wk) in scaled.axis_iter_mut(Axis(1)).zip(w.iter()) {
            column /= wk;
        }
    }
    scaled.dot(&scaled.t())
}
