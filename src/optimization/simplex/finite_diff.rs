//! simplex::finite_diff — derivative estimates around a simplex optimum.
//!
//! Purpose
//! -------
//! The simplex never uses derivatives, but the statistics that follow a
//! nonlinear fit do. This module estimates them from objective values alone:
//! per-parameter step lengths, one-sided gradients and the curvature they
//! imply, a four-point central Hessian, and a gradient norm diagnostic.
//!
//! Key behaviors
//! -------------
//! - [`fd_steps`] sets `hᵢ = delta·|θᵢ|` and substitutes the caller's
//!   original step when `θᵢ == 0`, flagging each substitution.
//! - [`one_sided_gradients`] evaluates `f(θ ± hᵢeᵢ)` and returns forward and
//!   backward slopes plus the curvature `(g⁺ − g⁻)/hᵢ`.
//! - [`four_point_hessian`] builds
//!   `Hᵢⱼ = [f(++) − f(+−) − f(−+) + f(−−)] / (4hᵢhⱼ)`, validates it, and
//!   returns it symmetric.
//! - [`gradient_norm`] runs a `finitediff` central difference and reports its
//!   L2 norm through `argmin-math`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every `hᵢ` returned by [`fd_steps`] is finite and non-zero when the
//!   fallback steps passed validation.
//! - Objective errors are surfaced as `OptError`; inside the `finitediff`
//!   closure they are captured in a `RefCell` and re-raised afterwards.
//!
//! Conventions
//! -----------
//! - All points are model-space parameter vectors; the objective passed in
//!   is expected to be the unpenalized one.
//!
//! Testing notes
//! -------------
//! - Unit tests use quadratics, where forward, backward, and four-point
//!   formulas are exact up to rounding.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error};
use argmin_math::ArgminL2Norm;
use finitediff::FiniteDiff;

use crate::optimization::{
    errors::OptResult,
    simplex::{
        types::{Cost, Grad, Hessian, Theta},
        validation::validate_hessian,
    },
};

/// Per-parameter finite-difference steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FdSteps {
    pub h: Theta,
    /// `true` where `θᵢ == 0` forced the fallback step.
    pub substituted: Vec<bool>,
}

/// Forward / backward slopes and the implied curvature per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct OneSidedGradients {
    pub forward: Grad,
    pub backward: Grad,
    pub curvature: Theta,
}

pub fn fd_steps(theta: &Theta, fallback: &Theta, delta: f64) -> FdSteps {
    let mut h = Theta::zeros(theta.len());
    let mut substituted = vec![false; theta.len()];
    for i in 0..theta.len() {
        if theta[i] == 0.0 {
            h[i] = fallback[i].abs();
            substituted[i] = true;
            log::debug!("estimate {i} is zero; using the initial step {} for differencing", h[i]);
        } else {
            h[i] = delta * theta[i].abs();
        }
    }
    FdSteps { h, substituted }
}

/// One-sided slopes of `objective` around `theta`, where `f0 = f(theta)`.
///
/// # Errors
/// Propagates any objective error.
pub fn one_sided_gradients<O>(
    objective: &O, theta: &Theta, f0: Cost, h: &Theta,
) -> OptResult<OneSidedGradients>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    let dim = theta.len();
    let mut forward = Grad::zeros(dim);
    let mut backward = Grad::zeros(dim);
    let mut point = theta.clone();
    for i in 0..dim {
        point[i] = theta[i] + h[i];
        let f_plus = objective.cost(&point)?;
        point[i] = theta[i] - h[i];
        let f_minus = objective.cost(&point)?;
        point[i] = theta[i];
        forward[i] = (f_plus - f0) / h[i];
        backward[i] = (f0 - f_minus) / h[i];
    }
    let curvature = (&forward - &backward) / h;
    Ok(OneSidedGradients { forward, backward, curvature })
}

/// Four-point central Hessian of `objective` at `theta`.
///
/// # Errors
/// - Propagates any objective error.
/// - [`OptError::InvalidHessian`](crate::optimization::errors::OptError::InvalidHessian)
///   if an entry is non-finite.
pub fn four_point_hessian<O>(objective: &O, theta: &Theta, h: &Theta) -> OptResult<Hessian>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    let dim = theta.len();
    let mut hess = Hessian::zeros((dim, dim));
    let mut point = theta.clone();
    let mut eval = |di: f64, dj: f64, i: usize, j: usize| -> Result<Cost, Error> {
        point.assign(theta);
        point[i] += di * h[i];
        point[j] += dj * h[j];
        objective.cost(&point)
    };
    for i in 0..dim {
        for j in i..dim {
            let f_pp = eval(1.0, 1.0, i, j)?;
            let f_pm = eval(1.0, -1.0, i, j)?;
            let f_mp = eval(-1.0, 1.0, i, j)?;
            let f_mm = eval(-1.0, -1.0, i, j)?;
            let value = (f_pp - f_pm - f_mp + f_mm) / (4.0 * h[i] * h[j]);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }
    validate_hessian(&hess, dim)?;
    Ok(hess)
}

/// L2 norm of the central-difference gradient at `theta`.
///
/// Returns `Ok(None)` when the gradient has non-finite entries.
///
/// # Errors
/// Returns the first objective error encountered inside the difference scheme.
pub fn gradient_norm<O>(objective: &O, theta: &Theta) -> OptResult<Option<f64>>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost_func = |p: &Theta| -> f64 {
        match objective.cost(p) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let grad = theta.central_diff(&cost_func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    if grad.iter().all(|g| g.is_finite()) { Ok(Some(grad.l2_norm())) } else { Ok(None) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// f(a, b) = 3a² + ab + 2b²
    struct Quadratic;

    impl CostFunction for Quadratic {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, p: &Theta) -> Result<Cost, Error> {
            Ok(3.0 * p[0] * p[0] + p[0] * p[1] + 2.0 * p[1] * p[1])
        }
    }

    struct Failing;

    impl CostFunction for Failing {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, _p: &Theta) -> Result<Cost, Error> {
            Err(OptError::NonFiniteCost { value: f64::NAN }.into())
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Step construction with zero-estimate substitution.
    // - Exactness of one-sided curvature and four-point Hessians on quadratics.
    // - Error capture through the `finitediff` closure.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A zero estimate falls back to the original step and is flagged.
    fn fd_steps_substitutes_zero_estimates() {
        let steps = fd_steps(&array![2.0, 0.0, -4.0], &array![0.1, -0.3, 0.1], 1e-4);

        assert_relative_eq!(steps.h[0], 2e-4);
        assert_eq!(steps.h[1], 0.3);
        assert_relative_eq!(steps.h[2], 4e-4);
        assert_eq!(steps.substituted, vec![false, true, false]);
    }

    #[test]
    // Purpose
    // -------
    // On a quadratic the curvature equals the exact second derivative.
    //
    // Given
    // -----
    // - f(a, b) = 3a² + ab + 2b² at (1, 2).
    //
    // Expect
    // ------
    // - curvature ≈ (6, 4).
    fn one_sided_curvature_matches_second_derivative() {
        let theta = array![1.0, 2.0];
        let f0 = Quadratic.cost(&theta).unwrap();

        let g = one_sided_gradients(&Quadratic, &theta, f0, &array![1e-3, 1e-3]).unwrap();

        assert_relative_eq!(g.curvature[0], 6.0, max_relative = 1e-6);
        assert_relative_eq!(g.curvature[1], 4.0, max_relative = 1e-6);
        assert!(g.forward[0] > g.backward[0]);
    }

    #[test]
    // Purpose
    // -------
    // The four-point Hessian of a quadratic is its constant matrix.
    fn four_point_hessian_recovers_quadratic_form() {
        let hess = four_point_hessian(&Quadratic, &array![1.0, 2.0], &array![1e-3, 2e-3]).unwrap();

        assert_relative_eq!(hess[[0, 0]], 6.0, max_relative = 1e-6);
        assert_relative_eq!(hess[[1, 1]], 4.0, max_relative = 1e-6);
        assert_relative_eq!(hess[[0, 1]], 1.0, max_relative = 1e-6);
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
    }

    #[test]
    fn gradient_norm_vanishes_at_minimum_and_propagates_errors() {
        let norm = gradient_norm(&Quadratic, &array![0.0, 0.0]).unwrap().unwrap();
        assert!(norm < 1e-6);

        let err = gradient_norm(&Failing, &array![1.0]).unwrap_err();
        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }
}
