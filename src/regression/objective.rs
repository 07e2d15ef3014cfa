//! regression::objective — the penalized weighted sum of squares.
//!
//! Purpose
//! -------
//! Expose a model and a dataset as the scalar objective the simplex
//! minimizes: `S(θ) = Σₖ ((yₖ − f(θ, xₖ, seriesₖ))/wₖ)²`, reshaped by
//! penalty constraints.
//!
//! Key behaviors
//! -------------
//! - Single constraints are checked first, then multi constraints. The first
//!   violation short-circuits the model: the value is the last unconstrained
//!   value plus `penalty_weight · distance²`.
//! - Inside the feasible region the sum of squares is computed and cached as
//!   the last unconstrained value (starting at 0).
//! - [`SumOfSquares::new`] without constraints is the plain objective the
//!   statistics estimators differentiate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Constraint indices have been validated against `θ.len()`.
//! - Only finite sums are cached.
use std::cell::Cell;

use argmin::core::{CostFunction, Error};
use ndarray::Array1;

use crate::{
    optimization::{
        constraints::ConstraintSet,
        simplex::types::{Cost, Theta},
    },
    regression::{data::Dataset, model::ModelFunction},
};

#[derive(Debug, Clone, Copy)]
struct Penalty<'a> {
    constraints: &'a ConstraintSet,
    weight: f64,
    tolerance: f64,
}

/// Objective evaluator over one dataset.
///
/// Implements [`CostFunction`] so the simplex can minimize it directly. The
/// cached last unconstrained value lives in a `Cell`, so evaluation takes
/// `&self`.
pub struct SumOfSquares<'a, M: ?Sized> {
    model: &'a M,
    data: &'a Dataset,
    penalty: Option<Penalty<'a>>,
    last_unconstrained: Cell<f64>,
}

impl<'a, M: ModelFunction + ?Sized> SumOfSquares<'a, M> {
    /// Plain sum of squares of `model` against `data`, without constraints.
    ///
    /// Parameters
    /// ----------
    /// - `model`: `&M`
    ///   Model evaluated once per sample per call.
    /// - `data`: `&Dataset`
    ///   Validated samples, weights, and series layout.
    pub fn new(model: &'a M, data: &'a Dataset) -> Self {
        Self { model, data, penalty: None, last_unconstrained: Cell::new(0.0) }
    }

    /// Attach penalty constraints; an empty set leaves the objective plain.
    ///
    /// Parameters
    /// ----------
    /// - `constraints`: `&ConstraintSet`
    ///   Constraints already validated against the parameter count.
    /// - `weight`: `f64`
    ///   Multiplier of the squared violation distance.
    /// - `tolerance`: `f64`
    ///   Relative half-width of `Within` bands.
    pub fn with_constraints(
        mut self, constraints: &'a ConstraintSet, weight: f64, tolerance: f64,
    ) -> Self {
        self.penalty =
            (!constraints.is_empty()).then_some(Penalty { constraints, weight, tolerance });
        self
    }

    /// `Σ((y − ŷ)/w)²` at `theta`, ignoring constraints.
    pub fn unconstrained_value(&self, theta: &Theta) -> f64 {
        let params = theta.view();
        let data = self.data;
        let weights = data.weights();
        (0..data.n_data())
            .map(|k| {
                let fitted = self.model.evaluate(params, data.sample(k), data.series_index(k));
                ((data.y()[k] - fitted) / weights[k]).powi(2)
            })
            .sum()
    }

    /// Model predictions at every sample.
    pub fn fitted_values(&self, theta: &Theta) -> Array1<f64> {
        let params = theta.view();
        let data = self.data;
        Array1::from_shape_fn(data.n_data(), |k| {
            self.model.evaluate(params, data.sample(k), data.series_index(k))
        })
    }

    /// `true` when every attached constraint holds at `theta`.
    pub fn is_feasible(&self, theta: &Theta) -> bool {
        self.penalty.is_none_or(|p| p.constraints.is_feasible(theta.view(), p.tolerance))
    }

    /// Most recent finite unconstrained value; 0 before any feasible call.
    pub fn last_unconstrained(&self) -> f64 {
        self.last_unconstrained.get()
    }
}

impl<'a, M: ModelFunction + ?Sized> CostFunction for SumOfSquares<'a, M> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        if let Some(p) = self.penalty {
            if let Some(distance) = p.constraints.violation(theta.view(), p.tolerance) {
                return Ok(self.last_unconstrained.get() + p.weight * distance * distance);
            }
        }
        let value = self.unconstrained_value(theta);
        if value.is_finite() {
            self.last_unconstrained.set(value);
        }
        Ok(value)
    }
}
