//! Adapter that presents a model-space objective to the simplex in scaled space.
//!
//! The simplex moves vertices `z = θ ⊙ s`; every evaluation divides by the
//! scale factors before calling the wrapped objective. Non-finite trial values
//! are reported to the search as `+∞` so a bad vertex is simply never kept.
use std::cell::{Cell, RefCell};

use argmin::core::{CostFunction, Error};
use ndarray::Array1;

use crate::optimization::{
    numerical_stability::from_scaled_into,
    simplex::types::{Cost, Theta},
};

/// Wraps any `CostFunction<Param = Theta, Output = Cost>` for scaled search.
///
/// - `CostFunction::cost` returns the objective at `θ = z ⊘ s`, mapping
///   non-finite results to `f64::INFINITY`.
/// - [`ScaledObjective::raw_cost`] returns the unmapped value.
/// - Every evaluation increments the counter read by [`ScaledObjective::evals`].
#[derive(Debug)]
pub struct ScaledObjective<'a, O> {
    inner: &'a O,
    factors: Array1<f64>,
    buffer: RefCell<Theta>,
    evals: Cell<usize>,
}

impl<'a, O> ScaledObjective<'a, O>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    pub fn new(inner: &'a O, factors: Array1<f64>) -> Self {
        let buffer = RefCell::new(Theta::zeros(factors.len()));
        Self { inner, factors, buffer, evals: Cell::new(0) }
    }

    /// Objective value at scaled point `z`, without the non-finite mapping.
    ///
    /// # Errors
    /// Propagates any error returned by the wrapped objective.
    pub fn raw_cost(&self, z: &Theta) -> Result<Cost, Error> {
        self.evals.set(self.evals.get() + 1);
        let mut theta = self.buffer.borrow_mut();
        from_scaled_into(z, &self.factors, &mut theta);
        self.inner.cost(&theta)
    }

    /// Model-space copy of a scaled vector.
    pub fn unscale(&self, z: &Theta) -> Theta {
        let mut theta = Theta::zeros(z.len());
        from_scaled_into(z, &self.factors, &mut theta);
        theta
    }

    pub fn evals(&self) -> usize {
        self.evals.get()
    }
}

impl<'a, O> CostFunction for ScaledObjective<'a, O>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, z: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.raw_cost(z)?;
        Ok(if value.is_finite() { value } else { f64::INFINITY })
    }
}
