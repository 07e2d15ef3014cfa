//! optimization::constraints — penalty constraints on parameter vectors.
//!
//! Purpose
//! -------
//! Hold the inequality and tolerance constraints a caller attaches to a
//! nonlinear fit, and answer two questions about a candidate parameter
//! vector: is it feasible, and if not, how far outside the first violated
//! bound does it sit. The objective evaluator turns that distance into a
//! penalty; the simplex itself never sees the constraints.
//!
//! Key behaviors
//! -------------
//! - [`SingleConstraint`] bounds one parameter; [`MultiConstraint`] bounds a
//!   signed linear combination `Σ sⱼ·θ[iⱼ]`.
//! - [`ConstraintSet::violation`] checks single constraints first, then
//!   multi constraints, and returns the distance beyond the first violated
//!   bound.
//! - Structural problems (mismatched lengths, non-finite bounds, empty index
//!   lists) are rejected when a constraint is built; index range is checked
//!   against the model size via [`ConstraintSet::validate`] at fit start.
//!
//! Conventions
//! -----------
//! - `NotBelow` keeps the value `≥ bound`, `NotAbove` keeps it `≤ bound`,
//!   `Within` keeps it inside `[bound − |bound|·tol, bound + |bound|·tol]`.
//! - Constraints act on parameters in model space (unscaled).
use ndarray::ArrayView1;

use crate::optimization::errors::{OptError, OptResult};

/// Direction of a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintDirection {
    /// Value must not fall below the bound.
    NotBelow,
    /// Value must not rise above the bound.
    NotAbove,
    /// Value must stay within a relative tolerance band around the bound.
    Within,
}

impl ConstraintDirection {
    /// Distance by which `value` lies outside the bound, or `None` if it is
    /// inside.
    pub fn distance(self, value: f64, bound: f64, tolerance: f64) -> Option<f64> {
        match self {
            ConstraintDirection::NotBelow => (value < bound).then(|| bound - value),
            ConstraintDirection::NotAbove => (value > bound).then(|| value - bound),
            ConstraintDirection::Within => {
                let half_width = bound.abs() * tolerance;
                let lower = bound - half_width;
                let upper = bound + half_width;
                if value < lower {
                    Some(lower - value)
                } else if value > upper {
                    Some(value - upper)
                } else {
                    None
                }
            }
        }
    }
}

/// Bound on a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleConstraint {
    /// 0-based parameter index; checked against `nTerms` at fit start.
    pub index: usize,
    pub direction: ConstraintDirection,
    /// Finite bound in model space.
    pub bound: f64,
}

impl SingleConstraint {
    /// Build a bound on `θ[index]`.
    ///
    /// Parameters
    /// ----------
    /// - `index`: `usize`
    ///   Parameter the bound applies to. Not range-checked here.
    /// - `direction`: [`ConstraintDirection`]
    ///   Which side of `bound` is feasible.
    /// - `bound`: `f64`
    ///   Bound value; must be finite.
    ///
    /// Errors
    /// ------
    /// - `OptError::InvalidConstraintValue`
    ///   Returned when `bound` is NaN or ±∞.
    pub fn new(index: usize, direction: ConstraintDirection, bound: f64) -> OptResult<Self> {
        verify_finite(bound, "Constraint bound must be finite.")?;
        Ok(Self { index, direction, bound })
    }

    fn value(&self, params: ArrayView1<'_, f64>) -> f64 {
        params[self.index]
    }
}

/// Bound on a signed linear combination of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiConstraint {
    /// Parameters entering the combination, in order.
    pub indices: Vec<usize>,
    /// Coefficient applied to each entry of `indices`.
    pub signs: Vec<f64>,
    pub direction: ConstraintDirection,
    pub bound: f64,
}

impl MultiConstraint {
    /// # Errors
    /// - [`OptError::EmptyConstraint`] if `indices` is empty.
    /// - [`OptError::ConstraintLengthMismatch`] if `indices` and `signs`
    ///   differ in length.
    /// - [`OptError::InvalidConstraintValue`] for a non-finite sign or bound.
    pub fn new(
        indices: Vec<usize>, signs: Vec<f64>, direction: ConstraintDirection, bound: f64,
    ) -> OptResult<Self> {
        if indices.is_empty() {
            return Err(OptError::EmptyConstraint);
        }
        if indices.len() != signs.len() {
            return Err(OptError::ConstraintLengthMismatch {
                indices: indices.len(),
                signs: signs.len(),
            });
        }
        for &s in &signs {
            verify_finite(s, "Constraint coefficients must be finite.")?;
        }
        verify_finite(bound, "Constraint bound must be finite.")?;
        Ok(Self { indices, signs, direction, bound })
    }

    fn value(&self, params: ArrayView1<'_, f64>) -> f64 {
        self.indices.iter().zip(self.signs.iter()).map(|(&i, &s)| s * params[i]).sum()
    }
}

/// Accumulated single- and multi-parameter constraints for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    singles: Vec<SingleConstraint>,
    multis: Vec<MultiConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-parameter constraint. Index range is checked later by
    /// [`ConstraintSet::validate`].
    pub fn add_single(&mut self, constraint: SingleConstraint) {
        self.singles.push(constraint);
    }

    /// Append a multi-parameter constraint. Index range is checked later by
    /// [`ConstraintSet::validate`].
    pub fn add_multi(&mut self, constraint: MultiConstraint) {
        self.multis.push(constraint);
    }

    /// Remove every constraint of both kinds.
    pub fn clear(&mut self) {
        self.singles.clear();
        self.multis.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.multis.is_empty()
    }

    /// Total number of single and multi constraints.
    pub fn len(&self) -> usize {
        self.singles.len() + self.multis.len()
    }

    pub fn singles(&self) -> &[SingleConstraint] {
        &self.singles
    }

    pub fn multis(&self) -> &[MultiConstraint] {
        &self.multis
    }

    /// Check every referenced parameter index against the model size.
    ///
    /// # Errors
    /// Returns [`OptError::ConstraintIndexOutOfRange`] for the first index
    /// that is `>= n_terms`.
    pub fn validate(&self, n_terms: usize) -> OptResult<()> {
        let indices = self
            .singles
            .iter()
            .map(|c| c.index)
            .chain(self.multis.iter().flat_map(|c| c.indices.iter().copied()));
        for index in indices {
            if index >= n_terms {
                return Err(OptError::ConstraintIndexOutOfRange { index, n_terms });
            }
        }
        Ok(())
    }

    /// Distance beyond the first violated bound, single constraints first.
    ///
    /// Assumes [`ConstraintSet::validate`] has passed for `params.len()`.
    pub fn violation(&self, params: ArrayView1<'_, f64>, tolerance: f64) -> Option<f64> {
        self.singles
            .iter()
            .find_map(|c| c.direction.distance(c.value(params), c.bound, tolerance))
            .or_else(|| {
                self.multis
                    .iter()
                    .find_map(|c| c.direction.distance(c.value(params), c.bound, tolerance))
            })
    }

    /// `true` when no constraint is violated at `params`.
    pub fn is_feasible(&self, params: ArrayView1<'_, f64>, tolerance: f64) -> bool {
        self.violation(params, tolerance).is_none()
    }
}

fn verify_finite(value: f64, reason: &'static str) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidConstraintValue { value, reason });
    }
    Ok(())
}
