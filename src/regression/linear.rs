//! regression::linear — weighted generalized-linear least squares.
//!
//! Purpose
//! -------
//! Solve `min_c Σₖ ((yₖ − Σᵢ cᵢ·Xᵢₖ)/wₖ)²` for a design matrix `X` whose rows
//! are basis functions evaluated at every sample, and build the common design
//! matrices.
//!
//! Key behaviors
//! -------------
//! - [`solve_weighted_least_squares`] forms the normal equations
//!   `A = Σₖ xₖxₖᵀ/wₖ²`, `b = Σₖ yₖxₖ/wₖ²` and solves `A·c = b` with an LU
//!   factorization from `nalgebra`.
//! - [`design_with_intercept`] prepends a row of ones to a dataset's x rows.
//! - [`polynomial_design`] builds rows `x⁰ … x^degree`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `X` is `nTerms × nData` with `nTerms ≤ nData`; more terms than samples
//!   is rejected.
//! - A singular normal matrix is fatal (`SingularNormalMatrix`).
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, s};

use crate::regression::{
    data::Dataset,
    errors::{RegressionError, RegressionResult},
};

/// Coefficients minimizing the weighted sum of squares for `design`.
///
/// `weights = None` means unit weights.
///
/// # Errors
/// - [`RegressionError::EmptyDesign`] for a design with no rows.
/// - [`RegressionError::LengthMismatch`] if design columns, `y`, or weights
///   disagree.
/// - [`RegressionError::MoreParametersThanData`] if `nTerms > nData`.
/// - [`RegressionError::SingularNormalMatrix`] if `A` cannot be factorized.
pub fn solve_weighted_least_squares(
    design: &Array2<f64>, y: ArrayView1<'_, f64>, weights: Option<ArrayView1<'_, f64>>,
) -> RegressionResult<Array1<f64>> {
    let (n_terms, n_data) = design.dim();
    if n_terms == 0 {
        return Err(RegressionError::EmptyDesign);
    }
    if y.len() != n_data {
        return Err(RegressionError::LengthMismatch {
            what: "design columns",
            expected: y.len(),
            found: n_data,
        });
    }
    if let Some(w) = weights {
        if w.len() != n_data {
            return Err(RegressionError::LengthMismatch {
                what: "weights",
                expected: n_data,
                found: w.len(),
            });
        }
    }
    if n_terms > n_data {
        return Err(RegressionError::MoreParametersThanData { n_terms, n_data });
    }

    let inv_w2 = Array1::from_shape_fn(n_data, |k| weights.map_or(1.0, |w| 1.0 / (w[k] * w[k])));
    let mut a = DMatrix::<f64>::zeros(n_terms, n_terms);
    let mut b = DVector::<f64>::zeros(n_terms);
    for i in 0..n_terms {
        let xi = design.row(i);
        b[i] = (0..n_data).map(|k| y[k] * xi[k] * inv_w2[k]).sum();
        for j in 0..=i {
            let xj = design.row(j);
            let aij: f64 = (0..n_data).map(|k| xi[k] * xj[k] * inv_w2[k]).sum();
            a[(i, j)] = aij;
            a[(j, i)] = aij;
        }
    }

    let solution = a.lu().solve(&b).ok_or(RegressionError::SingularNormalMatrix)?;
    if solution.iter().any(|c| !c.is_finite()) {
        return Err(RegressionError::SingularNormalMatrix);
    }
    Ok(Array1::from_iter(solution.iter().copied()))
}

/// Design `[1; x₀; x₁; …]` for a dataset, `(nXarrays + 1) × nData`.
pub fn design_with_intercept(data: &Dataset) -> Array2<f64> {
    let mut design = Array2::ones((data.n_x_arrays() + 1, data.n_data()));
    design.slice_mut(s![1.., ..]).assign(data.x());
    design
}

/// Polynomial design `[x⁰; x¹; …; x^degree]`, `(degree + 1) × n`.
pub fn polynomial_design(x: ArrayView1<'_, f64>, degree: usize) -> Array2<f64> {
    Array2::from_shape_fn((degree + 1, x.len()), |(i, k)| x[k].powi(i as i32))
}
