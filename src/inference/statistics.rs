//! inference::statistics — shared result shape and derived quantities.
//!
//! Purpose
//! -------
//! Both estimators (analytic for linear fits, pseudo-linear for simplex fits)
//! end with a covariance matrix, or the knowledge that none could be formed.
//! This module turns that matrix into everything a caller reads off a fit:
//! standard errors, correlations, t- and p-values, coefficients of
//! variation, and the goodness-of-fit family computed from residuals.
//!
//! Key behaviors
//! -------------
//! - [`ParameterInference::derive`] applies the rules for undefined
//!   entries: a missing covariance makes everything `NaN`; a negative
//!   variance makes that parameter's entries `NaN` and clears
//!   `variances_non_negative`.
//! - A zero covariance (perfect fit) yields identity correlation and
//!   infinite t-values with p-value 0.
//! - [`GoodnessOfFit::compute`] derives sums of squares, the chi-square
//!   family, `R`/`R²` and their adjusted forms, F statistics for multiple
//!   independent series, and the Durbin–Watson statistic.
//!
//! Invariants & assumptions
//! ------------------------
//! - `estimates.len()` equals the covariance dimension; checked and reported
//!   as `InferenceError::DimensionMismatch`.
//! - With zero degrees of freedom every p-value, reduced chi-square, and
//!   adjusted statistic is `NaN`.
//!
//! Conventions
//! -----------
//! - Undefined quantities are `f64::NAN`, never an error.
//! - p-values are two-sided, from a Student-t with `degrees_of_freedom`.
//! - Weighted residuals are `(y − ŷ)/w`; `R²` uses weighted sums when the
//!   data are weighted.
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::PERFECT_FIT_RTOL,
};

/// Per-parameter uncertainty derived from a covariance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInference {
    pub covariance: Array2<f64>,
    pub correlation: Array2<f64>,
    pub standard_errors: Array1<f64>,
    pub t_values: Array1<f64>,
    pub p_values: Array1<f64>,
    /// `100·sd/|estimate|`, `NaN` for a zero estimate.
    pub coefficient_of_variation: Array1<f64>,
    pub variances_non_negative: bool,
}

impl ParameterInference {
    /// Derive standard errors and friends from `covariance`.
    ///
    /// `None` means no covariance could be formed; every derived entry is
    /// then `NaN`.
    ///
    /// # Errors
    /// - [`InferenceError::DimensionMismatch`] if the covariance is not
    ///   `n × n` for `n = estimates.len()`.
    /// - [`InferenceError::Distribution`] if `statrs` rejects the Student-t.
    pub fn derive(
        estimates: &Array1<f64>, covariance: Option<Array2<f64>>, degrees_of_freedom: usize,
    ) -> InferenceResult<Self> {
        let n = estimates.len();
        let covariance = covariance.unwrap_or_else(|| Array2::from_elem((n, n), f64::NAN));
        if covariance.nrows() != n || covariance.ncols() != n {
            return Err(InferenceError::DimensionMismatch {
                what: "covariance",
                expected: n,
                found: covariance.nrows(),
            });
        }

        let diag = covariance.diag();
        let variances_non_negative = !diag.iter().any(|&v| v < 0.0);
        if !variances_non_negative {
            log::warn!("covariance has negative diagonal entries; their standard errors are undefined");
        }
        let standard_errors = diag.mapv(|v| if v < 0.0 { f64::NAN } else { v.sqrt() });

        let correlation = Array2::from_shape_fn((n, n), |(i, j)| {
            let denom = standard_errors[i] * standard_errors[j];
            if denom == 0.0 {
                if i == j { 1.0 } else { 0.0 }
            } else {
                covariance[[i, j]] / denom
            }
        });

        let t_values = Array1::from_shape_fn(n, |i| estimates[i] / standard_errors[i]);
        let p_values = two_sided_p_values(&t_values, degrees_of_freedom)?;
        let coefficient_of_variation = Array1::from_shape_fn(n, |i| {
            if estimates[i] == 0.0 {
                f64::NAN
            } else {
                100.0 * standard_errors[i] / estimates[i].abs()
            }
        });

        Ok(Self {
            covariance,
            correlation,
            standard_errors,
            t_values,
            p_values,
            coefficient_of_variation,
            variances_non_negative,
        })
    }
}

/// Inputs shared by both estimators for residual-based statistics.
#[derive(Debug, Clone, Copy)]
pub struct ResidualInputs<'a> {
    pub y: ArrayView1<'a, f64>,
    pub fitted: ArrayView1<'a, f64>,
    /// `None` for unweighted data.
    pub weights: Option<ArrayView1<'a, f64>>,
    pub n_terms: usize,
    pub n_x_arrays: usize,
    /// Pearson chi-square for count data.
    pub true_frequencies: bool,
}

impl ResidualInputs<'_> {
    pub fn n_data(&self) -> usize {
        self.y.len()
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.n_data().saturating_sub(self.n_terms)
    }

    fn weight(&self, k: usize) -> f64 {
        self.weights.map_or(1.0, |w| w[k])
    }

    /// `(y − ŷ)/w` for every sample.
    pub fn weighted_residuals(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_data(), |k| (self.y[k] - self.fitted[k]) / self.weight(k))
    }

    /// `Σ((y − ŷ)/w)²`.
    pub fn weighted_ssr(&self) -> f64 {
        self.weighted_residuals().iter().map(|r| r * r).sum()
    }

    /// Weighted total sum of squares about the weighted mean.
    pub fn weighted_tss(&self) -> f64 {
        let n = self.n_data();
        let (num, den) = (0..n).fold((0.0, 0.0), |(num, den), k| {
            let iw2 = 1.0 / self.weight(k).powi(2);
            (num + self.y[k] * iw2, den + iw2)
        });
        let mean = num / den;
        (0..n).map(|k| ((self.y[k] - mean) / self.weight(k)).powi(2)).sum()
    }

    /// Residual scale `σ²`: 1 for weighted data, `SSR/dof` otherwise, `NaN`
    /// without residual degrees of freedom.
    pub fn residual_scale(&self) -> f64 {
        let dof = self.degrees_of_freedom();
        if dof == 0 {
            f64::NAN
        } else if self.weights.is_some() {
            1.0
        } else {
            self.weighted_ssr() / dof as f64
        }
    }

    /// `true` when the residuals vanish relative to the total variation.
    pub fn is_perfect_fit(&self) -> bool {
        let ssr = self.weighted_ssr();
        ssr == 0.0 || ssr <= PERFECT_FIT_RTOL * self.weighted_tss()
    }
}

/// Residual-based goodness-of-fit statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodnessOfFit {
    /// Unweighted `Σ(y − ŷ)²`.
    pub sum_of_squares: f64,
    /// Weighted `Σ((y − ŷ)/w)²`, or Pearson `Σ(y − ŷ)²/ŷ` for true frequencies.
    pub chi_square: Option<f64>,
    pub reduced_chi_square: Option<f64>,
    pub sample_r: f64,
    pub r_squared: f64,
    pub adjusted_r: f64,
    pub adjusted_r_squared: f64,
    pub f_ratio: Option<f64>,
    pub f_probability: Option<f64>,
    pub adjusted_f_ratio: Option<f64>,
    pub adjusted_f_probability: Option<f64>,
    pub durbin_watson: f64,
}

impl GoodnessOfFit {
    /// # Errors
    /// - [`InferenceError::DimensionMismatch`] if `y`, `fitted`, and weights
    ///   differ in length.
    /// - [`InferenceError::Distribution`] if `statrs` rejects the F parameters.
    pub fn compute(inputs: &ResidualInputs<'_>) -> InferenceResult<Self> {
        let n = inputs.n_data();
        check_len("fitted values", n, inputs.fitted.len())?;
        if let Some(w) = inputs.weights {
            check_len("weights", n, w.len())?;
        }
        let dof = inputs.degrees_of_freedom();

        let sum_of_squares: f64 =
            (0..n).map(|k| (inputs.y[k] - inputs.fitted[k]).powi(2)).sum();
        let chi_square = if inputs.true_frequencies {
            Some(
                (0..n)
                    .filter(|&k| inputs.fitted[k] > 0.0)
                    .map(|k| (inputs.y[k] - inputs.fitted[k]).powi(2) / inputs.fitted[k])
                    .sum(),
            )
        } else if inputs.weights.is_some() {
            Some(inputs.weighted_ssr())
        } else {
            None
        };
        let reduced_chi_square = chi_square.map(|c| per_dof(c, dof));

        let ssr = inputs.weighted_ssr();
        let tss = inputs.weighted_tss();
        let r_squared = if inputs.is_perfect_fit() { 1.0 } else { 1.0 - ssr / tss };
        let sample_r = r_squared.max(0.0).sqrt();
        let adjusted_r_squared = if dof == 0 {
            f64::NAN
        } else {
            1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / dof as f64
        };
        let adjusted_r = adjusted_r_squared.sqrt();

        let (f_ratio, f_probability, adjusted_f_ratio, adjusted_f_probability) =
            if inputs.n_x_arrays > 1 && dof > 0 {
                let (f, p) = f_test(r_squared, inputs.n_x_arrays, dof)?;
                let (fa, pa) = f_test(adjusted_r_squared, inputs.n_x_arrays, dof)?;
                (Some(f), Some(p), Some(fa), Some(pa))
            } else {
                (None, None, None, None)
            };

        let residuals = inputs.weighted_residuals();
        let durbin_watson = durbin_watson(&residuals);

        Ok(Self {
            sum_of_squares,
            chi_square,
            reduced_chi_square,
            sample_r,
            r_squared,
            adjusted_r,
            adjusted_r_squared,
            f_ratio,
            f_probability,
            adjusted_f_ratio,
            adjusted_f_probability,
            durbin_watson,
        })
    }
}

/// Complete statistics for one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitStatistics {
    pub estimates: Array1<f64>,
    pub parameters: ParameterInference,
    pub goodness: GoodnessOfFit,
    /// Residual scale `σ²` the covariance was scaled by.
    pub residual_scale: f64,
    pub degrees_of_freedom: usize,
    /// `false` when the Hessian (or normal matrix) could not be inverted.
    pub hessian_invertible: bool,
    /// Pseudo standard deviations; nonlinear fits only.
    pub pseudo_sd: Option<Array1<f64>>,
    /// Per-parameter flag: a zero estimate forced the fallback step.
    pub step_substituted: Vec<bool>,
    pub iterations: usize,
    pub restarts: usize,
}

impl FitStatistics {
    pub fn standard_errors(&self) -> &Array1<f64> {
        &self.parameters.standard_errors
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.parameters.covariance
    }

    pub fn correlation(&self) -> &Array2<f64> {
        &self.parameters.correlation
    }

    pub fn variances_non_negative(&self) -> bool {
        self.parameters.variances_non_negative
    }
}

// ---- Helper methods ----

pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> InferenceResult<()> {
    if expected != found {
        return Err(InferenceError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

/// Invert a square matrix, directly for `1 × 1`, through `nalgebra` otherwise.
///
/// Returns `None` when the matrix is singular or the inverse is not finite.
pub(crate) fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    let inverse = if n == 1 {
        let v = matrix[[0, 0]];
        if v == 0.0 {
            return None;
        }
        Array2::from_elem((1, 1), 1.0 / v)
    } else {
        let dm = DMatrix::<f64>::from_fn(n, n, |i, j| matrix[[i, j]]);
        let inv = dm.try_inverse()?;
        Array2::from_shape_fn((n, n), |(i, j)| inv[(i, j)])
    };
    inverse.iter().all(|v| v.is_finite()).then_some(inverse)
}

fn per_dof(value: f64, dof: usize) -> f64 {
    if dof == 0 { f64::NAN } else { value / dof as f64 }
}

fn two_sided_p_values(t_values: &Array1<f64>, dof: usize) -> InferenceResult<Array1<f64>> {
    if dof == 0 {
        return Ok(Array1::from_elem(t_values.len(), f64::NAN));
    }
    let dist = StudentsT::new(0.0, 1.0, dof as f64)
        .map_err(|e| InferenceError::Distribution(e.to_string()))?;
    Ok(t_values.mapv(|t| {
        if t.is_nan() {
            f64::NAN
        } else if t.is_infinite() {
            0.0
        } else {
            2.0 * (1.0 - dist.cdf(t.abs()))
        }
    }))
}

fn f_test(r_squared: f64, n_x_arrays: usize, dof: usize) -> InferenceResult<(f64, f64)> {
    let df1 = n_x_arrays as f64;
    let df2 = dof as f64;
    let ratio = (r_squared / df1) / ((1.0 - r_squared) / df2);
    let dist = FisherSnedecor::new(df1, df2)
        .map_err(|e| InferenceError::Distribution(e.to_string()))?;
    let probability = if ratio.is_nan() {
        f64::NAN
    } else if ratio.is_infinite() {
        0.0
    } else {
        1.0 - dist.cdf(ratio.max(0.0))
    };
    Ok((ratio, probability))
}

fn durbin_watson(residuals: &Array1<f64>) -> f64 {
    let denom: f64 = residuals.iter().map(|r| r * r).sum();
    if denom == 0.0 {
        return f64::NAN;
    }
    let num: f64 = residuals.windows(2).into_iter().map(|w| (w[1] - w[0]).powi(2)).sum();
    num / denom
}
