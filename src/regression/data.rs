//! Canonical dataset for regression sessions.
//!
//! Purpose
//! -------
//! Hold one validated snapshot of the samples a session fits: an
//! independent-variable matrix with `nXarrays` rows of length `nData`, the
//! dependent values, and one weight per sample. Reshaping caller input into
//! this form happens upstream; this module only validates it and cleans the
//! weights once.
//!
//! Key behaviors
//! -------------
//! - [`Dataset::new`] checks shapes and finiteness, then cleans weights:
//!   more than 40% non-positive weights reset every weight to 1 and mark the
//!   data unweighted; otherwise each non-positive weight becomes the mean of
//!   its nearest positive neighbours.
//! - [`Dataset::with_series`] records stacked dependent-variable series that
//!   share one x-range; sample `k` belongs to series `k / (nData / nSeries)`.
//! - [`Dataset::sample`] returns the independent-variable components of one
//!   sample as a contiguous view.
//!
//! Invariants & assumptions
//! ------------------------
//! - `nData ≥ 1`, `nXarrays ≥ 1`, `weights.len() == y.len() == nData`.
//! - All stored values are finite; stored weights are strictly positive.
//! - A dataset is never mutated after construction.
//!
//! Testing notes
//! -------------
//! - Unit tests cover shape validation, both weight-cleaning regimes, and
//!   series indexing.
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::regression::errors::{RegressionError, RegressionResult};

/// Share of non-positive weights above which weighting is abandoned.
pub const MAX_NON_POSITIVE_WEIGHT_SHARE: f64 = 0.4;

/// Validated samples, dependent values, and cleaned weights.
///
/// Build with [`Dataset::new`], [`Dataset::from_single`], or
/// [`Dataset::with_series`]; every accessor borrows the stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    /// `x` transposed into standard layout, one row per sample.
    samples: Array2<f64>,
    y: Array1<f64>,
    weights: Array1<f64>,
    weighted: bool,
    n_series: usize,
}

impl Dataset {
    /// Build a single-series dataset.
    ///
    /// `x` is `nXarrays × nData`; `weights = None` means unweighted.
    ///
    /// # Errors
    /// - [`RegressionError::EmptyData`] / [`RegressionError::NoIndependentVariables`].
    /// - [`RegressionError::LengthMismatch`] for x columns or weights.
    /// - [`RegressionError::NonFiniteData`] for the first NaN/±∞ entry.
    pub fn new(
        x: Array2<f64>, y: Array1<f64>, weights: Option<Array1<f64>>,
    ) -> RegressionResult<Self> {
        Self::with_series(x, y, weights, 1)
    }

    /// Build a dataset with one independent-variable row.
    ///
    /// # Errors
    /// As [`Dataset::new`].
    pub fn from_single(
        x: Array1<f64>, y: Array1<f64>, weights: Option<Array1<f64>>,
    ) -> RegressionResult<Self> {
        Self::new(x.insert_axis(Axis(0)), y, weights)
    }

    /// Build a dataset holding `n_series` stacked dependent-variable series.
    ///
    /// # Errors
    /// As [`Dataset::new`], plus [`RegressionError::InvalidSeriesCount`] when
    /// `n_series` is zero or does not divide `nData`.
    pub fn with_series(
        x: Array2<f64>, y: Array1<f64>, weights: Option<Array1<f64>>, n_series: usize,
    ) -> RegressionResult<Self> {
        let n_data = y.len();
        if n_data == 0 {
            return Err(RegressionError::EmptyData);
        }
        if x.nrows() == 0 {
            return Err(RegressionError::NoIndependentVariables);
        }
        if x.ncols() != n_data {
            return Err(RegressionError::LengthMismatch {
                what: "x columns",
                expected: n_data,
                found: x.ncols(),
            });
        }
        if n_series == 0 || n_data % n_series != 0 {
            return Err(RegressionError::InvalidSeriesCount { n_series, n_data });
        }
        check_finite("x", x.iter())?;
        check_finite("y", y.iter())?;

        let (weights, weighted) = match weights {
            Some(w) => {
                if w.len() != n_data {
                    return Err(RegressionError::LengthMismatch {
                        what: "weights",
                        expected: n_data,
                        found: w.len(),
                    });
                }
                check_finite("weights", w.iter())?;
                clean_weights(w)
            }
            None => (Array1::ones(n_data), false),
        };

        let samples = x.t().as_standard_layout().into_owned();
        Ok(Self { x, samples, y, weights, weighted, n_series })
    }

    /// Number of samples.
    pub fn n_data(&self) -> usize {
        self.y.len()
    }

    /// Number of independent-variable rows.
    pub fn n_x_arrays(&self) -> usize {
        self.x.nrows()
    }

    /// Number of stacked dependent-variable series; 1 for plain data.
    pub fn n_series(&self) -> usize {
        self.n_series
    }

    /// `false` when no weights were given or they were reset by the 40% rule.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Independent variables, `nXarrays × nData`.
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Dependent values, length `nData`.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Cleaned weights; all ones for unweighted data.
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Weights as a view, or `None` when the data are unweighted.
    pub fn weights_view(&self) -> Option<ArrayView1<'_, f64>> {
        self.weighted.then(|| self.weights.view())
    }

    /// Independent-variable components of sample `k`.
    ///
    /// # Panics
    /// If `k >= n_data()`.
    pub fn sample(&self, k: usize) -> ArrayView1<'_, f64> {
        self.samples.row(k)
    }

    /// Series that sample `k` belongs to.
    pub fn series_index(&self, k: usize) -> usize {
        k / (self.n_data() / self.n_series)
    }

    /// Mean of `|y|`, the reference scale of the residual-scale convergence test.
    pub fn y_abs_mean(&self) -> f64 {
        self.y.iter().map(|v| v.abs()).sum::<f64>() / self.n_data() as f64
    }
}

// ---- Helper methods ----

fn check_finite<'a>(
    what: &'static str, values: impl Iterator<Item = &'a f64>,
) -> RegressionResult<()> {
    for (index, &value) in values.enumerate() {
        if !value.is_finite() {
            return Err(RegressionError::NonFiniteData { what, index, value });
        }
    }
    Ok(())
}

/// Replace non-positive weights; returns the cleaned weights and whether the
/// data remain weighted.
fn clean_weights(mut weights: Array1<f64>) -> (Array1<f64>, bool) {
    let n = weights.len();
    let bad: Vec<usize> = (0..n).filter(|&i| weights[i] <= 0.0).collect();
    if bad.is_empty() {
        return (weights, true);
    }
    if bad.len() as f64 > MAX_NON_POSITIVE_WEIGHT_SHARE * n as f64 {
        log::warn!(
            "{} of {} weights are non-positive; fitting without weights",
            bad.len(),
            n
        );
        return (Array1::ones(n), false);
    }

    let original = weights.clone();
    for &i in &bad {
        let left = (0..i).rev().map(|j| original[j]).find(|&w| w > 0.0);
        let right = (i + 1..n).map(|j| original[j]).find(|&w| w > 0.0);
        weights[i] = match (left, right) {
            (Some(l), Some(r)) => 0.5 * (l + r),
            (Some(v), None) | (None, Some(v)) => v,
            // At most 40% are bad, so a positive weight exists on some side.
            (None, None) => 1.0,
        };
    }
    log::debug!("replaced {} non-positive weights by neighbour means", bad.len());
    (weights, true)
}
