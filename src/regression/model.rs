//! The model-function capability consumed by nonlinear fits.
use ndarray::ArrayView1;

/// A model `f(params, x, series) → ŷ` evaluated at one sample.
///
/// - `params`: current parameter vector, length `nTerms`.
/// - `x`: independent-variable components of the sample, length `nXarrays`.
/// - `series`: index of the stacked dependent-variable series the sample
///   belongs to; always 0 for single-series data.
///
/// The engine treats implementations as opaque and calls them once per
/// sample per objective evaluation. A non-finite return value makes the
/// whole trial point unacceptable to the simplex.
pub trait ModelFunction {
    fn evaluate(&self, params: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>, series: usize) -> f64;
}

impl<M: ModelFunction + ?Sized> ModelFunction for &M {
    fn evaluate(&self, params: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>, series: usize) -> f64 {
        (**self).evaluate(params, x, series)
    }
}
