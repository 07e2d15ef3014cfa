//! Parameter scaling for the simplex search.
//!
//! The simplex works in a rescaled space `z = θ ⊙ s`, where `s` is a vector
//! of per-parameter factors, so that parameters of very different magnitude
//! move on comparable scales. The objective always sees model-space values
//! `θ = z ⊘ s`.
//!
//! # Provided items
//! - [`Scaling`]: identity, unity-normalized (every start value maps to 1),
//!   or caller-supplied factors.
//! - [`DEFAULT_STEP_FRACTION`] and [`default_steps`]: 10% initial steps.
use ndarray::{Array1, Zip};

use crate::optimization::{
    errors::{OptError, OptResult},
    simplex::types::Theta,
};

/// Fraction of each start value used as its default initial step.
pub const DEFAULT_STEP_FRACTION: f64 = 0.1;

/// How start values are rescaled before the simplex search.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scaling {
    /// No rescaling.
    #[default]
    Identity,
    /// Scale each parameter so its start value becomes 1. Zero start values
    /// keep a factor of 1.
    Unity,
    /// Caller-supplied factors, one per parameter; must be finite and non-zero.
    Custom(Array1<f64>),
}

impl Scaling {
    /// Resolve the per-parameter factors for a given start vector.
    ///
    /// # Errors
    /// - [`OptError::ScaleLengthMismatch`] if custom factors have the wrong length.
    /// - [`OptError::InvalidScaleFactor`] if a custom factor is zero or non-finite.
    pub fn factors(&self, start: &Theta) -> OptResult<Array1<f64>> {
        match self {
            Scaling::Identity => Ok(Array1::ones(start.len())),
            Scaling::Unity => Ok(start.mapv(|v| if v == 0.0 { 1.0 } else { 1.0 / v })),
            Scaling::Custom(factors) => {
                if factors.len() != start.len() {
                    return Err(OptError::ScaleLengthMismatch {
                        expected: start.len(),
                        found: factors.len(),
                    });
                }
                for (index, &value) in factors.iter().enumerate() {
                    if !value.is_finite() {
                        return Err(OptError::InvalidScaleFactor {
                            index,
                            value,
                            reason: "Scale factors must be finite.",
                        });
                    }
                    if value == 0.0 {
                        return Err(OptError::InvalidScaleFactor {
                            index,
                            value,
                            reason: "Scale factors must be non-zero.",
                        });
                    }
                }
                Ok(factors.clone())
            }
        }
    }
}

/// Map a model-space vector into scaled space.
pub fn to_scaled(theta: &Theta, factors: &Array1<f64>) -> Theta {
    theta * factors
}

/// Map a scaled vector back into model space, reusing `out`.
pub fn from_scaled_into(z: &Theta, factors: &Array1<f64>, out: &mut Theta) {
    Zip::from(out).and(z).and(factors).for_each(|o, &z, &s| *o = z / s);
}

/// Default initial steps: [`DEFAULT_STEP_FRACTION`] of each start value, or
/// the fraction itself for a zero start value.
pub fn default_steps(start: &Theta) -> Theta {
    start.mapv(|v| if v == 0.0 { DEFAULT_STEP_FRACTION } else { DEFAULT_STEP_FRACTION * v })
}
