use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- SimplexOptions ----
    /// Convergence tolerance needs to be positive and finite.
    InvalidTolerance {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Reflection, expansion or contraction coefficient out of range.
    InvalidCoefficient {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Penalty weight, constraint tolerance or finite-difference delta out of range.
    InvalidPenalty {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Unknown convergence test name.
    InvalidConvergenceTest {
        name: String,
        reason: &'static str,
    },

    // ---- Start point and steps ----
    /// No parameters to optimize.
    EmptyParameters,
    /// Start values must be finite.
    InvalidStartValue {
        index: usize,
        value: f64,
    },
    /// Step vector length does not match start vector length.
    StepLengthMismatch {
        expected: usize,
        found: usize,
    },
    /// Step sizes must be finite and non-zero.
    InvalidStep {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    /// Custom scale vector length does not match start vector length.
    ScaleLengthMismatch {
        expected: usize,
        found: usize,
    },
    /// Custom scale factors must be finite and non-zero.
    InvalidScaleFactor {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Objective returned a non-finite value at the start point.
    NonFiniteCost {
        value: f64,
    },

    // ---- Constraints ----
    /// A constraint references a parameter that does not exist.
    ConstraintIndexOutOfRange {
        index: usize,
        n_terms: usize,
    },
    /// Multi-parameter constraint has a different number of indices and signs.
    ConstraintLengthMismatch {
        indices: usize,
        signs: usize,
    },
    /// Multi-parameter constraint lists no parameters.
    EmptyConstraint,
    /// Constraint bounds and coefficients must be finite.
    InvalidConstraintValue {
        value: f64,
        reason: &'static str,
    },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- SimplexOptions ----
            OptError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid convergence tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidCoefficient { name, value, reason } => {
                write!(f, "Invalid {name} coefficient {value}: {reason}")
            }
            OptError::InvalidPenalty { name, value, reason } => {
                write!(f, "Invalid {name} {value}: {reason}")
            }
            OptError::InvalidConvergenceTest { name, reason } => {
                write!(f, "Invalid convergence test '{name}': {reason}")
            }

            // ---- Start point and steps ----
            OptError::EmptyParameters => {
                write!(f, "No parameters to optimize")
            }
            OptError::InvalidStartValue { index, value } => {
                write!(f, "Invalid start value at index {index}: {value}, must be finite")
            }
            OptError::StepLengthMismatch { expected, found } => {
                write!(f, "Step length mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidStep { index, value, reason } => {
                write!(f, "Invalid step size at index {index}: {value}: {reason}")
            }
            OptError::ScaleLengthMismatch { expected, found } => {
                write!(f, "Scale length mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidScaleFactor { index, value, reason } => {
                write!(f, "Invalid scale factor at index {index}: {value}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite objective value at the start point: {value}")
            }

            // ---- Constraints ----
            OptError::ConstraintIndexOutOfRange { index, n_terms } => {
                write!(
                    f,
                    "Constraint references parameter {index}, but the model has {n_terms} parameters"
                )
            }
            OptError::ConstraintLengthMismatch { indices, signs } => {
                write!(f, "Constraint has {indices} parameter indices but {signs} signs")
            }
            OptError::EmptyConstraint => {
                write!(f, "Multi-parameter constraint lists no parameters")
            }
            OptError::InvalidConstraintValue { value, reason } => {
                write!(f, "Invalid constraint value {value}: {reason}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Finite Diffs ----
            OptError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // An `OptError` that travelled through `argmin::core::Error` comes back
    // out as the same variant.
    fn opt_error_round_trips_through_argmin_error() {
        // Arrange
        let original = OptError::NonFiniteCost { value: f64::INFINITY };
        let wrapped: Error = original.clone().into();

        // Act
        let recovered = OptError::from(wrapped);

        // Assert
        assert_eq!(recovered, original);
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own error kinds map onto the matching wrapper variants.
    fn argmin_error_maps_to_wrapper_variant() {
        // Arrange
        let wrapped: Error = ArgminError::NotImplemented { text: "cost".to_string() }.into();

        // Act
        let mapped = OptError::from(wrapped);

        // Assert
        assert_eq!(mapped, OptError::NotImplemented { text: "cost".to_string() });
    }
}
