//! Error types for the memetic hill climber.
//!
//! Configuration and bounds problems are reported before the objective is
//! evaluated even once. Failures of a fallible objective abort the call and
//! are carried in [`ClimbError::Objective`].

use thiserror::Error;

/// Boxed error returned by a fallible objective.
pub type ObjectiveError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while running the restart hill climber.
#[derive(Debug, Error)]
pub enum ClimbError {
    /// The problem dimensionality is zero.
    #[error("problem dimension must be positive")]
    ZeroDimension,

    /// The number of bound pairs does not match the problem dimension.
    #[error("dimension mismatch: expected {expected} bound pairs, got {got}")]
    DimensionMismatch {
        /// Problem dimension `nx`
        expected: usize,
        /// Number of bound pairs provided
        got: usize,
    },

    /// Lower and upper bounds have different lengths.
    #[error("bounds mismatch: lower has {lower_len} elements, upper has {upper_len}")]
    BoundsMismatch {
        /// Length of the lower bounds array
        lower_len: usize,
        /// Length of the upper bounds array
        upper_len: usize,
    },

    /// A lower bound exceeds its corresponding upper bound.
    #[error("invalid bounds at index {index}: lower ({lower}) > upper ({upper})")]
    InvalidBounds {
        /// Index of the invalid bound pair
        index: usize,
        /// The lower bound value
        lower: f64,
        /// The upper bound value
        upper: f64,
    },

    /// A bound is NaN or infinite, so the box cannot be sampled.
    #[error("non-finite bounds at index {index}: [{lower}, {upper}]")]
    NonFiniteBounds {
        /// Index of the offending bound pair
        index: usize,
        /// The lower bound value
        lower: f64,
        /// The upper bound value
        upper: f64,
    },

    /// The number of restart cycles is zero.
    #[error("number of cycles must be >= 1")]
    InvalidCycles,

    /// The initial step size is not a positive finite number.
    #[error("invalid step size: {step_size} (must be finite and > 0)")]
    InvalidStepSize {
        /// The rejected step size
        step_size: f64,
    },

    /// The decay rate lies outside (0, 1].
    #[error("invalid decay rate: {decay_rate} (must be in (0, 1])")]
    InvalidDecayRate {
        /// The rejected decay rate
        decay_rate: f64,
    },

    /// The objective function reported a failure.
    #[error("objective evaluation failed: {0}")]
    Objective(#[source] ObjectiveError),
}

/// A specialized `Result` type for hill climbing operations.
pub type Result<T> = std::result::Result<T, ClimbError>;

impl ClimbError {
    /// Returns `true` if this is a bounds-related error.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self,
            ClimbError::ZeroDimension
                | ClimbError::DimensionMismatch { .. }
                | ClimbError::BoundsMismatch { .. }
                | ClimbError::InvalidBounds { .. }
                | ClimbError::NonFiniteBounds { .. }
        )
    }

    /// Returns `true` if this is a tuning-parameter error.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClimbError::InvalidCycles
                | ClimbError::InvalidStepSize { .. }
                | ClimbError::InvalidDecayRate { .. }
        )
    }

    /// Returns `true` if the objective itself failed.
    pub fn is_objective_error(&self) -> bool {
        matches!(self, ClimbError::Objective(_))
    }
}
