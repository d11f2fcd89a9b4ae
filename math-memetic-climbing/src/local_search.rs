//! Bounded local refinement interface.
//!
//! The climber polishes the best point of every cycle with a bounded local
//! optimizer. Any solver implementing [`LocalSolver`] can be plugged in; plain
//! closures with the matching signature implement it automatically.

use ndarray::Array1;
use thiserror::Error;

/// Result of a local refinement.
#[derive(Debug, Clone)]
pub struct LocalSolution {
    /// Refined point (inside the bounds).
    pub x: Array1<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Number of objective evaluations performed.
    pub nfev: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
    /// Human-readable stop reason.
    pub message: String,
}

/// Errors a local solver may report.
///
/// The climber never propagates these: a failed refinement simply keeps the
/// result of the randomized search.
#[derive(Debug, Error)]
pub enum LocalSearchError {
    /// The objective is NaN or infinite at the start point.
    #[error("objective is not finite at the start point ({value})")]
    NonFiniteStart {
        /// The value returned by the objective
        value: f64,
    },
    /// Start point and bounds have different lengths.
    #[error("local search dimension mismatch: x0 has {x0_len} elements, bounds have {bounds_len}")]
    DimensionMismatch {
        /// Length of the start point
        x0_len: usize,
        /// Length of the bounds
        bounds_len: usize,
    },
    /// Any other solver failure.
    #[error("local search failed: {0}")]
    Failed(String),
}

/// A bounded local minimizer.
pub trait LocalSolver: Send + Sync {
    /// Minimizes `func` starting from `x0` subject to `lower <= x <= upper`.
    fn minimize(
        &self,
        func: &dyn Fn(&Array1<f64>) -> f64,
        x0: &Array1<f64>,
        lower: &Array1<f64>,
        upper: &Array1<f64>,
    ) -> Result<LocalSolution, LocalSearchError>;
}

impl<S> LocalSolver for S
where
    S: Fn(
            &dyn Fn(&Array1<f64>) -> f64,
            &Array1<f64>,
            &Array1<f64>,
            &Array1<f64>,
        ) -> Result<LocalSolution, LocalSearchError>
        + Send
        + Sync,
{
    fn minimize(
        &self,
        func: &dyn Fn(&Array1<f64>) -> f64,
        x0: &Array1<f64>,
        lower: &Array1<f64>,
        upper: &Array1<f64>,
    ) -> Result<LocalSolution, LocalSearchError> {
        self(func, x0, lower, upper)
    }
}
