use crate::{ClimbConfig, ClimbError, ClimbReport, HillClimber, ObjectiveError, Result};
use ndarray::Array1;

fn split_bounds(bounds: &[(f64, f64)], nx: usize) -> Result<(Array1<f64>, Array1<f64>)> {
    if nx == 0 {
        return Err(ClimbError::ZeroDimension);
    }
    if bounds.len() != nx {
        return Err(ClimbError::DimensionMismatch {
            expected: nx,
            got: bounds.len(),
        });
    }
    let lower = bounds.iter().map(|&(lo, _)| lo).collect();
    let upper = bounds.iter().map(|&(_, hi)| hi).collect();
    Ok((lower, upper))
}

/// Runs restart hill climbing on a function.
///
/// Every cycle samples a random start inside `bounds`, climbs greedily with
/// hollow perturbations for `config.max_iterations / config.cycles` steps and,
/// if `config.local_search` is set, polishes the result with
/// `config.local_solver`. The best value over all cycles is returned.
///
/// # Arguments
///
/// * `func` - The objective function to minimize, mapping `&Array1<f64>` to `f64`
/// * `bounds` - Vector of (lower, upper) bound pairs for each dimension
/// * `nx` - Problem dimension, must equal `bounds.len()`
/// * `config` - Climber configuration (use `ClimbConfigBuilder` to construct)
///
/// # Errors
///
/// Returns `ClimbError::DimensionMismatch` if `bounds.len() != nx`, and any
/// bounds or configuration error from validation. Nothing is evaluated when
/// an error is returned.
///
/// # Example
///
/// ```rust
/// use math_memetic_climbing::{hill_climbing_with_restarts, ClimbConfigBuilder};
///
/// let config = ClimbConfigBuilder::new()
///     .cycles(10)
///     .max_iterations(1000)
///     .seed(42)
///     .build()
///     .expect("valid config");
/// let result = hill_climbing_with_restarts(
///     &|x| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2),
///     &[(-5.0, 5.0), (-5.0, 5.0)],
///     2,
///     config,
/// )
/// .expect("optimization failed");
///
/// assert!(result.fun < 1e-8);
/// ```
pub fn hill_climbing_with_restarts<F>(
    func: &F,
    bounds: &[(f64, f64)],
    nx: usize,
    config: ClimbConfig,
) -> Result<ClimbReport>
where
    F: Fn(&Array1<f64>) -> f64 + Sync,
{
    let (lower, upper) = split_bounds(bounds, nx)?;
    let mut climber = HillClimber::new(func, lower, upper)?;
    *climber.config_mut() = config;
    climber.solve()
}

/// Same as [`hill_climbing_with_restarts`] for an objective that can fail.
///
/// The first error returned by `func` aborts the run and is reported as
/// `ClimbError::Objective`.
pub fn try_hill_climbing_with_restarts<F, E>(
    func: &F,
    bounds: &[(f64, f64)],
    nx: usize,
    config: ClimbConfig,
) -> Result<ClimbReport>
where
    F: Fn(&Array1<f64>) -> std::result::Result<f64, E> + Sync,
    E: Into<ObjectiveError>,
{
    let (lower, upper) = split_bounds(bounds, nx)?;
    let mut climber = HillClimber::new(func, lower, upper)?;
    *climber.config_mut() = config;
    climber.try_solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bounds() {
        let (lower, upper) = split_bounds(&[(-1.0, 1.0), (0.0, 5.0)], 2).unwrap();
        assert_eq!(lower.to_vec(), vec![-1.0, 0.0]);
        assert_eq!(upper.to_vec(), vec![1.0, 5.0]);
        assert!(matches!(
            split_bounds(&[(-1.0, 1.0)], 2),
            Err(ClimbError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(split_bounds(&[], 0), Err(ClimbError::ZeroDimension)));
    }
}
