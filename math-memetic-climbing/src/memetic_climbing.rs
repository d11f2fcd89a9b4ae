use crate::{ClimbConfigBuilder, ClimbReport, Result, hill_climbing_with_restarts};
use ndarray::Array1;

/// Memetic climbing with the default tuning.
///
/// Forwards to [`hill_climbing_with_restarts`] with `max_iterations = 20000`,
/// `step_size = 20` and `decay_rate = 0.99977`; only the number of cycles and
/// the local polish are exposed. The random source is seeded from the OS.
///
/// # Errors
///
/// Same as [`hill_climbing_with_restarts`].
///
/// # Example
///
/// ```rust,no_run
/// use math_memetic_climbing::memetic_climbing;
///
/// let report = memetic_climbing(
///     &|x| x.iter().map(|&xi| xi * xi).sum(),
///     &vec![(-10.0, 10.0); 10],
///     10,
///     1000,
///     true,
/// )
/// .expect("valid problem");
/// println!("best value found: {}", report.fun);
/// ```
pub fn memetic_climbing<F>(
    func: &F,
    bounds: &[(f64, f64)],
    nx: usize,
    cycles: usize,
    local_search: bool,
) -> Result<ClimbReport>
where
    F: Fn(&Array1<f64>) -> f64 + Sync,
{
    let config = ClimbConfigBuilder::new()
        .cycles(cycles)
        .local_search(local_search)
        .build()?;
    hill_climbing_with_restarts(func, bounds, nx, config)
}
