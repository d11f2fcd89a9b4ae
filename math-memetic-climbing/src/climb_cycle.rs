use crate::ClimbConfig;
use crate::clip_to_bounds::clip_to_bounds;
use crate::error::ObjectiveError;
use crate::hollow_distribution::hollow_distribution;
use crate::init_random::init_random;
use ndarray::Array1;
use rand::Rng;
use std::cell::{Cell, RefCell};

/// Summary of one restart cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle index (0-based).
    pub cycle: usize,
    /// Objective value at the random start point.
    pub start_value: f64,
    /// Best value after the randomized stepping phase.
    pub climb_value: f64,
    /// Value returned by the local solver, if it ran and succeeded.
    pub refined_value: Option<f64>,
    /// Whether the refined point was adopted.
    pub refinement_accepted: bool,
    /// Final best value of the cycle.
    pub best_value: f64,
    /// Number of accepted stepping moves (ties included).
    pub accepted_moves: usize,
    /// Objective evaluations spent in this cycle.
    pub nfev: usize,
}

/// Best point and value of one cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Best point found by the cycle.
    pub x: Array1<f64>,
    /// Objective value at `x`.
    pub value: f64,
    /// Per-cycle summary.
    pub report: CycleReport,
}

/// Runs one independent restart cycle.
///
/// Samples a start point, performs `per_cycle_iterations` greedy hollow steps
/// with a geometrically decaying step size, then optionally polishes the best
/// point with `config.local_solver`. Nothing is shared with other cycles.
///
/// The first objective failure aborts the cycle. Local solver failures only
/// discard the refinement.
pub fn climb_cycle<F, E, R>(
    func: &F,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    config: &ClimbConfig,
    cycle: usize,
    rng: &mut R,
) -> Result<CycleOutcome, ObjectiveError>
where
    F: Fn(&Array1<f64>) -> Result<f64, E>,
    E: Into<ObjectiveError>,
    R: Rng + ?Sized,
{
    let nx = lower.len();
    let per_cycle_iterations = config.per_cycle_iterations();
    let mut nfev = 0usize;

    let mut best_x = init_random(lower, upper, rng);
    let mut best_value = func(&best_x).map_err(Into::<ObjectiveError>::into)?;
    nfev += 1;
    let start_value = best_value;

    let mut step_size = config.step_size;
    let mut accepted_moves = 0usize;
    for _ in 0..per_cycle_iterations {
        let mut next_x = &best_x + &(hollow_distribution(nx, rng) * step_size);
        clip_to_bounds(&mut next_x, lower, upper);
        let next_value = func(&next_x).map_err(Into::<ObjectiveError>::into)?;
        nfev += 1;

        if next_value <= best_value {
            best_x = next_x;
            best_value = next_value;
            accepted_moves += 1;
        }
        step_size *= config.decay_rate;
    }
    let climb_value = best_value;

    let mut refined_value = None;
    let mut refinement_accepted = false;
    if config.local_search {
        let failure: RefCell<Option<ObjectiveError>> = RefCell::new(None);
        let evaluations = Cell::new(0usize);
        // after the first failure the solver only sees NaN, `func` is not called again
        let objective = |x: &Array1<f64>| -> f64 {
            if failure.borrow().is_some() {
                return f64::NAN;
            }
            evaluations.set(evaluations.get() + 1);
            match func(x) {
                Ok(v) => v,
                Err(e) => {
                    let mut slot = failure.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e.into());
                    }
                    f64::NAN
                }
            }
        };

        let refined = config
            .local_solver
            .minimize(&objective, &best_x, lower, upper);
        nfev += evaluations.get();
        if let Some(err) = failure.into_inner() {
            return Err(err);
        }

        match refined {
            Ok(sol) => {
                refined_value = Some(sol.fun);
                if sol.fun <= best_value {
                    best_x = sol.x;
                    best_value = sol.fun;
                    refinement_accepted = true;
                } else {
                    log::debug!(
                        "cycle {cycle}: refinement rejected ({:.6e} > {:.6e})",
                        sol.fun,
                        best_value
                    );
                }
            }
            Err(e) => log::debug!("cycle {cycle}: refinement failed: {e}"),
        }
    }

    log::debug!(
        "cycle {cycle}: start={start_value:.6e} climb={climb_value:.6e} best={best_value:.6e} nfev={nfev}"
    );

    Ok(CycleOutcome {
        x: best_x,
        value: best_value,
        report: CycleReport {
            cycle,
            start_value,
            climb_value,
            refined_value,
            refinement_accepted,
            best_value,
            accepted_moves,
            nfev,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClimbConfigBuilder;
    use crate::local_search::{LocalSearchError, LocalSolution};
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::convert::Infallible;
    use std::sync::Arc;

    fn sphere(x: &Array1<f64>) -> Result<f64, Infallible> {
        Ok(x.iter().map(|&xi| xi * xi).sum())
    }

    fn failing_solver(
        _func: &dyn Fn(&Array1<f64>) -> f64,
        _x0: &Array1<f64>,
        _lower: &Array1<f64>,
        _upper: &Array1<f64>,
    ) -> Result<LocalSolution, LocalSearchError> {
        Err(LocalSearchError::Failed("did not converge".into()))
    }

    #[test]
    fn test_cycle_never_worsens_start() {
        let config = ClimbConfigBuilder::new()
            .cycles(1)
            .max_iterations(200)
            .local_search(false)
            .build()
            .unwrap();
        let lower = Array1::from_elem(4, -10.0);
        let upper = Array1::from_elem(4, 10.0);
        let mut rng = StdRng::seed_from_u64(5);

        let out = climb_cycle(&sphere, &lower, &upper, &config, 0, &mut rng).unwrap();

        assert!(out.report.climb_value <= out.report.start_value);
        assert_eq!(out.value, out.report.best_value);
        assert_eq!(out.report.nfev, 201);
        assert_eq!(out.report.refined_value, None);
        assert!((sphere(&out.x).unwrap() - out.value).abs() < 1e-12);
    }

    #[test]
    fn test_refinement_failure_keeps_climb_result() {
        let config = ClimbConfigBuilder::new()
            .cycles(1)
            .max_iterations(10)
            .local_solver(Arc::new(failing_solver))
            .build()
            .unwrap();
        let lower = array![-1.0, -1.0];
        let upper = array![1.0, 1.0];
        let mut rng = StdRng::seed_from_u64(9);

        let out = climb_cycle(&sphere, &lower, &upper, &config, 3, &mut rng).unwrap();

        assert_eq!(out.report.cycle, 3);
        assert_eq!(out.report.refined_value, None);
        assert!(!out.report.refinement_accepted);
        assert_eq!(out.value, out.report.climb_value);
    }

    #[test]
    fn test_objective_error_inside_refinement_propagates() {
        let config = ClimbConfigBuilder::new()
            .cycles(1)
            .max_iterations(5)
            .build()
            .unwrap();
        let lower = array![-1.0];
        let upper = array![1.0];
        let calls = Cell::new(0usize);
        // start point and 5 steps succeed, the solver's first probe fails
        let flaky = |x: &Array1<f64>| -> Result<f64, String> {
            calls.set(calls.get() + 1);
            if calls.get() > 6 {
                Err("solver probe failed".into())
            } else {
                Ok(x[0] * x[0])
            }
        };
        let mut rng = StdRng::seed_from_u64(1);

        let err = climb_cycle(&flaky, &lower, &upper, &config, 0, &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "solver probe failed");
    }

    #[test]
    fn test_objective_not_called_after_refinement_failure() {
        let config = ClimbConfigBuilder::new()
            .cycles(1)
            .max_iterations(5)
            .build()
            .unwrap();
        let lower = Array1::from_elem(3, -2.0);
        let upper = Array1::from_elem(3, 2.0);
        let calls = Cell::new(0usize);
        let first_failure = Cell::new(None);
        // fails from the solver's third probe onward
        let flaky = |x: &Array1<f64>| -> Result<f64, String> {
            calls.set(calls.get() + 1);
            if calls.get() >= 9 {
                if first_failure.get().is_none() {
                    first_failure.set(Some(calls.get()));
                }
                Err("boom".into())
            } else {
                Ok(x.dot(x))
            }
        };
        let mut rng = StdRng::seed_from_u64(12);

        let err = climb_cycle(&flaky, &lower, &upper, &config, 0, &mut rng).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(first_failure.get(), Some(9));
        assert_eq!(calls.get(), 9);
    }
}
