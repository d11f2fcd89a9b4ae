//! Memetic hill climbing library.
//!
//! This crate provides a derivative-free global optimizer for bounded,
//! black-box objective functions. It combines independent random restarts
//! with greedy hill climbing driven by a "hollow" perturbation distribution
//! and a decaying step size, followed by a bounded quasi-Newton (L-BFGS-B)
//! polish of every cycle's best point.
//!
//! # Features
//!
//! - Hollow perturbations: every step moves each coordinate by at least half
//!   the current step size
//! - Per-iteration geometric step-size annealing, reset at every restart
//! - Pluggable bounded local solver (built-in L-BFGS-B with finite-difference
//!   gradients)
//! - Deterministic under a fixed seed, sequential or parallel
//! - Fallible objectives with error propagation
//!
//! # Example
//!
//! ```rust
//! use math_memetic_climbing::{hill_climbing_with_restarts, ClimbConfigBuilder};
//!
//! // Minimize the sphere function: f(x) = sum(x_i^2)
//! let bounds = vec![(-5.0, 5.0); 3];
//! let config = ClimbConfigBuilder::new()
//!     .cycles(20)
//!     .max_iterations(2000)
//!     .step_size(2.0)
//!     .seed(42)
//!     .build()
//!     .expect("invalid config");
//!
//! let report = hill_climbing_with_restarts(
//!     &|x| x.iter().map(|&xi| xi * xi).sum(),
//!     &bounds,
//!     3,
//!     config,
//! )
//! .expect("optimization should succeed");
//!
//! assert!(report.fun < 1e-6);
//! ```
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod error;
pub use error::{ClimbError, ObjectiveError, Result};

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Element-wise clipping into the feasible box.
pub mod clip_to_bounds;
/// Uniform random start points inside the box.
pub mod init_random;
/// Hollow perturbation generator.
pub mod hollow_distribution;

/// One restart cycle: random start, hollow stepping, local polish.
pub mod climb_cycle;
/// Restart hill climbing entry point.
pub mod hill_climbing;
/// Memetic climbing entry point with default tuning.
pub mod memetic_climbing;

/// Bounded L-BFGS-B local solver.
pub mod lbfgsb;
/// Local refinement solver interface.
pub mod local_search;

/// Registry of standard benchmark objectives.
pub mod function_registry;
/// Parallel cycle execution support.
pub mod parallel_eval;

pub use climb_cycle::{CycleOutcome, CycleReport, climb_cycle};
pub use hill_climbing::{hill_climbing_with_restarts, try_hill_climbing_with_restarts};
pub use hollow_distribution::hollow_distribution;
pub use lbfgsb::{Lbfgsb, LbfgsbConfig};
pub use local_search::{LocalSearchError, LocalSolution, LocalSolver};
pub use memetic_climbing::memetic_climbing;
pub use parallel_eval::ParallelConfig;

/// Default number of restart cycles.
pub const DEFAULT_CYCLES: usize = 1000;
/// Default total iteration budget shared by all cycles.
pub const DEFAULT_MAX_ITERATIONS: usize = 20000;
/// Default initial step size.
pub const DEFAULT_STEP_SIZE: f64 = 20.0;
/// Default per-iteration step-size decay.
pub const DEFAULT_DECAY_RATE: f64 = 0.99977;

/// Configuration for the restart hill climber.
///
/// The per-cycle stepping budget is `max_iterations / cycles` (integer
/// division), so more cycles than iterations means no stepping at all and
/// every cycle reduces to a random sample plus the optional polish.
#[derive(Clone)]
pub struct ClimbConfig {
    /// Number of independent restarts.
    pub cycles: usize,
    /// Total stepping budget shared by all cycles.
    pub max_iterations: usize,
    /// Initial perturbation scale, reset at the start of every cycle.
    pub step_size: f64,
    /// Multiplicative decay applied to the step size after every step.
    pub decay_rate: f64,
    /// Polish each cycle's best point with `local_solver`.
    pub local_search: bool,
    /// Bounded local solver used for the polish.
    pub local_solver: Arc<dyn LocalSolver>,
    /// Optional random seed for reproducibility.
    pub seed: Option<u64>,
    /// Keep a [`CycleReport`] for every cycle in the final report.
    pub record_cycles: bool,
    /// Log progress at info level.
    pub disp: bool,
    /// Parallel cycle execution.
    pub parallel: ParallelConfig,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            cycles: DEFAULT_CYCLES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_size: DEFAULT_STEP_SIZE,
            decay_rate: DEFAULT_DECAY_RATE,
            local_search: true,
            local_solver: Arc::new(Lbfgsb::default()),
            seed: None,
            record_cycles: false,
            disp: false,
            parallel: ParallelConfig::default(),
        }
    }
}

impl fmt::Debug for ClimbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClimbConfig")
            .field("cycles", &self.cycles)
            .field("max_iterations", &self.max_iterations)
            .field("step_size", &self.step_size)
            .field("decay_rate", &self.decay_rate)
            .field("local_search", &self.local_search)
            .field("seed", &self.seed)
            .field("record_cycles", &self.record_cycles)
            .field("disp", &self.disp)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl ClimbConfig {
    /// Stepping iterations each cycle gets.
    pub fn per_cycle_iterations(&self) -> usize {
        self.max_iterations.checked_div(self.cycles).unwrap_or(0)
    }

    /// Checks the tuning parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClimbError::InvalidCycles` if `cycles == 0`,
    /// `ClimbError::InvalidStepSize` if the step size is not finite and positive,
    /// `ClimbError::InvalidDecayRate` if the decay rate is outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.cycles == 0 {
            return Err(ClimbError::InvalidCycles);
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ClimbError::InvalidStepSize {
                step_size: self.step_size,
            });
        }
        if !(self.decay_rate > 0.0 && self.decay_rate <= 1.0) {
            return Err(ClimbError::InvalidDecayRate {
                decay_rate: self.decay_rate,
            });
        }
        Ok(())
    }
}

/// Fluent builder for `ClimbConfig`.
///
/// # Example
///
/// ```rust
/// use math_memetic_climbing::ClimbConfigBuilder;
///
/// let config = ClimbConfigBuilder::new()
///     .cycles(100)
///     .max_iterations(5000)
///     .step_size(5.0)
///     .decay_rate(0.999)
///     .local_search(false)
///     .seed(7)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.per_cycle_iterations(), 50);
/// ```
pub struct ClimbConfigBuilder {
    cfg: ClimbConfig,
}

impl Default for ClimbConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClimbConfigBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            cfg: ClimbConfig::default(),
        }
    }
    /// Sets the number of restart cycles.
    pub fn cycles(mut self, v: usize) -> Self {
        self.cfg.cycles = v;
        self
    }
    /// Sets the total stepping budget.
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.cfg.max_iterations = v;
        self
    }
    /// Sets the initial step size.
    pub fn step_size(mut self, v: f64) -> Self {
        self.cfg.step_size = v;
        self
    }
    /// Sets the per-step decay rate.
    pub fn decay_rate(mut self, v: f64) -> Self {
        self.cfg.decay_rate = v;
        self
    }
    /// Enables/disables the local polish.
    pub fn local_search(mut self, v: bool) -> Self {
        self.cfg.local_search = v;
        self
    }
    /// Replaces the local solver.
    pub fn local_solver(mut self, solver: Arc<dyn LocalSolver>) -> Self {
        self.cfg.local_solver = solver;
        self
    }
    /// Sets the random seed for reproducibility.
    pub fn seed(mut self, v: u64) -> Self {
        self.cfg.seed = Some(v);
        self
    }
    /// Enables/disables the per-cycle log.
    pub fn record_cycles(mut self, v: bool) -> Self {
        self.cfg.record_cycles = v;
        self
    }
    /// Enables/disables progress logging.
    pub fn disp(mut self, v: bool) -> Self {
        self.cfg.disp = v;
        self
    }
    /// Sets the parallel execution configuration.
    pub fn parallel(mut self, parallel: ParallelConfig) -> Self {
        self.cfg.parallel = parallel;
        self
    }
    /// Enables/disables parallel cycles.
    pub fn enable_parallel(mut self, enable: bool) -> Self {
        self.cfg.parallel.enabled = enable;
        self
    }
    /// Sets the number of parallel threads.
    pub fn parallel_threads(mut self, num_threads: usize) -> Self {
        self.cfg.parallel.num_threads = Some(num_threads);
        self
    }
    /// Builds and returns the configuration.
    ///
    /// # Errors
    ///
    /// See [`ClimbConfig::validate`].
    pub fn build(self) -> Result<ClimbConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Result of a restart hill climbing run.
#[derive(Clone)]
pub struct ClimbReport {
    /// Best point found over all cycles.
    pub x: Array1<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Total number of objective evaluations.
    pub nfev: usize,
    /// Stepping iterations performed by each cycle.
    pub per_cycle_iterations: usize,
    /// Per-cycle log (empty unless `record_cycles` was set).
    pub cycles: Vec<CycleReport>,
}

impl fmt::Debug for ClimbReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClimbReport")
            .field("x", &format!("len={}", self.x.len()))
            .field("fun", &self.fun)
            .field("nfev", &self.nfev)
            .field("per_cycle_iterations", &self.per_cycle_iterations)
            .field("cycles", &format!("len={}", self.cycles.len()))
            .finish()
    }
}

/// Restart hill climber.
///
/// Use [`HillClimber::new`] to create an instance, configure with
/// [`config_mut`](Self::config_mut), then call [`solve`](Self::solve) (or
/// [`try_solve`](Self::try_solve) for fallible objectives).
pub struct HillClimber<'a, F> {
    func: &'a F,
    lower: Array1<f64>,
    upper: Array1<f64>,
    config: ClimbConfig,
}

impl<'a, F> HillClimber<'a, F> {
    /// Creates a climber for `func` over the box `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// Returns `ClimbError::ZeroDimension` for empty bounds,
    /// `ClimbError::BoundsMismatch` if `lower` and `upper` differ in length,
    /// `ClimbError::NonFiniteBounds` for NaN or infinite bounds and
    /// `ClimbError::InvalidBounds` if a lower bound exceeds its upper bound.
    pub fn new(func: &'a F, lower: Array1<f64>, upper: Array1<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(ClimbError::BoundsMismatch {
                lower_len: lower.len(),
                upper_len: upper.len(),
            });
        }
        if lower.is_empty() {
            return Err(ClimbError::ZeroDimension);
        }

        for i in 0..lower.len() {
            if !lower[i].is_finite() || !upper[i].is_finite() {
                return Err(ClimbError::NonFiniteBounds {
                    index: i,
                    lower: lower[i],
                    upper: upper[i],
                });
            }
            if lower[i] > upper[i] {
                return Err(ClimbError::InvalidBounds {
                    index: i,
                    lower: lower[i],
                    upper: upper[i],
                });
            }
        }

        Ok(Self {
            func,
            lower,
            upper,
            config: ClimbConfig::default(),
        })
    }

    /// Mutable access to configuration
    pub fn config_mut(&mut self) -> &mut ClimbConfig {
        &mut self.config
    }

    fn run<G, E>(&self, func: &G) -> Result<ClimbReport>
    where
        G: Fn(&Array1<f64>) -> std::result::Result<f64, E> + Sync,
        E: Into<ObjectiveError>,
    {
        self.config.validate()?;

        let n = self.lower.len();
        let cycles = self.config.cycles;
        let per_cycle_iterations = self.config.per_cycle_iterations();

        if self.config.disp {
            log::info!(
                "Hill climbing init: {} dimensions, cycles={}, iterations/cycle={}, step_size={}, decay_rate={}",
                n,
                cycles,
                per_cycle_iterations,
                self.config.step_size,
                self.config.decay_rate
            );
            log::info!(
                "  local search: {}, parallel: {}",
                self.config.local_search,
                self.config.parallel.enabled
            );
        }

        let mut rng: StdRng = match self.config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut thread_rng = rand::rng();
                StdRng::from_rng(&mut thread_rng)
            }
        };
        let seeds: Vec<u64> = (0..cycles).map(|_| rng.random::<u64>()).collect();

        let (lower, upper, config) = (&self.lower, &self.upper, &self.config);
        let outcomes = parallel_eval::run_cycles(
            &seeds,
            |cycle, seed| {
                let mut cycle_rng = StdRng::seed_from_u64(seed);
                climb_cycle(func, lower, upper, config, cycle, &mut cycle_rng)
            },
            &config.parallel,
        )
        .map_err(ClimbError::Objective)?;

        let mut best_x = None;
        let mut best_value = f64::INFINITY;
        let mut nfev = 0usize;
        let mut reports = Vec::new();
        for outcome in outcomes {
            nfev += outcome.report.nfev;
            // strict: ties keep the earlier cycle
            if outcome.value < best_value {
                best_value = outcome.value;
                best_x = Some(outcome.x);
                if config.disp {
                    log::info!(
                        "cycle {:>5}: new global best f(x) = {:.6e}",
                        outcome.report.cycle,
                        best_value
                    );
                }
            } else if best_x.is_none() {
                best_x = Some(outcome.x);
            }
            if config.record_cycles {
                reports.push(outcome.report);
            }
        }

        if self.config.disp {
            log::info!(
                "Hill climbing done: best f(x) = {:.6e}, nfev = {}",
                best_value,
                nfev
            );
        }

        Ok(ClimbReport {
            x: best_x.unwrap_or_else(|| self.lower.clone()),
            fun: best_value,
            nfev,
            per_cycle_iterations,
            cycles: reports,
        })
    }
}

impl<'a, F> HillClimber<'a, F>
where
    F: Fn(&Array1<f64>) -> f64 + Sync,
{
    /// Run the optimization and return a report
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tuning parameters are invalid.
    pub fn solve(&mut self) -> Result<ClimbReport> {
        let func = self.func;
        self.run(&|x: &Array1<f64>| Ok::<f64, Infallible>(func(x)))
    }
}

impl<'a, F, E> HillClimber<'a, F>
where
    F: Fn(&Array1<f64>) -> std::result::Result<f64, E> + Sync,
    E: Into<ObjectiveError>,
{
    /// Run the optimization with a fallible objective.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tuning parameters are invalid and
    /// `ClimbError::Objective` with the first failure of the objective.
    pub fn try_solve(&mut self) -> Result<ClimbReport> {
        let func = self.func;
        self.run(func)
    }
}
