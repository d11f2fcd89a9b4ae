//! L-BFGS-B (bounded limited-memory BFGS) local solver
//!
//! A projected quasi-Newton method for box-constrained problems. The gradient
//! is approximated by finite differences that never leave the box, so the
//! objective is only ever evaluated at feasible points.

use crate::clip_to_bounds::clip_to_bounds;
use crate::local_search::{LocalSearchError, LocalSolution, LocalSolver};
use ndarray::{Array1, Zip};
use std::collections::VecDeque;

const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// L-BFGS-B solver configuration
#[derive(Debug, Clone)]
pub struct LbfgsbConfig {
    /// Number of correction pairs kept in memory
    pub memory: usize,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Maximum number of objective evaluations (gradient probes included)
    pub max_evaluations: usize,
    /// Stop when the infinity norm of the projected gradient falls below this
    pub pgtol: f64,
    /// Stop when the relative reduction of the objective falls below this
    pub ftol: f64,
    /// Relative finite-difference step
    pub fd_step: f64,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for LbfgsbConfig {
    fn default() -> Self {
        Self {
            memory: 10,
            max_iterations: 15000,
            max_evaluations: 15000,
            pgtol: 1e-5,
            ftol: 1e7 * f64::EPSILON,
            fd_step: f64::EPSILON.sqrt(),
            print_interval: 0,
        }
    }
}

/// Default bounded refiner used by the hill climber.
#[derive(Debug, Clone, Default)]
pub struct Lbfgsb {
    /// Solver settings.
    pub config: LbfgsbConfig,
}

impl Lbfgsb {
    /// Creates a solver with the given configuration.
    pub fn new(config: LbfgsbConfig) -> Self {
        Self { config }
    }
}

impl LocalSolver for Lbfgsb {
    fn minimize(
        &self,
        func: &dyn Fn(&Array1<f64>) -> f64,
        x0: &Array1<f64>,
        lower: &Array1<f64>,
        upper: &Array1<f64>,
    ) -> Result<LocalSolution, LocalSearchError> {
        lbfgsb(func, x0, lower, upper, &self.config)
    }
}

/// Limited-memory curvature pairs `(s, y, 1 / y^T s)`.
struct Corrections {
    pairs: VecDeque<(Array1<f64>, Array1<f64>, f64)>,
    capacity: usize,
}

impl Corrections {
    fn new(capacity: usize) -> Self {
        Self {
            pairs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Stores a pair if it keeps the Hessian approximation positive definite.
    fn push(&mut self, s: Array1<f64>, y: Array1<f64>) {
        let sy = s.dot(&y);
        let yy = y.dot(&y);
        if self.capacity == 0 || !(sy > f64::EPSILON * yy) {
            return;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back((s, y, 1.0 / sy));
    }

    /// Two-loop recursion: returns `-H g`.
    fn direction(&self, g: &Array1<f64>) -> Array1<f64> {
        let Some((s_last, y_last, _)) = self.pairs.back() else {
            return -g;
        };

        let mut q = g.clone();
        let mut alpha = vec![0.0; self.pairs.len()];
        for (k, (s, y, rho)) in self.pairs.iter().enumerate().rev() {
            alpha[k] = rho * s.dot(&q);
            q.scaled_add(-alpha[k], y);
        }

        let gamma = s_last.dot(y_last) / y_last.dot(y_last);
        let mut r = q * gamma;
        for (k, (s, y, rho)) in self.pairs.iter().enumerate() {
            let beta = rho * y.dot(&r);
            r.scaled_add(alpha[k] - beta, s);
        }
        -r
    }
}

/// Minimize `func` over `[lower, upper]` starting from `x0`.
///
/// The start point is clipped into the box first. The returned point is never
/// worse than the clipped start.
pub fn lbfgsb(
    func: &dyn Fn(&Array1<f64>) -> f64,
    x0: &Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    config: &LbfgsbConfig,
) -> Result<LocalSolution, LocalSearchError> {
    let n = x0.len();
    if lower.len() != n || upper.len() != n {
        return Err(LocalSearchError::DimensionMismatch {
            x0_len: n,
            bounds_len: lower.len().min(upper.len()),
        });
    }

    let mut nfev = 0usize;
    let mut x = x0.clone();
    clip_to_bounds(&mut x, lower, upper);
    let mut f = func(&x);
    nfev += 1;
    if !f.is_finite() {
        return Err(LocalSearchError::NonFiniteStart { value: f });
    }
    let mut g = approx_gradient(func, &x, f, lower, upper, config.fd_step, &mut nfev);

    let mut corrections = Corrections::new(config.memory);
    let mut iterations = 0usize;
    let mut converged = false;
    let mut message = String::from("iteration budget exhausted");

    while iterations < config.max_iterations {
        if projected_gradient_norm(&x, &g, lower, upper) <= config.pgtol {
            converged = true;
            message = "projected gradient below pgtol".into();
            break;
        }
        if nfev >= config.max_evaluations {
            message = "evaluation budget exhausted".into();
            break;
        }

        let mut d = corrections.direction(&g);
        freeze_active(&mut d, &x, lower, upper);
        if !(g.dot(&d) < 0.0) {
            corrections.clear();
            d = -&g;
            freeze_active(&mut d, &x, lower, upper);
            if !(g.dot(&d) < 0.0) {
                converged = true;
                message = "no feasible descent direction".into();
                break;
            }
        }

        let mut step = if corrections.is_empty() {
            (1.0 / d.dot(&d).sqrt()).min(1.0)
        } else {
            1.0
        };
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let mut x_new = &x + &(&d * step);
            clip_to_bounds(&mut x_new, lower, upper);
            let f_new = func(&x_new);
            nfev += 1;
            let predicted = g.dot(&(&x_new - &x)).min(0.0);
            if f_new.is_finite() && f_new <= f + ARMIJO_C1 * predicted {
                accepted = Some((x_new, f_new));
                break;
            }
            if nfev >= config.max_evaluations {
                break;
            }
            step *= 0.5;
        }
        let Some((x_new, f_new)) = accepted else {
            message = "line search failed to find a sufficient decrease".into();
            break;
        };

        iterations += 1;
        let g_new = approx_gradient(func, &x_new, f_new, lower, upper, config.fd_step, &mut nfev);
        let reduction = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
        corrections.push(&x_new - &x, &g_new - &g);
        x = x_new;
        f = f_new;
        g = g_new;

        if config.print_interval > 0 && iterations % config.print_interval == 0 {
            log::info!(
                "L-BFGS-B iteration {}: f = {:.6e}, nfev = {}",
                iterations,
                f,
                nfev
            );
        }

        if reduction <= config.ftol {
            converged = true;
            message = "relative reduction below ftol".into();
            break;
        }
    }

    Ok(LocalSolution {
        x,
        fun: f,
        iterations,
        nfev,
        converged,
        message,
    })
}

/// Finite-difference gradient whose probes stay inside the box.
fn approx_gradient(
    func: &dyn Fn(&Array1<f64>) -> f64,
    x: &Array1<f64>,
    fx: f64,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    fd_step: f64,
    nfev: &mut usize,
) -> Array1<f64> {
    let mut g = Array1::<f64>::zeros(x.len());
    let mut probe = x.clone();
    for i in 0..x.len() {
        let span = upper[i] - lower[i];
        if span <= 0.0 {
            continue;
        }
        // h <= span / 2 guarantees one of x +/- h is feasible
        let h = (fd_step * x[i].abs().max(1.0)).min(0.5 * span);
        probe[i] = if x[i] + h <= upper[i] { x[i] + h } else { x[i] - h };
        let dx = probe[i] - x[i];
        let fp = func(&probe);
        *nfev += 1;
        probe[i] = x[i];
        let gi = (fp - fx) / dx;
        if gi.is_finite() {
            g[i] = gi;
        }
    }
    g
}

/// Infinity norm of `P(x - g) - x`, where `P` projects onto the box.
fn projected_gradient_norm(
    x: &Array1<f64>,
    g: &Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
) -> f64 {
    let mut norm = 0.0f64;
    Zip::from(x)
        .and(g)
        .and(lower)
        .and(upper)
        .for_each(|&xi, &gi, &lo, &hi| {
            let pg = (xi - gi).max(lo).min(hi) - xi;
            norm = norm.max(pg.abs());
        });
    norm
}

/// Zeroes direction components that would push an active variable out of the box.
fn freeze_active(d: &mut Array1<f64>, x: &Array1<f64>, lower: &Array1<f64>, upper: &Array1<f64>) {
    Zip::from(d)
        .and(x)
        .and(lower)
        .and(upper)
        .for_each(|di, &xi, &lo, &hi| {
            if (xi <= lo && *di < 0.0) || (xi >= hi && *di > 0.0) {
                *di = 0.0;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::cell::RefCell;

    fn sphere(x: &Array1<f64>) -> f64 {
        x.iter().map(|&xi| xi * xi).sum()
    }

    #[test]
    fn test_lbfgsb_sphere() {
        let lower = Array1::from_elem(5, -10.0);
        let upper = Array1::from_elem(5, 10.0);
        let x0 = array![3.0, -7.5, 1.0, 9.0, -2.0];

        let sol = lbfgsb(&sphere, &x0, &lower, &upper, &LbfgsbConfig::default()).unwrap();

        assert!(sol.converged, "should converge: {}", sol.message);
        assert!(sol.fun < 1e-8, "f = {}", sol.fun);
    }

    #[test]
    fn test_lbfgsb_active_bound() {
        // unconstrained minimum at (3, -3) lies outside the box
        let shifted = |x: &Array1<f64>| (x[0] - 3.0).powi(2) + (x[1] + 3.0).powi(2);
        let lower = array![-1.0, -1.0];
        let upper = array![1.0, 1.0];

        let sol = lbfgsb(&shifted, &array![0.0, 0.0], &lower, &upper, &LbfgsbConfig::default())
            .unwrap();

        assert!((sol.x[0] - 1.0).abs() < 1e-6, "x = {}", sol.x);
        assert!((sol.x[1] + 1.0).abs() < 1e-6, "x = {}", sol.x);
        assert!((sol.fun - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_lbfgsb_rosenbrock() {
        let rosen = |x: &Array1<f64>| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2);
        let lower = array![-2.048, -2.048];
        let upper = array![2.048, 2.048];

        let sol =
            lbfgsb(&rosen, &array![-1.2, 1.0], &lower, &upper, &LbfgsbConfig::default()).unwrap();

        assert!(sol.fun < 1e-4, "f = {} ({})", sol.fun, sol.message);
    }

    #[test]
    fn test_lbfgsb_evaluates_inside_box_only() {
        let lower = array![0.0, -1.0, 2.0];
        let upper = array![1.0, 1.0, 2.0];
        let seen = RefCell::new(Vec::new());
        let tracked = |x: &Array1<f64>| {
            seen.borrow_mut().push(x.clone());
            (x[0] - 5.0).powi(2) + (x[1] + 0.3).powi(2) + x[2]
        };

        let sol = lbfgsb(&tracked, &array![1.0, 1.0, 2.0], &lower, &upper, &LbfgsbConfig::default())
            .unwrap();

        assert!((sol.x[0] - 1.0).abs() < 1e-12);
        assert!((sol.x[1] + 0.3).abs() < 1e-4);
        for x in seen.borrow().iter() {
            for i in 0..3 {
                assert!(x[i] >= lower[i] && x[i] <= upper[i], "probe {x} left the box");
            }
        }
    }

    #[test]
    fn test_lbfgsb_never_worse_than_start() {
        let rastrigin = |x: &Array1<f64>| {
            10.0 * x.len() as f64
                + x.iter()
                    .map(|&xi| xi * xi - 10.0 * (2.0 * std::f64::consts::PI * xi).cos())
                    .sum::<f64>()
        };
        let lower = Array1::from_elem(3, -5.12);
        let upper = Array1::from_elem(3, 5.12);
        for start in [array![1.3, -2.2, 4.9], array![-5.12, 0.4, 0.51]] {
            let f0 = rastrigin(&start);
            let sol = lbfgsb(&rastrigin, &start, &lower, &upper, &LbfgsbConfig::default()).unwrap();
            assert!(sol.fun <= f0);
        }
    }

    #[test]
    fn test_lbfgsb_rejects_non_finite_start() {
        let bad = |_: &Array1<f64>| f64::NAN;
        let err = lbfgsb(&bad, &array![0.0], &array![-1.0], &array![1.0], &LbfgsbConfig::default())
            .unwrap_err();
        assert!(matches!(err, LocalSearchError::NonFiniteStart { .. }));
    }

    #[test]
    fn test_lbfgsb_dimension_mismatch() {
        let err = lbfgsb(
            &sphere,
            &array![0.0, 1.0],
            &array![-1.0],
            &array![1.0],
            &LbfgsbConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LocalSearchError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_lbfgsb_respects_evaluation_budget() {
        let config = LbfgsbConfig {
            max_evaluations: 12,
            ..LbfgsbConfig::default()
        };
        let lower = Array1::from_elem(4, -10.0);
        let upper = Array1::from_elem(4, 10.0);
        let sol = Lbfgsb::new(config)
            .minimize(&sphere, &array![5.0, 5.0, 5.0, 5.0], &lower, &upper)
            .unwrap();
        // one gradient (4 probes) or one line-search trial may run past the cap
        assert!(sol.nfev <= 12 + 4 + 1, "nfev = {}", sol.nfev);
    }
}
