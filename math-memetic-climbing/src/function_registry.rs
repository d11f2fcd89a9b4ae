//! Standard benchmark objectives for driving and testing the climber.
//!
//! Every entry carries the usual search box (the same interval in every
//! dimension) and the known global minimum value, so results can be reported
//! as a deviation from the optimum.

use ndarray::Array1;
use std::collections::BTreeMap;
use std::f64::consts::{E, PI};

/// Test function type definition
pub type TestFunction = fn(&Array1<f64>) -> f64;

/// A benchmark objective with its search box and known optimum.
#[derive(Debug, Clone)]
pub struct BenchmarkFunction {
    /// Registry name.
    pub name: &'static str,
    /// Objective.
    pub func: TestFunction,
    /// Per-dimension search interval.
    pub interval: (f64, f64),
    /// Known global minimum value.
    pub optimum: f64,
    /// Whether the landscape has many local minima.
    pub multimodal: bool,
    /// Short description.
    pub description: &'static str,
}

impl BenchmarkFunction {
    /// Bounds for an `nx`-dimensional instance.
    pub fn bounds(&self, nx: usize) -> Vec<(f64, f64)> {
        vec![self.interval; nx]
    }
}

/// Sphere: `f(x) = sum x_i^2`, minimum 0 at the origin.
pub fn sphere(x: &Array1<f64>) -> f64 {
    x.dot(x)
}

/// Rastrigin: minimum 0 at the origin.
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    10.0 * x.len() as f64
        + x.iter()
            .map(|&xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
            .sum::<f64>()
}

/// Ackley: minimum 0 at the origin.
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let sum_sq = x.dot(x) / n;
    let sum_cos = x.iter().map(|&xi| (2.0 * PI * xi).cos()).sum::<f64>() / n;
    -20.0 * (-0.2 * sum_sq.sqrt()).exp() - sum_cos.exp() + 20.0 + E
}

/// Rosenbrock: minimum 0 at `(1, ..., 1)`.
pub fn rosenbrock(x: &Array1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

/// Griewank: minimum 0 at the origin.
pub fn griewank(x: &Array1<f64>) -> f64 {
    let sum = x.dot(x) / 4000.0;
    let prod: f64 = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| (xi / ((i + 1) as f64).sqrt()).cos())
        .product();
    sum - prod + 1.0
}

/// Schwefel 2.26: minimum 0 at `(420.9687, ..., 420.9687)`.
pub fn schwefel(x: &Array1<f64>) -> f64 {
    418.9828872724338 * x.len() as f64
        - x.iter().map(|&xi| xi * xi.abs().sqrt().sin()).sum::<f64>()
}

/// Zakharov: minimum 0 at the origin.
pub fn zakharov(x: &Array1<f64>) -> f64 {
    let weighted: f64 = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| 0.5 * (i + 1) as f64 * xi)
        .sum();
    x.dot(x) + weighted.powi(2) + weighted.powi(4)
}

/// Levy: minimum 0 at `(1, ..., 1)`.
pub fn levy(x: &Array1<f64>) -> f64 {
    let w = x.mapv(|xi| 1.0 + (xi - 1.0) / 4.0);
    let n = w.len();
    let head = (PI * w[0]).sin().powi(2);
    let body: f64 = (0..n - 1)
        .map(|i| (w[i] - 1.0).powi(2) * (1.0 + 10.0 * (PI * w[i] + 1.0).sin().powi(2)))
        .sum();
    let tail = (w[n - 1] - 1.0).powi(2) * (1.0 + (2.0 * PI * w[n - 1]).sin().powi(2));
    head + body + tail
}

/// Function registry mapping names to benchmark objectives.
pub struct FunctionRegistry {
    functions: BTreeMap<&'static str, BenchmarkFunction>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Creates a new registry with all standard test functions.
    pub fn new() -> Self {
        let entries = [
            BenchmarkFunction {
                name: "sphere",
                func: sphere,
                interval: (-10.0, 10.0),
                optimum: 0.0,
                multimodal: false,
                description: "Convex quadratic bowl",
            },
            BenchmarkFunction {
                name: "rastrigin",
                func: rastrigin,
                interval: (-5.12, 5.12),
                optimum: 0.0,
                multimodal: true,
                description: "Highly multimodal cosine-modulated bowl",
            },
            BenchmarkFunction {
                name: "ackley",
                func: ackley,
                interval: (-32.768, 32.768),
                optimum: 0.0,
                multimodal: true,
                description: "Nearly flat outer region with a deep central funnel",
            },
            BenchmarkFunction {
                name: "rosenbrock",
                func: rosenbrock,
                interval: (-2.048, 2.048),
                optimum: 0.0,
                multimodal: false,
                description: "Narrow curved valley",
            },
            BenchmarkFunction {
                name: "griewank",
                func: griewank,
                interval: (-600.0, 600.0),
                optimum: 0.0,
                multimodal: true,
                description: "Product of cosines over a wide quadratic",
            },
            BenchmarkFunction {
                name: "schwefel",
                func: schwefel,
                interval: (-500.0, 500.0),
                optimum: 0.0,
                multimodal: true,
                description: "Deceptive, best minimum far from the second best",
            },
            BenchmarkFunction {
                name: "zakharov",
                func: zakharov,
                interval: (-5.0, 10.0),
                optimum: 0.0,
                multimodal: false,
                description: "Unimodal plate-shaped function",
            },
            BenchmarkFunction {
                name: "levy",
                func: levy,
                interval: (-10.0, 10.0),
                optimum: 0.0,
                multimodal: true,
                description: "Multimodal with a sine-modulated valley",
            },
        ];
        Self {
            functions: entries.into_iter().map(|f| (f.name, f)).collect(),
        }
    }

    /// Looks a function up by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&BenchmarkFunction> {
        let key = name.trim().to_lowercase();
        self.functions.get(key.as_str())
    }

    /// All registered names, sorted.
    pub fn list_functions(&self) -> Vec<&'static str> {
        self.functions.keys().copied().collect()
    }
}
