use math_memetic_climbing::{
    ClimbConfigBuilder, LocalSearchError, LocalSolution, ParallelConfig,
    hill_climbing_with_restarts,
};
use ndarray::Array1;
use std::sync::Arc;

/// Cheap coordinate search used instead of L-BFGS-B.
fn coordinate_search(
    func: &dyn Fn(&Array1<f64>) -> f64,
    x0: &Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
) -> Result<LocalSolution, LocalSearchError> {
    let mut x = x0.clone();
    let mut fx = func(&x);
    let mut nfev = 1;
    let mut h = 0.1;
    let mut iterations = 0;
    while h > 1e-9 && iterations < 10_000 {
        iterations += 1;
        let mut improved = false;
        for i in 0..x.len() {
            for delta in [h, -h] {
                let mut trial = x.clone();
                trial[i] = (trial[i] + delta).clamp(lower[i], upper[i]);
                let ft = func(&trial);
                nfev += 1;
                if ft < fx {
                    x = trial;
                    fx = ft;
                    improved = true;
                }
            }
        }
        if !improved {
            h *= 0.5;
        }
    }
    Ok(LocalSolution {
        x,
        fun: fx,
        iterations,
        nfev,
        converged: h <= 1e-9,
        message: "coordinate search finished".into(),
    })
}

fn main() {
    let himmelblau = |x: &Array1<f64>| {
        (x[0] * x[0] + x[1] - 11.0).powi(2) + (x[0] + x[1] * x[1] - 7.0).powi(2)
    };

    let config = ClimbConfigBuilder::new()
        .cycles(64)
        .max_iterations(6400)
        .step_size(3.0)
        .local_solver(Arc::new(coordinate_search))
        .parallel(ParallelConfig {
            enabled: true,
            num_threads: None,
        })
        .seed(1)
        .build()
        .expect("valid config");

    let report = hill_climbing_with_restarts(&himmelblau, &[(-5.0, 5.0), (-5.0, 5.0)], 2, config)
        .expect("valid problem");
    println!("himmelblau: best f={:.6e} at x={}", report.fun, report.x);
}
