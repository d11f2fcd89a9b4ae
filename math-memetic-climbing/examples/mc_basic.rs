use math_memetic_climbing::function_registry::rastrigin;
use math_memetic_climbing::{ClimbConfigBuilder, hill_climbing_with_restarts, memetic_climbing};
use ndarray::Array1;

fn main() {
    env_logger::init();

    // Sphere in 10 dimensions with the default tuning
    let sphere = |x: &Array1<f64>| x.iter().map(|&xi| xi * xi).sum::<f64>();
    let bounds = vec![(-10.0, 10.0); 10];
    let report = memetic_climbing(&sphere, &bounds, 10, 1000, true).expect("valid problem");
    println!("sphere:    best f={:.6e} nfev={}", report.fun, report.nfev);

    // Rastrigin with a smaller step and a per-cycle log
    let config = ClimbConfigBuilder::new()
        .cycles(200)
        .max_iterations(40000)
        .step_size(2.0)
        .decay_rate(0.995)
        .record_cycles(true)
        .seed(42)
        .disp(true)
        .build()
        .expect("valid config");
    let report = hill_climbing_with_restarts(&rastrigin, &vec![(-5.12, 5.12); 5], 5, config)
        .expect("valid problem");

    let polished = report
        .cycles
        .iter()
        .filter(|c| c.refinement_accepted)
        .count();
    println!(
        "rastrigin: best f={:.6e} x={} ({} of {} cycles improved by L-BFGS-B)",
        report.fun,
        report.x,
        polished,
        report.cycles.len()
    );
}
