use ndarray::Array1;
use rand::Rng;

/// Samples a start point uniformly inside `[lower, upper]`.
///
/// Coordinates with `lower == upper` are fixed to the bound. Finite bounds
/// whose span overflows `f64` still yield a finite point inside the box.
pub fn init_random<R: Rng + ?Sized>(
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    rng: &mut R,
) -> Array1<f64> {
    let mut x = Array1::<f64>::zeros(lower.len());
    for j in 0..lower.len() {
        let u: f64 = rng.random::<f64>();
        x[j] = (lower[j] * (1.0 - u) + upper[j] * u).clamp(lower[j], upper[j]);
    }
    x
}
