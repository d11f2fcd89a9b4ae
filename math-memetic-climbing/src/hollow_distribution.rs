use ndarray::Array1;
use rand::Rng;

/// Folds a uniform draw from `[-1, 1)` onto `[-1, -0.5] ∪ [0.5, 1)`.
///
/// Values in `(-0.5, 0)` are shifted down by 0.5, values in `[0, 0.5)` are
/// shifted up by 0.5, everything else is returned unchanged.
#[inline]
pub fn hollow_fold(u: f64) -> f64 {
    if -0.5 < u && u < 0.0 {
        u - 0.5
    } else if (0.0..0.5).contains(&u) {
        u + 0.5
    } else {
        u
    }
}

/// Draws an `nx`-dimensional perturbation vector whose components all have
/// magnitude in `[0.5, 1]`.
///
/// Every step proposed by the climber moves each coordinate by at least half
/// of the current step size, in either direction.
pub fn hollow_distribution<R: Rng + ?Sized>(nx: usize, rng: &mut R) -> Array1<f64> {
    Array1::from_shape_fn(nx, |_| hollow_fold(rng.random_range(-1.0..1.0)))
}
