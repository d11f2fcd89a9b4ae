use ndarray::{Array1, Zip};

/// Clips `x` element-wise into `[lower, upper]`.
///
/// Bounds must already be validated (finite, `lower <= upper`).
pub fn clip_to_bounds(x: &mut Array1<f64>, lower: &Array1<f64>, upper: &Array1<f64>) {
    Zip::from(x)
        .and(lower)
        .and(upper)
        .for_each(|xi, &lo, &hi| *xi = xi.max(lo).min(hi));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_clip() {
        let mut x = array![-12.0, 0.5, 40.0];
        clip_to_bounds(&mut x, &array![-10.0, 0.0, -1.0], &array![10.0, 1.0, 1.0]);
        assert_eq!(x, array![-10.0, 0.5, 1.0]);
    }
}
