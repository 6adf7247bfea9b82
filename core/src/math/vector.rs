/// Component-wise difference `a - b`.
pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Euclidean norm.
pub fn norm(v: &[f64; 3]) -> f64 {
    (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt()
}

pub fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    norm(&sub(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_norm_of_difference() {
        assert_eq!(distance(&[1.0, 2.0, 2.0], &[0.0, 0.0, 0.0]), 3.0);
        assert_eq!(distance(&[4.0, 0.0, 3.0], &[4.0, 0.0, 3.0]), 0.0);
        assert_eq!(sub(&[1.0, 1.0, 1.0], &[0.5, 2.0, 0.0]), [0.5, -1.0, 1.0]);
    }
}
