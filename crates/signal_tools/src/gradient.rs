//! Discrete derivatives on (possibly) non-uniform time bases.

/// First differences `x[i+1] - x[i]`
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Mean sample spacing, `None` if fewer than 2 samples or not positive
pub fn mean_dt(time: &[f64]) -> Option<f64> {
    if time.len() < 2 {
        return None;
    }
    let dt = (time[time.len() - 1] - time[0]) / (time.len() - 1) as f64;
    (dt.is_finite() && dt > 0.0).then_some(dt)
}

/// Gradient of `values` with respect to `time`
///
/// Second-order central differences in the interior (exact for quadratics on
/// non-uniform spacing), first-order one-sided differences at the edges.
/// Returns an empty vector when fewer than 2 samples are given or lengths differ.
pub fn gradient(values: &[f64], time: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 || time.len() != n {
        return Vec::new();
    }

    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / (time[1] - time[0]);
    out[n - 1] = (values[n - 1] - values[n - 2]) / (time[n - 1] - time[n - 2]);

    for i in 1..n - 1 {
        let h1 = time[i] - time[i - 1];
        let h2 = time[i + 1] - time[i];
        let a = -h2 / (h1 * (h1 + h2));
        let b = (h2 - h1) / (h1 * h2);
        let c = h1 / (h2 * (h1 + h2));
        out[i] = a * values[i - 1] + b * values[i] + c * values[i + 1];
    }
    out
}

/// Gradient with a constant spacing `dt`
pub fn gradient_uniform(values: &[f64], dt: f64) -> Vec<f64> {
    let n = values.len();
    if n < 2 || !(dt.is_finite() && dt > 0.0) {
        return Vec::new();
    }

    let mut out = vec![0.0; n];
    out[0] = (values[1] - values[0]) / dt;
    out[n - 1] = (values[n - 1] - values[n - 2]) / dt;
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / (2.0 * dt);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 3.0, 6.0]), vec![2.0, 3.0]);
        assert!(diff(&[1.0]).is_empty());
    }

    #[test]
    fn test_gradient_linear_uniform() {
        let t = [0.0, 0.1, 0.2, 0.3];
        let v = [0.0, 1.0, 2.0, 3.0];
        for g in gradient(&v, &t) {
            assert!((g - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gradient_quadratic_non_uniform() {
        let t = [0.0, 0.5, 1.5, 2.0];
        let v: Vec<f64> = t.iter().map(|x| x * x).collect();
        let g = gradient(&v, &t);
        // Interior points are exact for a quadratic
        assert!((g[1] - 1.0).abs() < 1e-9);
        assert!((g[2] - 3.0).abs() < 1e-9);
        // One-sided edges
        assert!((g[0] - 0.5).abs() < 1e-9);
        assert!((g[3] - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_gradient_too_short() {
        assert!(gradient(&[1.0], &[0.0]).is_empty());
        assert!(gradient(&[1.0, 2.0], &[0.0]).is_empty());
    }

    #[test]
    fn test_mean_dt() {
        assert_eq!(mean_dt(&[0.0, 0.5, 1.0]), Some(0.5));
        assert_eq!(mean_dt(&[1.0]), None);
    }

    #[test]
    fn test_gradient_uniform_matches() {
        let v = [0.0, 1.0, 4.0, 9.0];
        let t = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(gradient_uniform(&v, 1.0), gradient(&v, &t));
    }
}
