//! Robust statistics and NaN-aware reductions.

/// Scale factor turning MAD into a standard deviation estimate for Gaussian noise
const MAD_TO_SIGMA: f64 = 1.4826;

/// Floor for adaptive jerk thresholds (m/s³)
const ADAPTIVE_FLOOR: f64 = 0.5;

/// Median of the finite values
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    })
}

/// Median absolute deviation
pub fn mad(values: &[f64]) -> Option<f64> {
    let med = median(values)?;
    let deviations: Vec<f64> = values
        .iter()
        .filter(|x| x.is_finite())
        .map(|x| (x - med).abs())
        .collect();
    median(&deviations)
}

/// `max(0.5, scale * 1.4826 * MAD)`
pub fn adaptive_threshold(values: &[f64], scale: f64) -> Option<f64> {
    let mad = mad(values)? + 1e-12;
    Some((scale * MAD_TO_SIGMA * mad).max(ADAPTIVE_FLOOR))
}

/// Mean of the finite values
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Largest magnitude among the finite values
pub fn abs_max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .filter(|x| x.is_finite())
        .map(|x| x.abs())
        .reduce(f64::max)
}

/// Largest finite value
pub fn max_value(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .reduce(f64::max)
}

/// Smallest finite value
pub fn min_value(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_mad() {
        // deviations from 2: [1, 0, 1, 2, 7] -> median 1
        assert_eq!(mad(&[1.0, 2.0, 3.0, 4.0, 9.0]), Some(1.0));
    }

    #[test]
    fn test_adaptive_threshold_floor() {
        let flat = [1.0; 10];
        assert_eq!(adaptive_threshold(&flat, 4.0), Some(0.5));
        let noisy = [1.0, 2.0, 3.0, 4.0, 9.0];
        let thr = adaptive_threshold(&noisy, 4.0).unwrap();
        assert!((thr - 4.0 * 1.4826).abs() < 1e-6);
    }

    #[test]
    fn test_abs_max_ignores_nan() {
        assert_eq!(abs_max(&[1.0, f64::NAN, -3.0]), Some(3.0));
        assert_eq!(abs_max(&[f64::NAN]), None);
        assert_eq!(min_value(&[1.0, -2.0, f64::NAN]), Some(-2.0));
        assert_eq!(max_value(&[1.0, -2.0, f64::NAN]), Some(1.0));
        assert_eq!(mean(&[1.0, 3.0, f64::NAN]), Some(2.0));
    }
}
