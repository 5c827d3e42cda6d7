//! Onset / recovery / knee point detectors and index matching helpers.

use contracts::{FilterParams, KneeMethod};
use tracing::debug;

use crate::filter::lowpass;
use crate::gradient::{gradient_uniform, mean_dt};

/// First index where `jerk < neg_thd`
pub fn detect_decel_onset(jerk: &[f64], neg_thd: f64) -> Option<usize> {
    jerk.iter().position(|&j| j < neg_thd)
}

/// Last index after `start_idx` where `jerk > pos_thd`
pub fn detect_brake_jerk_end(jerk: &[f64], pos_thd: f64, start_idx: usize) -> Option<usize> {
    jerk.iter()
        .enumerate()
        .skip(start_idx + 1)
        .filter(|(_, &j)| j > pos_thd)
        .map(|(i, _)| i)
        .last()
}

/// Comparison used by [`find_first_last_indices`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `|v - target| <= tol`
    Equal,
    /// `v < target + tol`
    Less,
    /// `v > target - tol`
    Greater,
}

impl Comparison {
    fn matches(&self, value: f64, target: f64, tolerance: f64) -> bool {
        match self {
            Comparison::Equal => (value - target).abs() <= tolerance,
            Comparison::Less => value < target + tolerance,
            Comparison::Greater => value > target - tolerance,
        }
    }
}

/// All indices matching the comparison
pub fn matching_indices(
    values: &[f64],
    target: f64,
    mode: Comparison,
    tolerance: f64,
) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| mode.matches(v, target, tolerance))
        .map(|(i, _)| i)
        .collect()
}

/// First and last matching index
pub fn find_first_last_indices(
    values: &[f64],
    target: f64,
    mode: Comparison,
    tolerance: f64,
) -> Option<(usize, usize)> {
    let first = values
        .iter()
        .position(|&v| mode.matches(v, target, tolerance))?;
    let last = values
        .iter()
        .rposition(|&v| mode.matches(v, target, tolerance))?;
    Some((first, last))
}

/// Sign of the derivative a knee point must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KneeDirection {
    Positive,
    Negative,
}

/// Detected knee point (absolute index into the input)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KneePoint {
    pub index: usize,
    pub time: f64,
    pub value: f64,
}

/// Knee point of `signal[start..=end]`
///
/// The segment is low-pass filtered, then the first and second derivatives are
/// taken with the mean sample spacing. `Curvature` picks the largest |d²|
/// whose sign matches `direction`; `Slope` does the same with |d|.
/// Returns `None` when the range collapses or no sample has the right sign.
pub fn detect_kneepoint(
    time: &[f64],
    signal: &[f64],
    start: usize,
    end: usize,
    direction: KneeDirection,
    method: KneeMethod,
    filter: &FilterParams,
) -> Option<KneePoint> {
    let n = time.len().min(signal.len());
    if n == 0 || start > end || end >= n {
        debug!(start, end, samples = n, "knee point search range collapsed");
        return None;
    }

    let t = &time[start..=end];
    let seg = &signal[start..=end];
    let dt = mean_dt(t)?;

    let filtered = lowpass(seg, t, filter).values;
    let d = gradient_uniform(&filtered, dt);
    let dd = gradient_uniform(&d, dt);
    if d.is_empty() || dd.is_empty() {
        return None;
    }

    let sign_ok = |v: f64| match direction {
        KneeDirection::Positive => v > 0.0,
        KneeDirection::Negative => v < 0.0,
    };
    let (score, sign): (&[f64], &[f64]) = match method {
        KneeMethod::Curvature => (&dd, &dd),
        KneeMethod::Slope => (&d, &d),
    };

    let mut best: Option<(usize, f64)> = None;
    for (i, (&s, &g)) in score.iter().zip(sign.iter()).enumerate() {
        if !sign_ok(g) {
            continue;
        }
        let magnitude = s.abs();
        if best.map_or(true, |(_, m)| magnitude > m) {
            best = Some((i, magnitude));
        }
    }

    best.map(|(i, _)| KneePoint {
        index: start + i,
        time: time[start + i],
        value: signal[start + i],
    })
}
