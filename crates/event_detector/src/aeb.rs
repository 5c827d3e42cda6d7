//! AEB boundary detection
//!
//! Two policies:
//! - request transitions (primary): level changes on the AEB request signal
//! - derivative thresholds (legacy): steep drops/recoveries of the target
//!   deceleration

use contracts::EventBoundary;
use signal_tools::diff;
use tracing::{debug, warn};

use crate::levels::{is_in, is_zero};

/// Boundaries plus the number of ends that had to be synthesized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AebDetection {
    pub boundaries: Vec<EventBoundary>,
    pub synthesized_ends: usize,
}

/// Request-transition policy
///
/// IDLE -> ACTIVE when the level enters `active_levels` from outside it;
/// ACTIVE -> IDLE when the level drops from one of `end_levels` to 0. An
/// event still active at the end of the recording is closed at
/// `min(t_end, start + post_time)`.
pub fn detect_aeb_transitions(
    time: &[f64],
    request: &[f64],
    active_levels: &[i64],
    end_levels: &[i64],
    post_time: f64,
) -> AebDetection {
    let n = time.len().min(request.len());
    let mut detection = AebDetection::default();
    if n == 0 {
        return detection;
    }

    let mut active_since: Option<f64> = None;
    for k in 1..n {
        let prev = request[k - 1];
        let cur = request[k];
        match active_since {
            None => {
                if is_in(cur, active_levels) && !is_in(prev, active_levels) {
                    active_since = Some(time[k]);
                }
            }
            Some(start) => {
                if is_in(prev, end_levels) && is_zero(cur) {
                    detection.boundaries.push(EventBoundary::new(start, time[k]));
                    active_since = None;
                }
            }
        }
    }

    if let Some(start) = active_since {
        let end = time[n - 1].min(start + post_time);
        warn!(
            start,
            synthesized_end = end,
            "AEB request still active at end of recording, end synthesized"
        );
        // A request that rose on the very last sample yields start == end
        if end > start {
            detection.boundaries.push(EventBoundary::new(start, end));
        } else {
            detection.boundaries.push(EventBoundary::open(start));
        }
        detection.synthesized_ends += 1;
    }

    detection
}

/// Derivative-threshold policy
///
/// Thresholds apply to the per-sample first difference, not a rate.
/// A start is a sample where the first difference of `decel` crosses below
/// `start_thd` and the deceleration right after the drop is at or below
/// `pb_target`. Ends are upward crossings of `end_thd`. Each start takes the
/// first end after it. When no end exists at all, every start is closed at
/// `start + max(1, post_time + 4)`.
pub fn detect_aeb_derivative(
    time: &[f64],
    decel: &[f64],
    start_thd: f64,
    end_thd: f64,
    pb_target: f64,
    post_time: f64,
) -> AebDetection {
    let n = time.len().min(decel.len());
    let mut detection = AebDetection::default();
    if n < 2 {
        return detection;
    }

    let delta = diff(&decel[..n]);

    let starts: Vec<usize> = (0..delta.len())
        .filter(|&k| delta[k] < start_thd && (k == 0 || delta[k - 1] >= start_thd))
        .filter(|&k| decel[k + 1] <= pb_target)
        .collect();
    let ends: Vec<usize> = (0..delta.len())
        .filter(|&k| delta[k] > end_thd && (k == 0 || delta[k - 1] <= end_thd))
        .collect();

    if starts.is_empty() {
        return detection;
    }

    if ends.is_empty() {
        let buffer = (post_time + 4.0).max(1.0);
        for &s in &starts {
            detection
                .boundaries
                .push(EventBoundary::new(time[s], time[s] + buffer));
        }
        detection.synthesized_ends = starts.len();
        warn!(
            starts = starts.len(),
            buffer_s = buffer,
            "no AEB recovery found, ends synthesized"
        );
        return detection;
    }

    let mut last_end: Option<usize> = None;
    for &s in &starts {
        if last_end.is_some_and(|e| s < e) {
            debug!(start = time[s], "AEB start inside previous event, skipped");
            continue;
        }
        match ends.iter().find(|&&e| e > s) {
            Some(&e) => {
                detection
                    .boundaries
                    .push(EventBoundary::new(time[s], time[e + 1]));
                last_end = Some(e + 1);
            }
            None => {
                debug!(start = time[s], "no AEB recovery after start");
                detection.boundaries.push(EventBoundary::open(time[s]));
            }
        }
    }

    detection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_10hz(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 0.1).collect()
    }

    #[test]
    fn test_transition_single_event() {
        let request = [0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 0.0, 0.0];
        let time = time_10hz(request.len());
        let d = detect_aeb_transitions(&time, &request, &[1, 2], &[1, 2, 3], 3.0);
        assert_eq!(d.boundaries.len(), 1);
        assert!((d.boundaries[0].start - 0.2).abs() < 1e-12);
        assert!((d.boundaries[0].end.unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(d.synthesized_ends, 0);
    }

    #[test]
    fn test_transition_missing_end_is_synthesized() {
        let request = [0.0, 0.0, 2.0, 2.0, 2.0];
        let time = time_10hz(request.len());
        let d = detect_aeb_transitions(&time, &request, &[1, 2], &[1, 2, 3], 3.0);
        assert_eq!(d.synthesized_ends, 1);
        // min(t_end = 0.4, 0.2 + 3.0)
        assert!((d.boundaries[0].end.unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_transition_short_post_time() {
        let request = [0.0, 2.0, 2.0, 2.0, 2.0, 2.0];
        let time = time_10hz(request.len());
        let d = detect_aeb_transitions(&time, &request, &[1, 2], &[1, 2, 3], 0.2);
        assert!((d.boundaries[0].end.unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_transition_two_events() {
        let request = [0.0, 1.0, 0.0, 0.0, 2.0, 0.0];
        let time = time_10hz(request.len());
        let d = detect_aeb_transitions(&time, &request, &[1, 2], &[1, 2, 3], 3.0);
        assert_eq!(d.boundaries.len(), 2);
    }

    #[test]
    fn test_transition_inactive_level_three_only() {
        // Level 3 alone never starts an event
        let request = [0.0, 3.0, 3.0, 0.0];
        let time = time_10hz(request.len());
        let d = detect_aeb_transitions(&time, &request, &[1, 2], &[1, 2, 3], 3.0);
        assert!(d.boundaries.is_empty());
    }

    #[test]
    fn test_derivative_start_and_end() {
        // Idle placeholder of 20 drops to the full braking target and back
        let decel = [20.0, 20.0, -15.0, -15.0, -15.0, 20.0, 20.0];
        let time = time_10hz(decel.len());
        let d = detect_aeb_derivative(&time, &decel, -30.0, 29.0, -6.0, 3.0);
        assert_eq!(d.boundaries.len(), 1);
        assert!((d.boundaries[0].start - 0.1).abs() < 1e-12);
        assert!((d.boundaries[0].end.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_shallow_drop_rejected() {
        // Steep drop but the deceleration stays above the PB target
        let decel = [30.0, 30.0, -4.0, -4.0, 30.0];
        let time = time_10hz(decel.len());
        let d = detect_aeb_derivative(&time, &decel, -30.0, 29.0, -6.0, 3.0);
        assert!(d.boundaries.is_empty());
    }

    #[test]
    fn test_derivative_no_end_uses_buffer() {
        let decel = [20.0, 20.0, -15.0, -15.0, -15.0];
        let time = time_10hz(decel.len());
        let d = detect_aeb_derivative(&time, &decel, -30.0, 29.0, -6.0, 3.0);
        assert_eq!(d.synthesized_ends, 1);
        let b = d.boundaries[0];
        assert!((b.end.unwrap() - b.start - 7.0).abs() < 1e-12);
    }
}
