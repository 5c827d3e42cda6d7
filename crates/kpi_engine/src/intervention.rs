//! AEB intervention start / end inside one window

use contracts::AebEndPolicy;
use signal_tools::{find_first_last_indices, Comparison};

/// Located intervention start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterventionStart {
    pub index: usize,
    pub time: f64,
}

/// Located intervention end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterventionEnd {
    pub index: Option<usize>,
    /// NaN when no end index could be resolved
    pub time: f64,
    /// Speed reached exactly zero at or after the start
    pub is_veh_stopped: bool,
}

impl InterventionEnd {
    fn unresolved(is_veh_stopped: bool) -> Self {
        Self {
            index: None,
            time: f64::NAN,
            is_veh_stopped,
        }
    }
}

/// First sample with `decel < pb_target + tolerance`
pub fn find_intervention_start(
    time: &[f64],
    decel: &[f64],
    pb_target: f64,
    tolerance: f64,
) -> Option<InterventionStart> {
    let n = time.len().min(decel.len());
    let (first, _) = find_first_last_indices(&decel[..n], pb_target, Comparison::Less, tolerance)?;
    Some(InterventionStart {
        index: first,
        time: time[first],
    })
}

/// End of the intervention that started at `start_idx`
///
/// Recovery is the first sample at or after the start with
/// `decel > end_thd`; standstill is the first with `speed == 0`. The policy
/// picks recovery alone or the earlier of both. Without either the last
/// sample closes the intervention.
pub fn find_intervention_end(
    time: &[f64],
    speed: Option<&[f64]>,
    decel: &[f64],
    start_idx: usize,
    end_thd: f64,
    policy: AebEndPolicy,
) -> InterventionEnd {
    let n = time.len();
    if n == 0 || start_idx >= n {
        return InterventionEnd::unresolved(false);
    }

    let recovery = decel
        .iter()
        .take(n)
        .skip(start_idx)
        .position(|&d| d > end_thd)
        .map(|rel| start_idx + rel);
    let standstill = speed.and_then(|s| {
        s.iter()
            .take(n)
            .skip(start_idx)
            .position(|&v| v == 0.0)
            .map(|rel| start_idx + rel)
    });
    let is_veh_stopped = standstill.is_some();

    let index = match policy {
        AebEndPolicy::DecelRecovery => recovery,
        AebEndPolicy::EarliestOfRecoveryOrStandstill => match (recovery, standstill) {
            (Some(r), Some(s)) => Some(r.min(s)),
            (r, s) => r.or(s),
        },
    }
    .unwrap_or(n - 1);

    InterventionEnd {
        index: Some(index),
        time: time[index],
        is_veh_stopped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_10hz(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 0.1).collect()
    }

    #[test]
    fn test_start_less_with_tolerance() {
        let decel = [0.0, 0.0, -1.0, -7.0, -7.0, -7.0, 0.0, 0.0];
        let time = time_10hz(decel.len());
        let start = find_intervention_start(&time, &decel, -6.0, 0.1).unwrap();
        assert_eq!(start.index, 3);
        assert!((start.time - 0.3).abs() < 1e-12);
        assert!(find_intervention_start(&time, &[0.0; 8], -6.0, 0.1).is_none());
    }

    #[test]
    fn test_end_earliest_of_recovery_or_standstill() {
        let decel = [0.0, -6.0, -15.0, -15.0, -15.0, -2.0, 0.0];
        let speed = [40.0, 35.0, 20.0, 5.0, 0.0, 0.0, 0.0];
        let time = time_10hz(decel.len());

        let end = find_intervention_end(
            &time,
            Some(&speed),
            &decel,
            1,
            -4.9,
            AebEndPolicy::EarliestOfRecoveryOrStandstill,
        );
        assert_eq!(end.index, Some(4));
        assert!(end.is_veh_stopped);

        let end = find_intervention_end(
            &time,
            Some(&speed),
            &decel,
            1,
            -4.9,
            AebEndPolicy::DecelRecovery,
        );
        assert_eq!(end.index, Some(5));
        assert!(end.is_veh_stopped);
    }

    #[test]
    fn test_end_falls_back_to_last_sample() {
        let decel = [0.0, -6.0, -6.0, -6.0];
        let time = time_10hz(decel.len());
        let end = find_intervention_end(
            &time,
            None,
            &decel,
            1,
            -4.9,
            AebEndPolicy::EarliestOfRecoveryOrStandstill,
        );
        assert_eq!(end.index, Some(3));
        assert!(!end.is_veh_stopped);
    }

    #[test]
    fn test_end_invalid_start() {
        let time = time_10hz(3);
        let end = find_intervention_end(&time, None, &[0.0; 3], 7, -4.9, AebEndPolicy::DecelRecovery);
        assert_eq!(end.index, None);
        assert!(end.time.is_nan());
    }
}
