//! Vehicle response and communication latency

use contracts::{channels, columns, ColumnType, OnsetMethod};
use signal_tools::{
    detect_decel_onset, detect_kneepoint, gradient, matching_indices, mean_dt, Comparison,
    KneeDirection,
};
use tracing::{debug, warn};

use super::{fallback, ColumnDef, EventContext, KpiCalculator, RowWriter};

const COLUMNS: &[ColumnDef] = &[
    (columns::AEB_SYS_RESP_TIME, ColumnType::Double, "s"),
    (columns::AEB_DEAD_TIME, ColumnType::Double, "s"),
    (columns::COMM_LATENCY, ColumnType::Double, "s"),
];

/// Sample spacing assumed for single-sample windows
const FALLBACK_DT: f64 = 0.01;

/// Latency decomposition
///
/// Every stage that misses its precondition reports `0.0` instead of NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatencyCalculator;

impl LatencyCalculator {
    /// Absolute index of the braking response within
    /// `[from, from + latency_window_samples]`
    fn response_onset(ctx: &EventContext<'_>, accel: &[f64], from: usize) -> Option<usize> {
        let time = ctx.time();
        let n = time.len().min(accel.len());
        if n == 0 {
            return None;
        }
        let end = (from + ctx.params.aeb.latency_window_samples).min(n - 1);
        if from >= end {
            debug!(window = ctx.label, from, end, "latency search range collapsed");
            return None;
        }

        match ctx.params.aeb.onset_method {
            OnsetMethod::JerkThreshold => {
                let jerk = gradient(&accel[from..=end], &time[from..=end]);
                detect_decel_onset(&jerk, ctx.params.aeb.aeb_jerk_neg_thd).map(|rel| from + rel)
            }
            OnsetMethod::KneePoint => detect_kneepoint(
                time,
                accel,
                from,
                end,
                KneeDirection::Negative,
                ctx.params.aeb.knee_method,
                &ctx.params.filter,
            )
            .map(|kp| kp.index),
        }
    }

    /// `(system response time, dead time)`
    fn vehicle_latency(ctx: &EventContext<'_>, accel: &[f64]) -> (f64, f64) {
        let time = ctx.time();
        let Some(start) = ctx.start_within(time.len().min(accel.len())) else {
            warn!(window = ctx.label, "invalid intervention start, vehicle latency set to 0");
            return (0.0, 0.0);
        };
        match Self::response_onset(ctx, accel, start) {
            Some(onset) => (time[onset], time[onset] - time[start]),
            None => {
                warn!(window = ctx.label, start, "no deceleration onset, vehicle latency set to 0");
                (0.0, 0.0)
            }
        }
    }

    /// Delay from the PB to FB transition to the braking response
    fn communication_latency(ctx: &EventContext<'_>, decel: &[f64], accel: &[f64]) -> f64 {
        let aeb = &ctx.params.aeb;
        let time = ctx.time();
        let n = time.len().min(decel.len());

        let pb = matching_indices(&decel[..n], aeb.pb_tgt_decel, Comparison::Equal, aeb.tgt_tol);
        if pb.is_empty() {
            warn!(window = ctx.label, "no partial braking phase, commLatency set to 0");
            return 0.0;
        }

        let dt = mean_dt(&time[..n]).unwrap_or(FALLBACK_DT);
        let required = (aeb.pb_duration / dt).floor() as usize;
        let Some(pb_end) = first_run_end(&pb, required) else {
            warn!(
                window = ctx.label,
                pb_duration = aeb.pb_duration,
                "partial braking too short, commLatency set to 0"
            );
            return 0.0;
        };

        let Some(fb_start) = (pb_end..n)
            .find(|&i| (decel[i] - aeb.fb_tgt_decel).abs() <= aeb.tgt_tol)
        else {
            warn!(window = ctx.label, "no PB to FB transition, commLatency set to 0");
            return 0.0;
        };

        let Some(onset) = Self::response_onset(ctx, accel, fb_start) else {
            warn!(window = ctx.label, fb_start, "no deceleration onset after FB, commLatency set to 0");
            return 0.0;
        };
        debug!(
            window = ctx.label,
            transition = time[fb_start],
            onset = time[onset],
            "communication latency resolved"
        );
        (time[onset] - time[fb_start]).max(0.0)
    }
}

/// Last index of the first contiguous run of at least `required` indices
fn first_run_end(indices: &[usize], required: usize) -> Option<usize> {
    let mut run_start = 0;
    for i in 0..indices.len() {
        let run_closes = i + 1 == indices.len() || indices[i + 1] != indices[i] + 1;
        if run_closes {
            if i + 1 - run_start >= required {
                return Some(indices[i]);
            }
            run_start = i + 1;
        }
    }
    None
}

impl KpiCalculator for LatencyCalculator {
    fn name(&self) -> &'static str {
        "latency"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        for (name, _, _) in COLUMNS {
            out.set(name, 0.0);
        }

        let Some(accel) = ctx.channel(channels::LONG_ACCEL_FLT) else {
            fallback(self.name(), ctx, "missing signal longActAccelFlt");
            return;
        };

        let (resp_time, dead_time) = Self::vehicle_latency(ctx, accel);
        out.set(columns::AEB_SYS_RESP_TIME, resp_time);
        out.set(columns::AEB_DEAD_TIME, dead_time);

        match ctx.channel(channels::AEB_TARGET_DECEL) {
            Some(decel) => {
                let comm = Self::communication_latency(ctx, decel, accel);
                out.set(columns::COMM_LATENCY, comm);
            }
            None => fallback(self.name(), ctx, "missing signal aebTargetDecel"),
        }
    }
}
