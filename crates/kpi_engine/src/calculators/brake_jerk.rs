//! FCW brake jerk: the deceleration pulse after the brake stage request

use contracts::{channels, columns, ColumnType, FcwParams, JerkThresholdMode};
use signal_tools::{
    abs_max, adaptive_threshold, detect_brake_jerk_end, detect_decel_onset, gradient, mean,
    min_value,
};

use super::{fallback, rising_edge, ColumnDef, EventContext, KpiCalculator, RowWriter};

const COLUMNS: &[ColumnDef] = &[
    (columns::BRAKE_JERK_DUR, ColumnType::Double, "s"),
    (columns::BRAKE_JERK_START_TIME, ColumnType::Double, "s"),
    (columns::BRAKE_JERK_END_TIME, ColumnType::Double, "s"),
    (columns::BRAKE_JERK_MAX, ColumnType::Double, "m/s^3"),
    (columns::BRAKE_ACCEL_MIN, ColumnType::Double, "m/s^2"),
    (columns::BRAKE_JERK_THD, ColumnType::Double, "m/s^3"),
];

/// Measured brake jerk pulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrakeJerk {
    pub duration: f64,
    pub start_time: f64,
    pub end_time: f64,
    /// Largest |jerk| between start and end
    pub max_jerk: f64,
    /// Smallest acceleration between start and end
    pub accel_min: f64,
    /// Magnitude of the positive threshold applied
    pub threshold: f64,
}

impl BrakeJerk {
    /// Measure the pulse following the first rise of `request` to the brake level
    ///
    /// The analysis span is `[trigger - pre_trigger_s, trigger + window_s]`.
    /// The pulse starts at the first jerk sample below the negative threshold
    /// and ends at the last sample after it above the positive threshold.
    ///
    /// # Errors
    /// Returns the reason when there is no trigger, the mean speed lies
    /// outside the operational band, no pulse is found or its duration is
    /// implausible.
    pub fn measure(
        time: &[f64],
        accel: &[f64],
        speed: &[f64],
        request: &[f64],
        params: &FcwParams,
    ) -> Result<Self, &'static str> {
        let n = time.len().min(accel.len()).min(speed.len()).min(request.len());
        let trigger = rising_edge(&request[..n], params.brake_level).ok_or("no brake stage trigger")?;
        let t0 = time[trigger];

        let lo = time[..n].partition_point(|&t| t < t0 - params.pre_trigger_s);
        let hi = time[..n].partition_point(|&t| t <= t0 + params.window_s);
        if hi <= lo + 1 {
            return Err("analysis span too short");
        }

        let mean_speed = mean(&speed[lo..hi]).ok_or("no speed samples in span")?;
        if !(params.brakejerk_min_speed..=params.brakejerk_max_speed).contains(&mean_speed) {
            return Err("mean speed outside operational band");
        }

        let jerk = gradient(&accel[..n], &time[..n]);
        let tw = &time[lo..hi];
        let aw = &accel[lo..hi];
        let jw = &jerk[lo..hi];

        let (neg, pos) = match params.jerk_threshold_mode {
            JerkThresholdMode::Fixed => (params.jerk_neg_thd, params.jerk_pos_thd),
            JerkThresholdMode::Adaptive => {
                let thr = adaptive_threshold(jw, params.mad_scale).ok_or("no jerk samples in span")?;
                (-thr, thr)
            }
        };

        let i0 = detect_decel_onset(jw, neg).ok_or("no negative jerk crossing")?;
        let i1 = detect_brake_jerk_end(jw, pos, i0).ok_or("no positive jerk crossing")?;
        let duration = tw[i1] - tw[i0];
        if !(duration > 0.0 && duration <= params.max_jerk_duration) {
            return Err("implausible brake jerk duration");
        }

        Ok(Self {
            duration,
            start_time: tw[i0],
            end_time: tw[i1],
            max_jerk: abs_max(&jw[i0..=i1]).unwrap_or(f64::NAN),
            accel_min: min_value(&aw[i0..=i1]).unwrap_or(f64::NAN),
            threshold: pos.abs(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrakeJerkCalculator;

impl KpiCalculator for BrakeJerkCalculator {
    fn name(&self) -> &'static str {
        "brake_jerk"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        for (name, _, _) in COLUMNS {
            out.set(name, 0.0);
        }

        let (Some(accel), Some(speed), Some(request)) = (
            ctx.channel(channels::LONG_ACCEL_FLT),
            ctx.channel(channels::EGO_SPEED_KPH),
            ctx.channel(channels::FCW_REQUEST),
        ) else {
            fallback(self.name(), ctx, "missing brake jerk signals");
            return;
        };

        match BrakeJerk::measure(ctx.time(), accel, speed, request, &ctx.params.fcw) {
            Ok(bj) => {
                out.set(columns::BRAKE_JERK_DUR, bj.duration);
                out.set(columns::BRAKE_JERK_START_TIME, bj.start_time);
                out.set(columns::BRAKE_JERK_END_TIME, bj.end_time);
                out.set(columns::BRAKE_JERK_MAX, bj.max_jerk);
                out.set(columns::BRAKE_ACCEL_MIN, bj.accel_min);
                out.set(columns::BRAKE_JERK_THD, bj.threshold);
            }
            Err(reason) => fallback(self.name(), ctx, reason),
        }
    }
}
