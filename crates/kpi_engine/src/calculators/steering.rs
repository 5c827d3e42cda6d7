//! Steering wheel angle and rate around the intervention

use contracts::{channels, columns, ColumnType};

use super::{
    abs_argmax, exceeds, fallback, from_pre_offset, round_to, ColumnDef, EventContext,
    KpiCalculator, RowWriter,
};

const COLUMNS: &[ColumnDef] = &[
    (columns::ABS_STEER_MAX_DEG, ColumnType::Double, "deg"),
    (columns::IS_STEER_HIGH, ColumnType::Boolean, ""),
    (columns::ABS_STEER_RATE_MAX_DEG, ColumnType::Double, "deg/s"),
    (columns::IS_STEER_ANG_RATE_HIGH, ColumnType::Boolean, ""),
];

/// Peak |angle| and |rate| from `time_idx_offset` samples before the start,
/// converted from radians to degrees
#[derive(Debug, Clone, Copy, Default)]
pub struct SteeringCalculator;

impl SteeringCalculator {
    fn peak_deg(ctx: &EventContext<'_>, values: &[f64]) -> f64 {
        from_pre_offset(ctx, values)
            .and_then(abs_argmax)
            .map_or(f64::NAN, |(_, v)| round_to(v.to_degrees().abs(), 2))
    }
}

impl KpiCalculator for SteeringCalculator {
    fn name(&self) -> &'static str {
        "steering"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        let (Some(angle), Some(rate)) = (
            ctx.channel(channels::STEER_ANGLE),
            ctx.channel(channels::STEER_ANGLE_RATE),
        ) else {
            fallback(self.name(), ctx, "missing steering signals");
            return;
        };
        if ctx.start_within(angle.len()).is_none() {
            fallback(self.name(), ctx, "invalid intervention start index");
            return;
        }

        let angle_deg = Self::peak_deg(ctx, angle);
        let rate_deg = Self::peak_deg(ctx, rate);
        out.set(columns::ABS_STEER_MAX_DEG, angle_deg);
        out.set(columns::IS_STEER_HIGH, exceeds(angle_deg, ctx.thresholds.steer_ang));
        out.set(columns::ABS_STEER_RATE_MAX_DEG, rate_deg);
        out.set(
            columns::IS_STEER_ANG_RATE_HIGH,
            exceeds(rate_deg, ctx.thresholds.steer_ang_rate),
        );
    }
}
