//! Filtered lateral acceleration around the intervention

use contracts::{channels, columns, ColumnType};

use super::{
    abs_argmax, exceeds, fallback, from_pre_offset, ColumnDef, EventContext, KpiCalculator,
    RowWriter,
};

const COLUMNS: &[ColumnDef] = &[
    (columns::ABS_LAT_ACCEL_MAX, ColumnType::Double, "m/s^2"),
    (columns::IS_LAT_ACCEL_HIGH, ColumnType::Boolean, ""),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LateralAccelCalculator;

impl KpiCalculator for LateralAccelCalculator {
    fn name(&self) -> &'static str {
        "lateral_accel"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        let Some(lat) = ctx.channel(channels::LAT_ACCEL_FLT) else {
            fallback(self.name(), ctx, "missing signal latActAccelFlt");
            return;
        };
        let Some((_, peak)) = from_pre_offset(ctx, lat).and_then(abs_argmax) else {
            fallback(self.name(), ctx, "no lateral acceleration samples from start");
            return;
        };
        let abs_peak = peak.abs();
        out.set(columns::ABS_LAT_ACCEL_MAX, abs_peak);
        out.set(columns::IS_LAT_ACCEL_HIGH, exceeds(abs_peak, ctx.thresholds.lat_accel));
    }
}
