//! Accelerator pedal behaviour during the intervention

use contracts::{channels, columns, ColumnType};

use super::{exceeds, fallback, ColumnDef, EventContext, KpiCalculator, RowWriter};

const COLUMNS: &[ColumnDef] = &[
    (columns::PEDAL_POS_AT_START, ColumnType::Double, "%"),
    (columns::PEDAL_POS_MAX, ColumnType::Double, "%"),
    (columns::PEDAL_POS_INC, ColumnType::Double, "%"),
    (columns::IS_PEDAL_POS_INC_HIGH, ColumnType::Boolean, ""),
    (columns::IS_PEDAL_ON_AT_START, ColumnType::Boolean, ""),
];

/// Pedal at start, max pedal until window end, and their difference
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrottleCalculator;

impl KpiCalculator for ThrottleCalculator {
    fn name(&self) -> &'static str {
        "throttle"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        let Some(pedal) = ctx.channel(channels::THROTTLE) else {
            fallback(self.name(), ctx, "missing signal throttleValue");
            return;
        };
        let Some(start) = ctx.start_within(pedal.len()) else {
            fallback(self.name(), ctx, "invalid intervention start index");
            return;
        };

        let at_start = pedal[start];
        let max = signal_tools::max_value(&pedal[start..]).unwrap_or(f64::NAN);
        let increase = max - at_start;

        out.set(columns::PEDAL_POS_AT_START, at_start);
        out.set(columns::IS_PEDAL_ON_AT_START, at_start != 0.0 && !at_start.is_nan());
        out.set(columns::PEDAL_POS_MAX, max);
        out.set(columns::PEDAL_POS_INC, increase);
        out.set(
            columns::IS_PEDAL_POS_INC_HIGH,
            exceeds(increase, ctx.thresholds.pedal_pos_inc),
        );
    }
}
