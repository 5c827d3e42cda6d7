//! Yaw rate around the intervention

use contracts::{channels, columns, ColumnType};

use super::{
    abs_argmax, exceeds, fallback, from_pre_offset, round_to, ColumnDef, EventContext,
    KpiCalculator, RowWriter,
};

const COLUMNS: &[ColumnDef] = &[
    (columns::ABS_YAW_RATE_MAX_DEG, ColumnType::Double, "deg/s"),
    (columns::IS_YAW_RATE_HIGH, ColumnType::Boolean, ""),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct YawRateCalculator;

impl KpiCalculator for YawRateCalculator {
    fn name(&self) -> &'static str {
        "yaw_rate"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        let Some(yaw) = ctx.channel(channels::YAW_RATE) else {
            fallback(self.name(), ctx, "missing signal yawRate");
            return;
        };
        let Some((_, peak)) = from_pre_offset(ctx, yaw).and_then(abs_argmax) else {
            fallback(self.name(), ctx, "no yaw rate samples from start");
            return;
        };
        let peak_deg = round_to(peak.to_degrees().abs(), 2);
        out.set(columns::ABS_YAW_RATE_MAX_DEG, peak_deg);
        out.set(
            columns::IS_YAW_RATE_HIGH,
            exceeds(peak_deg, ctx.thresholds.yaw_rate_susp),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::{context, run, time_hz};
    use contracts::{AnalysisParams, Recording};

    #[test]
    fn test_yaw_rate_degrees() {
        let rec = Recording::new("w", time_hz(3, 10.0))
            .unwrap()
            .with_channel(channels::YAW_RATE, vec![0.0, 0.1, -0.2])
            .unwrap();
        let params = AnalysisParams::default();
        let mut ctx = context(&rec, &params, Some(1), None);
        ctx.thresholds.yaw_rate_susp = 10.0;
        let table = run(&YawRateCalculator, &ctx);
        // 0.2 rad/s = 11.459 deg/s
        assert_eq!(table.get_f64(0, columns::ABS_YAW_RATE_MAX_DEG), Some(11.46));
        assert_eq!(table.get_bool(0, columns::IS_YAW_RATE_HIGH), Some(true));
    }

    #[test]
    fn test_yaw_rate_missing_start() {
        let rec = Recording::new("w", time_hz(3, 10.0))
            .unwrap()
            .with_channel(channels::YAW_RATE, vec![0.0, 0.1, -0.2])
            .unwrap();
        let params = AnalysisParams::default();
        let table = run(&YawRateCalculator, &context(&rec, &params, None, None));
        assert!(table.get_f64(0, columns::ABS_YAW_RATE_MAX_DEG).unwrap().is_nan());
    }
}
