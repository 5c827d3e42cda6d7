//! TTC and sensitivity level at the first FCW warning

use contracts::{channels, columns, ColumnType};

use super::{fallback, rising_edge, ColumnDef, EventContext, KpiCalculator, RowWriter};

const COLUMNS: &[ColumnDef] = &[
    (columns::FCW_SENSITIVITY_LVL, ColumnType::Double, ""),
    (columns::FCW_WARNING_TTC, ColumnType::Double, "s"),
];

/// Snapshot at the sample where the request first reaches the warning level
///
/// A TTC outside `(0, ttc_max]` leaves both columns NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct FcwWarningCalculator;

impl KpiCalculator for FcwWarningCalculator {
    fn name(&self) -> &'static str {
        "fcw_warning"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        let (Some(request), Some(ttc), Some(level)) = (
            ctx.channel(channels::FCW_REQUEST),
            ctx.channel(channels::FCW_TTC),
            ctx.channel(channels::FCW_SENSITIVITY),
        ) else {
            fallback(self.name(), ctx, "missing FCW warning signals");
            return;
        };

        let Some(idx) = rising_edge(request, ctx.params.fcw.warning_level) else {
            fallback(self.name(), ctx, "no FCW warning trigger");
            return;
        };
        let ttc_at = ttc.get(idx).copied().unwrap_or(f64::NAN);
        if !(ttc_at > 0.0 && ttc_at <= ctx.params.fcw.ttc_max) {
            fallback(self.name(), ctx, "TTC at trigger outside plausible range");
            return;
        }

        out.set(
            columns::FCW_SENSITIVITY_LVL,
            level.get(idx).copied().unwrap_or(f64::NAN),
        );
        out.set(columns::FCW_WARNING_TTC, ttc_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::{context, run, time_hz};
    use contracts::{AnalysisParams, Recording};

    fn recording(ttc: Vec<f64>) -> Recording {
        Recording::new("w", time_hz(5, 10.0))
            .unwrap()
            .with_channel(channels::FCW_REQUEST, vec![0.0, 1.0, 2.0, 3.0, 0.0])
            .unwrap()
            .with_channel(channels::FCW_TTC, ttc)
            .unwrap()
            .with_channel(channels::FCW_SENSITIVITY, vec![1.0, 1.0, 2.0, 2.0, 2.0])
            .unwrap()
    }

    #[test]
    fn test_snapshot_at_trigger() {
        let rec = recording(vec![9.0, 3.0, 2.4, 1.8, 1.2]);
        let params = AnalysisParams::default();
        let table = run(&FcwWarningCalculator, &context(&rec, &params, None, None));
        assert_eq!(table.get_f64(0, columns::FCW_WARNING_TTC), Some(2.4));
        assert_eq!(table.get_f64(0, columns::FCW_SENSITIVITY_LVL), Some(2.0));
    }

    #[test]
    fn test_implausible_ttc_is_nan() {
        let params = AnalysisParams::default();
        for bad in [0.0, -1.0, 12.0, f64::NAN] {
            let rec = recording(vec![9.0, 3.0, bad, 1.8, 1.2]);
            let table = run(&FcwWarningCalculator, &context(&rec, &params, None, None));
            assert!(table.get_f64(0, columns::FCW_WARNING_TTC).unwrap().is_nan());
            assert!(table.get_f64(0, columns::FCW_SENSITIVITY_LVL).unwrap().is_nan());
        }
    }
}
