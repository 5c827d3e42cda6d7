//! Radar gap at detection, intervention start and standstill

use contracts::{channels, columns, ColumnType};

use super::{fallback, ColumnDef, EventContext, KpiCalculator, RowWriter};

const COLUMNS: &[ColumnDef] = &[
    (columns::FIRST_DET_DIST, ColumnType::Double, "m"),
    (columns::STABLE_DET_DIST, ColumnType::Double, "m"),
    (columns::AEB_INTV_DIST, ColumnType::Double, "m"),
    (columns::AEB_STOP_GAP, ColumnType::Double, "m"),
];

/// Distance KPIs
///
/// - `firstDetDist`: first non-zero gap up to the intervention end
/// - `stableDetDist`: gap where the last uninterrupted non-zero run starts
/// - `aebIntvDist`: gap at intervention start
/// - `aebStopGap`: gap at intervention end
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceCalculator;

impl KpiCalculator for DistanceCalculator {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn columns(&self) -> &'static [ColumnDef] {
        COLUMNS
    }

    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>) {
        out.reset(COLUMNS);
        let Some(gap) = ctx.channel(channels::LONG_GAP) else {
            fallback(self.name(), ctx, "missing signal longGap");
            return;
        };
        let Some(end) = ctx.end_idx.filter(|&e| e < gap.len()) else {
            fallback(self.name(), ctx, "invalid intervention end index");
            return;
        };

        let segment = &gap[..=end];
        let detected = |v: &f64| *v != 0.0 && !v.is_nan();

        if let Some(first) = segment.iter().position(detected) {
            out.set(columns::FIRST_DET_DIST, segment[first]);

            // start of the run that contains the last detection
            let last = segment.iter().rposition(detected).unwrap_or(first);
            let stable = segment[..=last]
                .iter()
                .rposition(|v| !detected(v))
                .map_or(first, |z| z + 1);
            out.set(columns::STABLE_DET_DIST, segment[stable]);
        }

        if let Some(start) = ctx.start_within(gap.len()) {
            out.set(columns::AEB_INTV_DIST, gap[start]);
        }
        out.set(columns::AEB_STOP_GAP, gap[end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::test_support::{context, run, time_hz};
    use contracts::{AnalysisParams, Recording};

    fn recording(gap: Vec<f64>) -> Recording {
        let n = gap.len();
        Recording::new("w", time_hz(n, 10.0))
            .unwrap()
            .with_channel(channels::LONG_GAP, gap)
            .unwrap()
    }

    #[test]
    fn test_distance_runs() {
        let rec = recording(vec![0.0, 40.0, 38.0, 0.0, 30.0, 25.0, 20.0, 5.0, 0.0]);
        let params = AnalysisParams::default();
        let table = run(&DistanceCalculator, &context(&rec, &params, Some(5), Some(7)));

        assert_eq!(table.get_f64(0, columns::FIRST_DET_DIST), Some(40.0));
        assert_eq!(table.get_f64(0, columns::STABLE_DET_DIST), Some(30.0));
        assert_eq!(table.get_f64(0, columns::AEB_INTV_DIST), Some(25.0));
        assert_eq!(table.get_f64(0, columns::AEB_STOP_GAP), Some(5.0));
    }

    #[test]
    fn test_distance_invalid_end_is_nan() {
        let rec = recording(vec![10.0, 9.0]);
        let params = AnalysisParams::default();
        let table = run(&DistanceCalculator, &context(&rec, &params, Some(0), None));
        for (name, _, _) in COLUMNS {
            assert!(table.get_f64(0, name).unwrap().is_nan());
        }
    }

    #[test]
    fn test_distance_never_detected() {
        let rec = recording(vec![0.0, 0.0, 0.0]);
        let params = AnalysisParams::default();
        let table = run(&DistanceCalculator, &context(&rec, &params, Some(0), Some(2)));
        assert!(table.get_f64(0, columns::FIRST_DET_DIST).unwrap().is_nan());
        assert_eq!(table.get_f64(0, columns::AEB_STOP_GAP), Some(0.0));
    }
}
