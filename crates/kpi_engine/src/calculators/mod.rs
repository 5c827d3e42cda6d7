//! KPI calculators
//!
//! Each calculator owns a handful of columns. The engine pre-creates them,
//! then calls [`KpiCalculator::compute`] in a fixed order. Calculators never
//! fail: missing signals or indices fill the documented defaults, log a
//! warning and bump `kpi_calculator_fallback_total`.

mod brake_jerk;
mod brake_mode;
mod distance;
mod fcw_warning;
mod lateral;
mod latency;
mod steering;
mod throttle;
mod yaw_rate;

pub use brake_jerk::{BrakeJerk, BrakeJerkCalculator};
pub use brake_mode::BrakeModeCalculator;
pub use distance::DistanceCalculator;
pub use fcw_warning::FcwWarningCalculator;
pub use lateral::LateralAccelCalculator;
pub use latency::LatencyCalculator;
pub use steering::SteeringCalculator;
pub use throttle::ThrottleCalculator;
pub use yaw_rate::YawRateCalculator;

use contracts::{AnalysisParams, ChannelStore, ColumnType, KpiValue, Recording};
use tracing::{debug, warn};

use crate::table::KpiTable;
use crate::thresholds::Thresholds;

/// `(name, type, unit)` of a column a calculator writes
pub type ColumnDef = (&'static str, ColumnType, &'static str);

/// Everything a calculator may read for one event
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    /// Window label (row identity)
    pub label: &'a str,
    pub recording: &'a Recording,
    /// Intervention / trigger start inside the window
    pub start_idx: Option<usize>,
    /// Intervention end inside the window
    pub end_idx: Option<usize>,
    pub thresholds: Thresholds,
    pub params: &'a AnalysisParams,
}

impl<'a> EventContext<'a> {
    pub fn time(&self) -> &'a [f64] {
        self.recording.time()
    }

    pub fn channel(&self, name: &str) -> Option<&'a [f64]> {
        self.recording.channel(name)
    }

    /// Start index if it lies inside a signal of length `len`
    pub fn start_within(&self, len: usize) -> Option<usize> {
        self.start_idx.filter(|&i| i < len)
    }
}

/// Write access to one row
pub struct RowWriter<'t> {
    table: &'t mut KpiTable,
    row: usize,
    calculator: &'static str,
}

impl<'t> RowWriter<'t> {
    pub fn new(table: &'t mut KpiTable, row: usize, calculator: &'static str) -> Self {
        Self {
            table,
            row,
            calculator,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Assign a cell; rejected writes are logged and leave the default
    pub fn set(&mut self, column: &str, value: impl Into<KpiValue>) {
        if let Err(e) = self.table.set(self.row, column, value) {
            warn!(
                calculator = self.calculator,
                row = self.row,
                column,
                error = %e,
                "KPI write rejected"
            );
        }
    }

    /// Reset every listed column to its typed default
    pub fn reset(&mut self, columns: &[ColumnDef]) {
        for (name, _, _) in columns {
            if let Err(e) = self.table.reset(self.row, name) {
                debug!(calculator = self.calculator, column = *name, error = %e, "reset skipped");
            }
        }
    }
}

/// One independent KPI computation
pub trait KpiCalculator {
    /// Name used in diagnostics and metric labels
    fn name(&self) -> &'static str;

    /// Columns written by this calculator
    fn columns(&self) -> &'static [ColumnDef];

    /// Compute this calculator's columns for one event
    fn compute(&self, ctx: &EventContext<'_>, out: &mut RowWriter<'_>);
}

/// Log a fallback to documented defaults
pub(crate) fn fallback(calculator: &'static str, ctx: &EventContext<'_>, reason: &str) {
    warn!(calculator, window = ctx.label, reason, "KPI fallback to defaults");
    metrics::counter!("kpi_calculator_fallback_total", "calculator" => calculator).increment(1);
}

/// Index and value of the largest magnitude among finite samples
pub(crate) fn abs_argmax(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b.abs() >= v.abs() => best,
            _ => Some((i, v)),
        })
}

/// Samples from `time_idx_offset` before the start to the window end
pub(crate) fn from_pre_offset<'v>(ctx: &EventContext<'_>, values: &'v [f64]) -> Option<&'v [f64]> {
    let start = ctx.start_within(values.len())?;
    Some(&values[start.saturating_sub(ctx.params.aeb.time_idx_offset)..])
}

/// First sample where `values` rises from below `level` to at least `level`
pub(crate) fn rising_edge(values: &[f64], level: i64) -> Option<usize> {
    let level = level as f64;
    values
        .windows(2)
        .position(|w| w[0] < level && w[1] >= level)
        .map(|i| i + 1)
}

/// Round to `decimals` places, NaN preserved
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// `value > threshold`, false when either is NaN
pub(crate) fn exceeds(value: f64, threshold: f64) -> bool {
    value.is_finite() && threshold.is_finite() && value > threshold
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use contracts::KpiSchema;

    /// Run one calculator on a fresh single-row table
    pub fn run(calc: &dyn KpiCalculator, ctx: &EventContext<'_>) -> KpiTable {
        let mut table = KpiTable::create(KpiSchema::default(), 1);
        for (name, ty, unit) in calc.columns() {
            table.ensure_column(name, *ty, unit).unwrap();
        }
        let mut out = RowWriter::new(&mut table, 0, calc.name());
        calc.compute(ctx, &mut out);
        table
    }

    pub fn context<'a>(
        recording: &'a Recording,
        params: &'a AnalysisParams,
        start_idx: Option<usize>,
        end_idx: Option<usize>,
    ) -> EventContext<'a> {
        EventContext {
            label: "test",
            recording,
            start_idx,
            end_idx,
            thresholds: Thresholds::unavailable(),
            params,
        }
    }

    pub fn time_hz(n: usize, hz: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 / hz).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_argmax_ignores_nan() {
        assert_eq!(abs_argmax(&[1.0, f64::NAN, -3.0, 2.0]), Some((2, -3.0)));
        assert_eq!(abs_argmax(&[f64::NAN]), None);
        assert_eq!(abs_argmax(&[]), None);
    }

    #[test]
    fn test_rising_edge() {
        assert_eq!(rising_edge(&[0.0, 2.0, 3.0, 0.0, 3.0], 3), Some(2));
        assert_eq!(rising_edge(&[3.0, 3.0], 3), None);
        assert_eq!(rising_edge(&[], 2), None);
    }

    #[test]
    fn test_exceeds_nan_is_false() {
        assert!(exceeds(2.0, 1.0));
        assert!(!exceeds(2.0, f64::NAN));
        assert!(!exceeds(f64::NAN, 1.0));
    }
}
