//! KPI Engine - per-window AEB / FCW pipelines

use contracts::{
    channels, columns, AnalysisConfig, AnalysisParams, CalibrationSet, ChannelStore, ColumnType,
    ContractError, EventKind, EventWindow, KpiSchema, Recording,
};
use event_detector::detect_fcw_events;
use tracing::{debug, instrument, warn};

use crate::calculators::{
    BrakeJerkCalculator, BrakeModeCalculator, ColumnDef, DistanceCalculator, EventContext,
    FcwWarningCalculator, KpiCalculator, LateralAccelCalculator, LatencyCalculator, RowWriter,
    SteeringCalculator, ThrottleCalculator, YawRateCalculator,
};
use crate::intervention::{find_intervention_end, find_intervention_start};
use crate::table::KpiTable;
use crate::thresholds::Thresholds;

/// Calculators of an AEB row, in execution order
const AEB_CALCULATORS: &[&dyn KpiCalculator] = &[
    &DistanceCalculator,
    &ThrottleCalculator,
    &SteeringCalculator,
    &LateralAccelCalculator,
    &YawRateCalculator,
    &BrakeModeCalculator,
    &LatencyCalculator,
];

/// Calculators of an FCW row, in execution order
const FCW_CALCULATORS: &[&dyn KpiCalculator] = &[&BrakeJerkCalculator, &FcwWarningCalculator];

/// Columns the pipelines write themselves
const AEB_EVENT_COLUMNS: &[ColumnDef] = &[
    (columns::LOG_TIME, ColumnType::Double, "s"),
    (columns::VEH_SPD, ColumnType::Double, "kph"),
    (columns::AEB_INTV_START_TIME, ColumnType::Double, "s"),
    (columns::AEB_INTV_END_TIME, ColumnType::Double, "s"),
    (columns::IS_VEH_STOPPED, ColumnType::Boolean, ""),
    (columns::INTV_DUR, ColumnType::Double, "s"),
    (columns::STEER_ANG_TH, ColumnType::Double, "deg"),
    (columns::STEER_ANG_RATE_TH, ColumnType::Double, "deg/s"),
    (columns::PEDAL_POS_INC_TH, ColumnType::Double, "%"),
    (columns::YAW_RATE_SUSP_TH, ColumnType::Double, "deg/s"),
    (columns::LAT_ACCEL_TH, ColumnType::Double, "m/s^2"),
];

const FCW_EVENT_COLUMNS: &[ColumnDef] = &[
    (columns::LOG_TIME, ColumnType::Double, "s"),
    (columns::VEH_SPD, ColumnType::Double, "kph"),
];

/// What happened to one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// The full pipeline ran (individual KPIs may still hold defaults)
    Computed,
    /// No event inside the window, the row keeps its defaults
    Skipped,
}

/// Runs the calculator pipelines over event windows
#[derive(Debug, Clone)]
pub struct KpiEngine {
    schema: KpiSchema,
    calibrations: CalibrationSet,
    params: AnalysisParams,
}

impl KpiEngine {
    /// Build an engine from a loaded configuration
    ///
    /// # Errors
    /// Returns an error if the declared KPI schema is invalid.
    pub fn new(config: &AnalysisConfig) -> Result<Self, ContractError> {
        Ok(Self::from_parts(
            config.schema()?,
            config.calibration.clone(),
            config.params.clone(),
        ))
    }

    pub fn from_parts(
        schema: KpiSchema,
        calibrations: CalibrationSet,
        params: AnalysisParams,
    ) -> Self {
        Self {
            schema,
            calibrations,
            params,
        }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn schema(&self) -> &KpiSchema {
        &self.schema
    }

    /// Table with one row per label, covering every column `kind` writes
    ///
    /// # Errors
    /// Returns `KpiColumn` if a declared column clashes in type with a
    /// computed one.
    pub fn create_table(&self, kind: EventKind, labels: Vec<String>) -> Result<KpiTable, ContractError> {
        let mut table = KpiTable::with_labels(self.schema.for_kind(kind), labels);
        let (event_columns, calculators) = pipeline(kind);
        let calculator_columns = calculators.iter().flat_map(|c| c.columns().iter());
        for (name, ty, unit) in event_columns.iter().chain(calculator_columns) {
            table.ensure_column(name, *ty, unit)?;
        }
        Ok(table)
    }

    /// Compute every KPI of `window` into `row`
    pub fn process_window(&self, window: &EventWindow, table: &mut KpiTable, row: usize) -> RowStatus {
        self.process_recording(window.kind, &window.name, &window.recording, table, row)
    }

    /// Compute every KPI of one window recording into `row`
    #[instrument(level = "debug", skip(self, recording, table), fields(window = label, samples = recording.len()))]
    pub fn process_recording(
        &self,
        kind: EventKind,
        label: &str,
        recording: &Recording,
        table: &mut KpiTable,
        row: usize,
    ) -> RowStatus {
        match kind {
            EventKind::Aeb => self.run_aeb(label, recording, table, row),
            EventKind::Fcw => self.run_fcw(label, recording, table, row),
        }
    }

    /// One finalized table for a batch of windows of the same kind
    ///
    /// Windows of another kind keep default rows.
    ///
    /// # Errors
    /// Returns an error if the table cannot be created.
    pub fn compute_table(&self, kind: EventKind, windows: &[EventWindow]) -> Result<KpiTable, ContractError> {
        let labels = windows.iter().map(|w| w.name.clone()).collect();
        let mut table = self.create_table(kind, labels)?;
        for (row, window) in windows.iter().enumerate() {
            if window.kind != kind {
                warn!(window = %window.name, expected = %kind, actual = %window.kind, "window kind mismatch, row skipped");
                continue;
            }
            self.process_window(window, &mut table, row);
        }
        table.finalize(self.params.round_decimals);
        Ok(table)
    }

    fn run_aeb(&self, label: &str, rec: &Recording, table: &mut KpiTable, row: usize) -> RowStatus {
        let aeb = &self.params.aeb;
        let time = rec.time();
        let decel = rec.channel(channels::AEB_TARGET_DECEL);
        let speed = rec.channel(channels::EGO_SPEED_KPH);

        let start = decel.and_then(|d| find_intervention_start(time, d, aeb.pb_tgt_decel, aeb.intv_start_tol));
        let end = match (start, decel) {
            (Some(s), Some(d)) => Some(find_intervention_end(
                time,
                speed,
                d,
                s.index,
                aeb.aeb_end_thd,
                aeb.end_policy,
            )),
            _ => None,
        };
        if start.is_none() {
            warn!(window = label, "no AEB intervention start, intervention KPIs left at defaults");
        }

        let mut out = RowWriter::new(table, row, "intervention");
        out.reset(AEB_EVENT_COLUMNS);
        if let Some(s) = start {
            out.set(columns::LOG_TIME, s.time);
            out.set(columns::AEB_INTV_START_TIME, s.time);
        }
        if let Some(e) = end {
            out.set(columns::AEB_INTV_END_TIME, e.time);
            out.set(columns::IS_VEH_STOPPED, e.is_veh_stopped);
            if let Some(s) = start.filter(|s| s.time.is_finite() && e.time.is_finite()) {
                out.set(columns::INTV_DUR, e.time - s.time);
            }
        }

        let veh_spd = match (start, speed) {
            (Some(s), Some(v)) => v.get(s.index).copied().unwrap_or(f64::NAN),
            _ => f64::NAN,
        };
        out.set(columns::VEH_SPD, veh_spd);

        let thresholds = Thresholds::at_speed(&self.calibrations, veh_spd);
        out.set(columns::STEER_ANG_TH, thresholds.steer_ang);
        out.set(columns::STEER_ANG_RATE_TH, thresholds.steer_ang_rate);
        out.set(columns::PEDAL_POS_INC_TH, thresholds.pedal_pos_inc);
        out.set(columns::YAW_RATE_SUSP_TH, thresholds.yaw_rate_susp);
        out.set(columns::LAT_ACCEL_TH, thresholds.lat_accel);

        let ctx = EventContext {
            label,
            recording: rec,
            start_idx: start.map(|s| s.index),
            end_idx: end.and_then(|e| e.index),
            thresholds,
            params: &self.params,
        };
        run_calculators(AEB_CALCULATORS, &ctx, table, row);
        RowStatus::Computed
    }

    fn run_fcw(&self, label: &str, rec: &Recording, table: &mut KpiTable, row: usize) -> RowStatus {
        let seg = &self.params.segmentation;
        let events = rec
            .channel(channels::FCW_REQUEST)
            .map(|request| {
                detect_fcw_events(rec.time(), request, &seg.fcw_active_levels, seg.fcw_merge_window)
            })
            .unwrap_or_default();
        let Some(first) = events.first() else {
            warn!(window = label, "no FCW event inside window, row skipped");
            return RowStatus::Skipped;
        };

        let start_idx = rec.nearest_index(first.start);
        let veh_spd = match (start_idx, rec.channel(channels::EGO_SPEED_KPH)) {
            (Some(i), Some(v)) => v[i],
            _ => f64::NAN,
        };
        debug!(window = label, events = events.len(), log_time = first.start, "FCW event located");

        let mut out = RowWriter::new(table, row, "fcw_event");
        out.reset(FCW_EVENT_COLUMNS);
        out.set(columns::LOG_TIME, first.start);
        out.set(columns::VEH_SPD, veh_spd);

        let ctx = EventContext {
            label,
            recording: rec,
            start_idx,
            end_idx: first.end.and_then(|t| rec.nearest_index(t)),
            thresholds: Thresholds::unavailable(),
            params: &self.params,
        };
        run_calculators(FCW_CALCULATORS, &ctx, table, row);
        RowStatus::Computed
    }
}

fn pipeline(kind: EventKind) -> (&'static [ColumnDef], &'static [&'static dyn KpiCalculator]) {
    match kind {
        EventKind::Aeb => (AEB_EVENT_COLUMNS, AEB_CALCULATORS),
        EventKind::Fcw => (FCW_EVENT_COLUMNS, FCW_CALCULATORS),
    }
}

fn run_calculators(
    calculators: &[&dyn KpiCalculator],
    ctx: &EventContext<'_>,
    table: &mut KpiTable,
    row: usize,
) {
    for calculator in calculators {
        let mut out = RowWriter::new(table, row, calculator.name());
        calculator.compute(ctx, &mut out);
    }
}
