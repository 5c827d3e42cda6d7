//! KPI schema - ordered, typed column declarations
//!
//! The schema is immutable once built. Display names are derived from it and
//! only used at export.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{ContractError, EventKind};

/// Column value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "str", alias = "text")]
    String,
    #[serde(alias = "float", alias = "f64")]
    Double,
    #[serde(alias = "bool", alias = "logical")]
    Boolean,
}

/// Feature a column belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Shared by every event kind
    #[default]
    Common,
    Aeb,
    Fcw,
}

impl Feature {
    /// Whether columns of this feature belong to tables of `kind`
    pub fn applies_to(&self, kind: EventKind) -> bool {
        match self {
            Feature::Common => true,
            Feature::Aeb => kind == EventKind::Aeb,
            Feature::Fcw => kind == EventKind::Fcw,
        }
    }
}

/// One typed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Bool(bool),
    Double(f64),
    Text(String),
}

impl KpiValue {
    /// Default fill value for a column type
    pub fn default_for(ty: ColumnType) -> Self {
        match ty {
            ColumnType::String => KpiValue::Text(String::new()),
            ColumnType::Double => KpiValue::Double(f64::NAN),
            ColumnType::Boolean => KpiValue::Bool(false),
        }
    }

    /// Type of this value
    pub fn column_type(&self) -> ColumnType {
        match self {
            KpiValue::Bool(_) => ColumnType::Boolean,
            KpiValue::Double(_) => ColumnType::Double,
            KpiValue::Text(_) => ColumnType::String,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KpiValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KpiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KpiValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for KpiValue {
    fn from(v: f64) -> Self {
        KpiValue::Double(v)
    }
}

impl From<bool> for KpiValue {
    fn from(v: bool) -> Self {
        KpiValue::Bool(v)
    }
}

impl From<&str> for KpiValue {
    fn from(v: &str) -> Self {
        KpiValue::Text(v.to_string())
    }
}

impl From<String> for KpiValue {
    fn from(v: String) -> Self {
        KpiValue::Text(v)
    }
}

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiValue::Bool(v) => write!(f, "{v}"),
            KpiValue::Double(v) if v.is_nan() => write!(f, "NaN"),
            KpiValue::Double(v) => write!(f, "{v}"),
            KpiValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Column declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub feature: Feature,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, ty: ColumnType, unit: &str, feature: Feature) -> Self {
        Self {
            name: name.into(),
            ty,
            unit: unit.to_string(),
            feature,
        }
    }

    /// `"name [unit]"`, or bare name without unit
    pub fn display_name(&self) -> String {
        if self.unit.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} [{}]", self.name, self.unit)
        }
    }
}

/// Ordered column declarations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiSchema {
    columns: Vec<ColumnSpec>,
}

impl KpiSchema {
    /// Build a schema, rejecting empty or duplicate names
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, ContractError> {
        let mut seen = HashSet::new();
        for (idx, col) in columns.iter().enumerate() {
            if col.name.trim().is_empty() {
                return Err(ContractError::config_validation(
                    format!("kpi[{idx}].name"),
                    "column name cannot be empty",
                ));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(ContractError::config_validation(
                    format!("kpi[name={}]", col.name),
                    "duplicate column name",
                ));
            }
        }
        Ok(Self { columns })
    }

    /// Copy of this schema with `column` appended
    pub fn extended(&self, column: ColumnSpec) -> Result<KpiSchema, ContractError> {
        let mut columns = self.columns.clone();
        columns.push(column);
        KpiSchema::new(columns)
    }

    /// Columns applicable to one event kind (common + feature-specific)
    pub fn for_kind(&self, kind: EventKind) -> KpiSchema {
        KpiSchema {
            columns: self
                .columns
                .iter()
                .filter(|c| c.feature.applies_to(kind))
                .cloned()
                .collect(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn display_name(&self, name: &str) -> Option<String> {
        self.column(name).map(ColumnSpec::display_name)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Built-in schema covering every KPI the engine computes
    pub fn builtin() -> KpiSchema {
        use columns::*;
        use ColumnType::{Boolean as B, Double as D};
        use Feature::{Aeb, Common, Fcw};

        let spec = |name: &str, ty, unit: &str, feature| ColumnSpec::new(name, ty, unit, feature);
        KpiSchema {
            columns: vec![
                spec(LOG_TIME, D, "s", Common),
                spec(VEH_SPD, D, "kph", Common),
                // AEB intervention
                spec(AEB_INTV_START_TIME, D, "s", Aeb),
                spec(AEB_INTV_END_TIME, D, "s", Aeb),
                spec(IS_VEH_STOPPED, B, "", Aeb),
                spec(INTV_DUR, D, "s", Aeb),
                spec(STEER_ANG_TH, D, "deg", Aeb),
                spec(STEER_ANG_RATE_TH, D, "deg/s", Aeb),
                spec(PEDAL_POS_INC_TH, D, "%", Aeb),
                spec(YAW_RATE_SUSP_TH, D, "deg/s", Aeb),
                spec(LAT_ACCEL_TH, D, "m/s^2", Aeb),
                // Distance
                spec(FIRST_DET_DIST, D, "m", Aeb),
                spec(STABLE_DET_DIST, D, "m", Aeb),
                spec(AEB_INTV_DIST, D, "m", Aeb),
                spec(AEB_STOP_GAP, D, "m", Aeb),
                // Throttle
                spec(PEDAL_POS_AT_START, D, "%", Aeb),
                spec(PEDAL_POS_MAX, D, "%", Aeb),
                spec(PEDAL_POS_INC, D, "%", Aeb),
                spec(IS_PEDAL_POS_INC_HIGH, B, "", Aeb),
                spec(IS_PEDAL_ON_AT_START, B, "", Aeb),
                // Steering
                spec(ABS_STEER_MAX_DEG, D, "deg", Aeb),
                spec(IS_STEER_HIGH, B, "", Aeb),
                spec(ABS_STEER_RATE_MAX_DEG, D, "deg/s", Aeb),
                spec(IS_STEER_ANG_RATE_HIGH, B, "", Aeb),
                // Lateral / yaw
                spec(ABS_LAT_ACCEL_MAX, D, "m/s^2", Aeb),
                spec(IS_LAT_ACCEL_HIGH, B, "", Aeb),
                spec(ABS_YAW_RATE_MAX_DEG, D, "deg/s", Aeb),
                spec(IS_YAW_RATE_HIGH, B, "", Aeb),
                // Brake mode
                spec(PB_DUR, D, "s", Aeb),
                spec(FB_DUR, D, "s", Aeb),
                spec(IS_PB_ON, B, "", Aeb),
                spec(IS_FB_ON, B, "", Aeb),
                // Latency
                spec(AEB_SYS_RESP_TIME, D, "s", Aeb),
                spec(AEB_DEAD_TIME, D, "s", Aeb),
                spec(COMM_LATENCY, D, "s", Aeb),
                // FCW brake jerk
                spec(BRAKE_JERK_DUR, D, "s", Fcw),
                spec(BRAKE_JERK_START_TIME, D, "s", Fcw),
                spec(BRAKE_JERK_END_TIME, D, "s", Fcw),
                spec(BRAKE_JERK_MAX, D, "m/s^3", Fcw),
                spec(BRAKE_ACCEL_MIN, D, "m/s^2", Fcw),
                spec(BRAKE_JERK_THD, D, "m/s^3", Fcw),
                // FCW warning
                spec(FCW_SENSITIVITY_LVL, D, "", Fcw),
                spec(FCW_WARNING_TTC, D, "s", Fcw),
            ],
        }
    }
}

/// Column names written by the KPI engine
pub mod columns {
    /// Label column identifying the source window
    pub const LABEL: &str = "label";

    pub const LOG_TIME: &str = "logTime";
    pub const VEH_SPD: &str = "vehSpd";

    pub const AEB_INTV_START_TIME: &str = "aebIntvStartTime";
    pub const AEB_INTV_END_TIME: &str = "aebIntvEndTime";
    pub const IS_VEH_STOPPED: &str = "isVehStopped";
    pub const INTV_DUR: &str = "intvDur";
    pub const STEER_ANG_TH: &str = "steerAngTh";
    pub const STEER_ANG_RATE_TH: &str = "steerAngRateTh";
    pub const PEDAL_POS_INC_TH: &str = "pedalPosIncTh";
    pub const YAW_RATE_SUSP_TH: &str = "yawRateSuspTh";
    pub const LAT_ACCEL_TH: &str = "latAccelTh";

    pub const FIRST_DET_DIST: &str = "firstDetDist";
    pub const STABLE_DET_DIST: &str = "stableDetDist";
    pub const AEB_INTV_DIST: &str = "aebIntvDist";
    pub const AEB_STOP_GAP: &str = "aebStopGap";

    pub const PEDAL_POS_AT_START: &str = "pedalPosAtStart";
    pub const PEDAL_POS_MAX: &str = "pedalPosMax";
    pub const PEDAL_POS_INC: &str = "pedalPosInc";
    pub const IS_PEDAL_POS_INC_HIGH: &str = "isPedalPosIncHigh";
    pub const IS_PEDAL_ON_AT_START: &str = "isPedalOnAtStrt";

    pub const ABS_STEER_MAX_DEG: &str = "absSteerMaxDeg";
    pub const IS_STEER_HIGH: &str = "isSteerHigh";
    pub const ABS_STEER_RATE_MAX_DEG: &str = "absSteerRateMaxDeg";
    pub const IS_STEER_ANG_RATE_HIGH: &str = "isSteerAngRateHigh";

    pub const ABS_LAT_ACCEL_MAX: &str = "absLatAccelMax";
    pub const IS_LAT_ACCEL_HIGH: &str = "isLatAccelHigh";

    pub const ABS_YAW_RATE_MAX_DEG: &str = "absYawRateMaxDeg";
    pub const IS_YAW_RATE_HIGH: &str = "isYawRateHigh";

    pub const PB_DUR: &str = "pbDur";
    pub const FB_DUR: &str = "fbDur";
    pub const IS_PB_ON: &str = "isPBOn";
    pub const IS_FB_ON: &str = "isFBOn";

    pub const AEB_SYS_RESP_TIME: &str = "aebSysRespTime";
    pub const AEB_DEAD_TIME: &str = "aebDeadTime";
    pub const COMM_LATENCY: &str = "commLatency";

    pub const BRAKE_JERK_DUR: &str = "brakeJerkDur";
    pub const BRAKE_JERK_START_TIME: &str = "brakeJerkStartTime";
    pub const BRAKE_JERK_END_TIME: &str = "brakeJerkEndTime";
    pub const BRAKE_JERK_MAX: &str = "brakeJerkMax";
    pub const BRAKE_ACCEL_MIN: &str = "brakeAccelMin";
    pub const BRAKE_JERK_THD: &str = "brakeJerkThd";

    pub const FCW_SENSITIVITY_LVL: &str = "fcwSensitivityLvl";
    pub const FCW_WARNING_TTC: &str = "fcwWarningTTC";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let col = ColumnSpec::new("pbDur", ColumnType::Double, "s", Feature::Aeb);
        assert_eq!(col.display_name(), "pbDur [s]");
        let col = ColumnSpec::new("isPBOn", ColumnType::Boolean, "", Feature::Aeb);
        assert_eq!(col.display_name(), "isPBOn");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let cols = vec![
            ColumnSpec::new("a", ColumnType::Double, "", Feature::Common),
            ColumnSpec::new("a", ColumnType::Boolean, "", Feature::Aeb),
        ];
        let err = KpiSchema::new(cols).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_for_kind_keeps_common() {
        let schema = KpiSchema::builtin();
        let aeb = schema.for_kind(EventKind::Aeb);
        let fcw = schema.for_kind(EventKind::Fcw);
        assert!(aeb.column(columns::LOG_TIME).is_some());
        assert!(fcw.column(columns::LOG_TIME).is_some());
        assert!(aeb.column(columns::PB_DUR).is_some());
        assert!(fcw.column(columns::PB_DUR).is_none());
        assert!(fcw.column(columns::FCW_WARNING_TTC).is_some());
    }

    #[test]
    fn test_extended_rejects_existing() {
        let schema = KpiSchema::builtin();
        let extra = ColumnSpec::new("custom", ColumnType::Double, "", Feature::Common);
        let bigger = schema.extended(extra).unwrap();
        assert_eq!(bigger.len(), schema.len() + 1);
        let dup = ColumnSpec::new(columns::PB_DUR, ColumnType::Double, "s", Feature::Aeb);
        assert!(schema.extended(dup).is_err());
    }

    #[test]
    fn test_builtin_schema_is_unique() {
        let schema = KpiSchema::builtin();
        assert!(KpiSchema::new(schema.columns().to_vec()).is_ok());
    }

    #[test]
    fn test_column_type_aliases() {
        let col: ColumnSpec =
            serde_json::from_str(r#"{"name": "x", "type": "logical"}"#).unwrap();
        assert_eq!(col.ty, ColumnType::Boolean);
        assert_eq!(col.feature, Feature::Common);
    }

    #[test]
    fn test_default_values_typed() {
        assert!(KpiValue::default_for(ColumnType::Double)
            .as_f64()
            .unwrap()
            .is_nan());
        assert_eq!(
            KpiValue::default_for(ColumnType::Boolean),
            KpiValue::Bool(false)
        );
        assert_eq!(
            KpiValue::default_for(ColumnType::String).column_type(),
            ColumnType::String
        );
    }
}
