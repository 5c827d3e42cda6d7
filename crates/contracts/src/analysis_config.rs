//! AnalysisConfig - Config Loader output
//!
//! Parameters, calibration tables, KPI schema and the channel alias map of
//! one analysis run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AnalysisParams, CalibrationSet, ColumnSpec, ContractError, KpiSchema};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete analysis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Numeric parameters (top-level sections)
    #[serde(flatten)]
    pub params: AnalysisParams,

    /// Calibration tables keyed by calibratable name
    #[serde(default)]
    pub calibration: CalibrationSet,

    /// KPI column declarations; empty means the built-in schema
    #[serde(default)]
    pub kpi: Vec<ColumnSpec>,

    /// Logical channel name -> raw logger names, tried in order
    #[serde(default)]
    pub channels: BTreeMap<String, Vec<String>>,
}

impl AnalysisConfig {
    /// Effective KPI schema
    ///
    /// Falls back to [`KpiSchema::builtin`] when no columns are declared.
    pub fn schema(&self) -> Result<KpiSchema, ContractError> {
        if self.kpi.is_empty() {
            Ok(KpiSchema::builtin())
        } else {
            KpiSchema::new(self.kpi.clone())
        }
    }
}
