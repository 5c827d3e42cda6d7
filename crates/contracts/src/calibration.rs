//! Calibration threshold tables
//!
//! Speed-dependent lookup tables resolved through the threshold interpolator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ContractError;

/// Named calibratables consumed by the KPI engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Calibratable {
    /// Steering wheel angle threshold (deg)
    SteeringAngle,
    /// Steering angle rate override threshold (deg/s)
    SteeringAngleRate,
    /// Accelerator pedal increase threshold (%)
    PedalIncrease,
    /// Yaw rate suspension threshold (deg/s)
    YawRateSuspension,
    /// Lateral acceleration threshold (m/s²)
    LateralAcceleration,
}

impl Calibratable {
    pub const ALL: [Calibratable; 5] = [
        Calibratable::SteeringAngle,
        Calibratable::SteeringAngleRate,
        Calibratable::PedalIncrease,
        Calibratable::YawRateSuspension,
        Calibratable::LateralAcceleration,
    ];

    /// Key in the calibration file
    pub fn key(&self) -> &'static str {
        match self {
            Calibratable::SteeringAngle => "SteeringWheelAngle_Th",
            Calibratable::SteeringAngleRate => "AEB_SteeringAngleRate_Override",
            Calibratable::PedalIncrease => "PedalPosProIncrease_Th",
            Calibratable::YawRateSuspension => "YawrateSuspension_Th",
            Calibratable::LateralAcceleration => "LateralAcceleration_th",
        }
    }
}

impl fmt::Display for Calibratable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Two-row lookup table `{x: breakpoints, y: values}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip)]
    percent_normalized: bool,
}

impl CalibrationTable {
    /// Create a validated table
    ///
    /// # Errors
    /// Returns `MalformedCalibration` on length mismatch, fewer than 2 points
    /// or non-finite values.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, ContractError> {
        let table = Self {
            x,
            y,
            percent_normalized: false,
        };
        table.validate("table")?;
        Ok(table)
    }

    /// Check the table shape
    pub fn validate(&self, name: &str) -> Result<(), ContractError> {
        if self.x.len() != self.y.len() {
            return Err(ContractError::malformed_calibration(
                name,
                format!(
                    "x has {} points but y has {}",
                    self.x.len(),
                    self.y.len()
                ),
            ));
        }
        if self.x.len() < 2 {
            return Err(ContractError::malformed_calibration(
                name,
                format!("at least 2 points required, got {}", self.x.len()),
            ));
        }
        if self.x.iter().chain(self.y.iter()).any(|v| !v.is_finite()) {
            return Err(ContractError::malformed_calibration(
                name,
                "non-numeric or non-finite value",
            ));
        }
        Ok(())
    }

    /// Scale `y` by 100 when every value lies in `[0, 1]`
    ///
    /// Runs at most once per table; returns true if the values were scaled.
    pub fn normalize_percent(&mut self) -> bool {
        if self.percent_normalized {
            return false;
        }
        self.percent_normalized = true;
        if !self.y.is_empty() && self.y.iter().all(|v| (0.0..=1.0).contains(v)) {
            self.y.iter_mut().for_each(|v| *v *= 100.0);
            return true;
        }
        false
    }

    /// Whether unit normalization already ran
    pub fn is_percent_normalized(&self) -> bool {
        self.percent_normalized
    }
}

/// All calibration tables of one analysis, keyed by calibration file name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibrationSet {
    tables: BTreeMap<String, CalibrationTable>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, table: CalibrationTable) {
        self.tables.insert(key.into(), table);
    }

    pub fn remove(&mut self, key: &str) -> Option<CalibrationTable> {
        self.tables.remove(key)
    }

    /// Table for a known calibratable
    pub fn get(&self, cal: Calibratable) -> Option<&CalibrationTable> {
        self.tables.get(cal.key())
    }

    /// Table by raw key
    pub fn get_by_key(&self, key: &str) -> Option<&CalibrationTable> {
        self.tables.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CalibrationTable)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Validate every table, returning the first error
    pub fn validate(&self) -> Result<(), ContractError> {
        for (key, table) in &self.tables {
            table.validate(key)?;
        }
        Ok(())
    }

    /// One-time unit normalization applied after loading
    ///
    /// The pedal increase threshold is stored as a fraction by some
    /// calibration exports and as percent by others.
    pub fn normalize_units(&mut self) -> Vec<Calibratable> {
        let mut scaled = Vec::new();
        if let Some(table) = self.tables.get_mut(Calibratable::PedalIncrease.key()) {
            if table.normalize_percent() {
                scaled.push(Calibratable::PedalIncrease);
            }
        }
        scaled
    }
}
