//! Speed-dependent thresholds for one event

use contracts::{Calibratable, CalibrationSet};
use signal_tools::interpolate;
use tracing::warn;

/// The five calibrated thresholds, interpolated once per event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Steering wheel angle (deg)
    pub steer_ang: f64,
    /// Steering wheel angle rate (deg/s)
    pub steer_ang_rate: f64,
    /// Pedal position increase (%)
    pub pedal_pos_inc: f64,
    /// Yaw rate suspension (deg/s)
    pub yaw_rate_susp: f64,
    /// Lateral acceleration (m/s²)
    pub lat_accel: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl Thresholds {
    /// All thresholds unknown; every comparison against them is false
    pub fn unavailable() -> Self {
        Self {
            steer_ang: f64::NAN,
            steer_ang_rate: f64::NAN,
            pedal_pos_inc: f64::NAN,
            yaw_rate_susp: f64::NAN,
            lat_accel: f64::NAN,
        }
    }

    /// Interpolate every calibratable at `speed_kph`
    ///
    /// A missing or malformed table yields NaN for that threshold only.
    pub fn at_speed(calibrations: &CalibrationSet, speed_kph: f64) -> Self {
        if !speed_kph.is_finite() {
            warn!(speed_kph, "vehicle speed unknown, thresholds unavailable");
            return Self::unavailable();
        }
        let lookup = |cal: Calibratable| -> f64 {
            let Some(table) = calibrations.get(cal) else {
                warn!(calibratable = cal.key(), "calibration missing, threshold set to NaN");
                return f64::NAN;
            };
            interpolate(table, speed_kph).unwrap_or_else(|e| {
                warn!(calibratable = cal.key(), error = %e, "calibration unusable, threshold set to NaN");
                f64::NAN
            })
        };
        Self {
            steer_ang: lookup(Calibratable::SteeringAngle),
            steer_ang_rate: lookup(Calibratable::SteeringAngleRate),
            pedal_pos_inc: lookup(Calibratable::PedalIncrease),
            yaw_rate_susp: lookup(Calibratable::YawRateSuspension),
            lat_accel: lookup(Calibratable::LateralAcceleration),
        }
    }

    pub fn get(&self, cal: Calibratable) -> f64 {
        match cal {
            Calibratable::SteeringAngle => self.steer_ang,
            Calibratable::SteeringAngleRate => self.steer_ang_rate,
            Calibratable::PedalIncrease => self.pedal_pos_inc,
            Calibratable::YawRateSuspension => self.yaw_rate_susp,
            Calibratable::LateralAcceleration => self.lat_accel,
        }
    }
}
