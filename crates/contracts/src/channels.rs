//! Logical channel names consumed by the detectors and KPI calculators.
//!
//! Raw logger names are mapped onto these by the ingestion layer.

/// Time vector name in serialized recordings
pub const TIME: &str = "time";

/// Target deceleration requested by AEB (m/s²)
pub const AEB_TARGET_DECEL: &str = "aebTargetDecel";
/// AEB request level (0 = inactive)
pub const AEB_REQUEST: &str = "aebRequest";
/// FCW request level (0 = inactive, 2 = warning, 3 = brake jerk)
pub const FCW_REQUEST: &str = "fcwRequest";
/// Ego vehicle speed (km/h)
pub const EGO_SPEED_KPH: &str = "egoSpeedKph";
/// Longitudinal acceleration, raw
pub const LONG_ACCEL: &str = "longActAccel";
/// Longitudinal acceleration, low-pass filtered
pub const LONG_ACCEL_FLT: &str = "longActAccelFlt";
/// Lateral acceleration, raw
pub const LAT_ACCEL: &str = "latActAccel";
/// Lateral acceleration, low-pass filtered
pub const LAT_ACCEL_FLT: &str = "latActAccelFlt";
/// Steering wheel angle (rad)
pub const STEER_ANGLE: &str = "steerWheelAngle";
/// Steering wheel angle rate (rad/s)
pub const STEER_ANGLE_RATE: &str = "steerWheelAngleSpeed";
/// Accelerator pedal position (%)
pub const THROTTLE: &str = "throttleValue";
/// Yaw rate (rad/s)
pub const YAW_RATE: &str = "yawRate";
/// Longitudinal gap to the target object (m)
pub const LONG_GAP: &str = "longGap";
/// Time to collision (s)
pub const FCW_TTC: &str = "fcwTTC";
/// FCW sensitivity setting
pub const FCW_SENSITIVITY: &str = "fcwSensitivity";

/// Every logical channel known to the pipeline
pub const ALL: &[&str] = &[
    AEB_TARGET_DECEL,
    AEB_REQUEST,
    FCW_REQUEST,
    EGO_SPEED_KPH,
    LONG_ACCEL,
    LONG_ACCEL_FLT,
    LAT_ACCEL,
    LAT_ACCEL_FLT,
    STEER_ANGLE,
    STEER_ANGLE_RATE,
    THROTTLE,
    YAW_RATE,
    LONG_GAP,
    FCW_TTC,
    FCW_SENSITIVITY,
];

/// Raw channel paired with the filtered channel derived from it
pub const DERIVED_FILTERED: &[(&str, &str)] =
    &[(LONG_ACCEL, LONG_ACCEL_FLT), (LAT_ACCEL, LAT_ACCEL_FLT)];
