//! Analysis parameters
//!
//! Every field has a default so an empty configuration runs the full
//! pipeline. Range checks use the `validator` derive; cross-field checks live
//! in the config loader.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Complete parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisParams {
    /// Event detection and window extraction
    #[serde(default)]
    #[validate(nested)]
    pub segmentation: SegmentationParams,

    /// AEB KPI calculators
    #[serde(default)]
    #[validate(nested)]
    pub aeb: AebParams,

    /// FCW KPI calculators
    #[serde(default)]
    #[validate(nested)]
    pub fcw: FcwParams,

    /// Low-pass filter used for derived channels and knee detection
    #[serde(default)]
    #[validate(nested)]
    pub filter: FilterParams,

    /// Decimal places applied to double columns at finalization
    #[serde(default = "default_round_decimals")]
    #[validate(range(max = 12))]
    pub round_decimals: u32,
}

fn default_round_decimals() -> u32 {
    3
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            segmentation: SegmentationParams::default(),
            aeb: AebParams::default(),
            fcw: FcwParams::default(),
            filter: FilterParams::default(),
            round_decimals: default_round_decimals(),
        }
    }
}

/// AEB boundary detection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AebDetectionPolicy {
    /// Level transitions on the AEB request signal
    #[default]
    Transition,
    /// Derivative thresholds on the target deceleration signal
    DerivativeThreshold,
}

/// End of intervention inside an AEB window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AebEndPolicy {
    /// First sample where deceleration recovers above the end threshold
    DecelRecovery,
    /// Earlier of deceleration recovery and vehicle standstill
    #[default]
    EarliestOfRecoveryOrStandstill,
}

/// Onset detection method for vehicle response latency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnsetMethod {
    /// First jerk sample below the negative threshold
    #[default]
    JerkThreshold,
    /// Knee point of the filtered acceleration
    KneePoint,
}

/// Knee point search criterion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KneeMethod {
    /// Maximum second-derivative magnitude
    #[default]
    Curvature,
    /// Maximum first-derivative magnitude
    Slope,
}

/// Jerk threshold mode for FCW brake jerk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JerkThresholdMode {
    /// Configured negative/positive thresholds
    #[default]
    Fixed,
    /// Symmetric threshold from the median absolute deviation of the window
    Adaptive,
}

/// Event detection and window extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SegmentationParams {
    /// Padding before AEB start (s)
    #[serde(default = "default_pre_time")]
    #[validate(range(min = 0.0))]
    pub aeb_pre_time: f64,

    /// Padding after AEB end (s)
    #[serde(default = "default_post_time")]
    #[validate(range(min = 0.0))]
    pub aeb_post_time: f64,

    /// Padding before FCW start (s)
    #[serde(default = "default_pre_time")]
    #[validate(range(min = 0.0))]
    pub fcw_pre_time: f64,

    /// Padding after FCW end (s)
    #[serde(default = "default_post_time")]
    #[validate(range(min = 0.0))]
    pub fcw_post_time: f64,

    /// Maximum gap between FCW events merged into one (s)
    #[serde(default = "default_merge_window")]
    #[validate(range(min = 0.0))]
    pub fcw_merge_window: f64,

    #[serde(default)]
    pub aeb_policy: AebDetectionPolicy,

    /// AEB request levels meaning "intervention active"
    #[serde(default = "default_aeb_active_levels")]
    #[validate(length(min = 1))]
    pub aeb_active_levels: Vec<i64>,

    /// AEB request levels whose drop to 0 ends an intervention
    #[serde(default = "default_aeb_end_levels")]
    #[validate(length(min = 1))]
    pub aeb_end_levels: Vec<i64>,

    /// FCW request levels meaning "warning active"
    #[serde(default = "default_fcw_active_levels")]
    #[validate(length(min = 1))]
    pub fcw_active_levels: Vec<i64>,

    /// Derivative policy: start when d(decel) drops below this
    #[serde(default = "default_derivative_start_thd")]
    pub derivative_start_thd: f64,

    /// Derivative policy: end when d(decel) rises above this
    #[serde(default = "default_derivative_end_thd")]
    pub derivative_end_thd: f64,

    /// Derivative policy: post-transition decel must be at or below this
    #[serde(default = "default_pb_tgt_decel")]
    pub derivative_pb_target: f64,
}

fn default_pre_time() -> f64 {
    6.0
}

fn default_post_time() -> f64 {
    3.0
}

fn default_merge_window() -> f64 {
    2.0
}

fn default_aeb_active_levels() -> Vec<i64> {
    vec![1, 2]
}

fn default_aeb_end_levels() -> Vec<i64> {
    vec![1, 2, 3]
}

fn default_fcw_active_levels() -> Vec<i64> {
    vec![2, 3]
}

fn default_derivative_start_thd() -> f64 {
    -30.0
}

fn default_derivative_end_thd() -> f64 {
    29.0
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            aeb_pre_time: default_pre_time(),
            aeb_post_time: default_post_time(),
            fcw_pre_time: default_pre_time(),
            fcw_post_time: default_post_time(),
            fcw_merge_window: default_merge_window(),
            aeb_policy: AebDetectionPolicy::default(),
            aeb_active_levels: default_aeb_active_levels(),
            aeb_end_levels: default_aeb_end_levels(),
            fcw_active_levels: default_fcw_active_levels(),
            derivative_start_thd: default_derivative_start_thd(),
            derivative_end_thd: default_derivative_end_thd(),
            derivative_pb_target: default_pb_tgt_decel(),
        }
    }
}

/// AEB KPI parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AebParams {
    /// Partial braking target deceleration (m/s²)
    #[serde(default = "default_pb_tgt_decel")]
    pub pb_tgt_decel: f64,

    /// Full braking target deceleration (m/s²)
    #[serde(default = "default_fb_tgt_decel")]
    pub fb_tgt_decel: f64,

    /// Tolerance band around PB/FB targets (m/s²)
    #[serde(default = "default_tgt_tol")]
    #[validate(range(exclusive_min = 0.0))]
    pub tgt_tol: f64,

    /// Tolerance for locating the intervention start (m/s²)
    #[serde(default = "default_intv_start_tol")]
    #[validate(range(min = 0.0))]
    pub intv_start_tol: f64,

    /// Deceleration above this ends the intervention (m/s²)
    #[serde(default = "default_aeb_end_thd")]
    pub aeb_end_thd: f64,

    #[serde(default)]
    pub end_policy: AebEndPolicy,

    /// Samples before intervention start included in steering/lateral/yaw windows
    #[serde(default = "default_time_idx_offset")]
    pub time_idx_offset: usize,

    /// Negative jerk threshold for response onset (m/s³)
    #[serde(default = "default_jerk_neg_thd")]
    #[validate(range(max = 0.0))]
    pub aeb_jerk_neg_thd: f64,

    /// Samples searched for a jerk onset
    #[serde(default = "default_latency_window_samples")]
    #[validate(range(min = 1))]
    pub latency_window_samples: usize,

    /// Minimum sustained partial braking before the FB transition (s)
    #[serde(default = "default_pb_duration")]
    #[validate(range(exclusive_min = 0.0))]
    pub pb_duration: f64,

    /// Count partial braking only before the first full braking sample
    #[serde(default = "default_true")]
    pub pb_truncate_at_fb: bool,

    #[serde(default)]
    pub onset_method: OnsetMethod,

    #[serde(default)]
    pub knee_method: KneeMethod,
}

fn default_pb_tgt_decel() -> f64 {
    -6.0
}

fn default_fb_tgt_decel() -> f64 {
    -15.0
}

fn default_tgt_tol() -> f64 {
    0.2
}

fn default_intv_start_tol() -> f64 {
    0.1
}

fn default_aeb_end_thd() -> f64 {
    -4.9
}

fn default_time_idx_offset() -> usize {
    300
}

fn default_jerk_neg_thd() -> f64 {
    -20.0
}

fn default_latency_window_samples() -> usize {
    30
}

fn default_pb_duration() -> f64 {
    0.32
}

fn default_true() -> bool {
    true
}

impl Default for AebParams {
    fn default() -> Self {
        Self {
            pb_tgt_decel: default_pb_tgt_decel(),
            fb_tgt_decel: default_fb_tgt_decel(),
            tgt_tol: default_tgt_tol(),
            intv_start_tol: default_intv_start_tol(),
            aeb_end_thd: default_aeb_end_thd(),
            end_policy: AebEndPolicy::default(),
            time_idx_offset: default_time_idx_offset(),
            aeb_jerk_neg_thd: default_jerk_neg_thd(),
            latency_window_samples: default_latency_window_samples(),
            pb_duration: default_pb_duration(),
            pb_truncate_at_fb: true,
            onset_method: OnsetMethod::default(),
            knee_method: KneeMethod::default(),
        }
    }
}

/// FCW KPI parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FcwParams {
    /// Brake jerk analysis span after the trigger (s)
    #[serde(default = "default_window_s")]
    #[validate(range(exclusive_min = 0.0))]
    pub window_s: f64,

    /// Brake jerk analysis span before the trigger (s)
    #[serde(default = "default_pre_trigger_s")]
    #[validate(range(min = 0.0))]
    pub pre_trigger_s: f64,

    /// Negative jerk threshold (m/s³)
    #[serde(default = "default_jerk_neg_thd")]
    #[validate(range(max = 0.0))]
    pub jerk_neg_thd: f64,

    /// Positive jerk threshold (m/s³)
    #[serde(default = "default_jerk_pos_thd")]
    #[validate(range(min = 0.0))]
    pub jerk_pos_thd: f64,

    #[serde(default)]
    pub jerk_threshold_mode: JerkThresholdMode,

    /// Multiplier on the scaled MAD in adaptive mode
    #[serde(default = "default_mad_scale")]
    #[validate(range(exclusive_min = 0.0))]
    pub mad_scale: f64,

    /// Minimum mean speed for a valid brake jerk (km/h)
    #[serde(default = "default_brakejerk_min_speed")]
    pub brakejerk_min_speed: f64,

    /// Maximum mean speed for a valid brake jerk (km/h)
    #[serde(default = "default_brakejerk_max_speed")]
    pub brakejerk_max_speed: f64,

    /// Upper bound on a plausible brake jerk duration (s)
    #[serde(default = "default_max_jerk_duration")]
    #[validate(range(exclusive_min = 0.0))]
    pub max_jerk_duration: f64,

    /// Upper bound on a plausible warning TTC (s)
    #[serde(default = "default_ttc_max")]
    #[validate(range(exclusive_min = 0.0))]
    pub ttc_max: f64,

    /// Request level of the warning-only stage
    #[serde(default = "default_warning_level")]
    pub warning_level: i64,

    /// Request level of the brake jerk stage
    #[serde(default = "default_brake_level")]
    pub brake_level: i64,
}

fn default_window_s() -> f64 {
    1.0
}

fn default_pre_trigger_s() -> f64 {
    0.2
}

fn default_jerk_pos_thd() -> f64 {
    20.0
}

fn default_mad_scale() -> f64 {
    4.0
}

fn default_brakejerk_min_speed() -> f64 {
    30.0
}

fn default_brakejerk_max_speed() -> f64 {
    130.0
}

fn default_max_jerk_duration() -> f64 {
    0.5
}

fn default_ttc_max() -> f64 {
    10.0
}

fn default_warning_level() -> i64 {
    2
}

fn default_brake_level() -> i64 {
    3
}

impl Default for FcwParams {
    fn default() -> Self {
        Self {
            window_s: default_window_s(),
            pre_trigger_s: default_pre_trigger_s(),
            jerk_neg_thd: default_jerk_neg_thd(),
            jerk_pos_thd: default_jerk_pos_thd(),
            jerk_threshold_mode: JerkThresholdMode::default(),
            mad_scale: default_mad_scale(),
            brakejerk_min_speed: default_brakejerk_min_speed(),
            brakejerk_max_speed: default_brakejerk_max_speed(),
            max_jerk_duration: default_max_jerk_duration(),
            ttc_max: default_ttc_max(),
            warning_level: default_warning_level(),
            brake_level: default_brake_level(),
        }
    }
}

/// Butterworth low-pass parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FilterParams {
    /// Filter order (even, realized as cascaded biquads)
    #[serde(default = "default_filter_order")]
    #[validate(range(min = 2, max = 8))]
    pub order: usize,

    /// Cutoff frequency (Hz)
    #[serde(default = "default_cutoff_hz")]
    #[validate(range(exclusive_min = 0.0))]
    pub cutoff_hz: f64,
}

fn default_filter_order() -> usize {
    4
}

fn default_cutoff_hz() -> f64 {
    10.0
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            order: default_filter_order(),
            cutoff_hz: default_cutoff_hz(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = AnalysisParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.round_decimals, 3);
        assert_eq!(params.segmentation.fcw_merge_window, 2.0);
        assert_eq!(params.aeb.pb_tgt_decel, -6.0);
        assert!(params.aeb.pb_truncate_at_fb);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let params: AnalysisParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, AnalysisParams::default());
    }

    #[test]
    fn test_negative_padding_rejected() {
        let mut params = AnalysisParams::default();
        params.segmentation.aeb_pre_time = -1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let mut params = AnalysisParams::default();
        params.aeb.tgt_tol = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_policy_names() {
        let p: SegmentationParams =
            serde_json::from_str(r#"{"aeb_policy": "derivative_threshold"}"#).unwrap();
        assert_eq!(p.aeb_policy, AebDetectionPolicy::DerivativeThreshold);
        let a: AebParams = serde_json::from_str(r#"{"end_policy": "decel_recovery"}"#).unwrap();
        assert_eq!(a.end_policy, AebEndPolicy::DecelRecovery);
    }
}
