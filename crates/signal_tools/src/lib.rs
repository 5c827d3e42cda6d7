//! # Signal Tools
//!
//! Numeric building blocks shared by event detection and KPI computation.
//!
//! Responsibilities:
//! - Clamped threshold interpolation over calibration tables
//! - Discrete gradients on non-uniform time bases
//! - Zero-phase Butterworth low-pass filtering
//! - Onset, recovery and knee point detection in derivative signals
//! - Robust statistics (median, MAD) for adaptive thresholds

mod detect;
mod filter;
mod gradient;
mod interpolate;
mod stats;

pub use detect::{
    detect_brake_jerk_end, detect_decel_onset, detect_kneepoint, find_first_last_indices,
    matching_indices, Comparison, KneeDirection, KneePoint,
};
pub use filter::{butterworth_q_factors, lowpass, lowpass_with_rate, FilterOutcome};
pub use gradient::{diff, gradient, gradient_uniform, mean_dt};
pub use interpolate::interpolate;
pub use stats::{abs_max, adaptive_threshold, mad, max_value, mean, median, min_value};
