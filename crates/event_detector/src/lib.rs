//! # Event Detector
//!
//! Event boundary detection on aligned recordings.
//!
//! 负责：
//! - AEB 请求电平跳变检测（主策略）
//! - AEB 目标减速度导数阈值检测（兼容策略）
//! - FCW 上升/下降沿检测与合并
//!
//! ## 使用示例
//!
//! ```ignore
//! use event_detector::EventDetector;
//! use contracts::{EventKind, SegmentationParams};
//!
//! let detector = EventDetector::new(SegmentationParams::default());
//! let detection = detector.detect(&recording, EventKind::Fcw)?;
//! for boundary in &detection.boundaries {
//!     println!("{} -> {:?}", boundary.start, boundary.end);
//! }
//! ```

mod aeb;
mod detector;
mod fcw;
mod levels;

pub use aeb::{detect_aeb_derivative, detect_aeb_transitions, AebDetection};
pub use detector::{Detection, DetectionPolicy, EventDetector};
pub use fcw::{detect_fcw_edges, detect_fcw_events, merge_events};
